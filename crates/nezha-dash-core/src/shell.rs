use std::sync::Arc;

use serde::Serialize;

use crate::background::{BackgroundPlan, resolve_background_layers};
use crate::config::ShellConfig;
use crate::injection::{InjectionError, InjectionGate, InjectionState, TrustedExtension};
use crate::locale::{LocaleDecision, LocalePreferenceApplier, LocaleStore};
use crate::routes::{RouteMatch, RouteTable};
use crate::settings::{
    FetchError, FetchOutcome, FetchResult, FetchTicket, RefreshTrigger, Settings, SettingsLoader,
    SettingsTransport,
};

/// Status code shown when the settings fetch fails.
pub const SETTINGS_FAILURE_STATUS: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellRegion {
    Header,
    Content,
    Footer,
}

/// Layout regions top to bottom.
pub const SHELL_REGIONS: [ShellRegion; 3] =
    [ShellRegion::Header, ShellRegion::Content, ShellRegion::Footer];

/// Fully composed shell: backgrounds behind, then header, routed view and
/// footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MountedShell {
    pub background: BackgroundPlan,
    pub settings: Arc<Settings>,
    pub route: RouteMatch,
}

impl MountedShell {
    #[must_use]
    pub fn regions(&self) -> [ShellRegion; 3] {
        SHELL_REGIONS
    }
}

/// What the shell shows. Exactly one variant at a time; there is no mixed
/// state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShellOutput {
    Empty,
    Error(ErrorView),
    Mounted(MountedShell),
}

/// Composition root of the client shell.
///
/// Owns the settings query, the injection gate and the locale applier, and
/// renders nothing until the gate is open and the last fetch succeeded.
pub struct DashboardShell<E, L> {
    routes: RouteTable,
    background: BackgroundPlan,
    loader: SettingsLoader,
    gate: InjectionGate,
    locale: LocalePreferenceApplier,
    extension: E,
    locale_store: L,
}

impl<E, L> DashboardShell<E, L>
where
    E: TrustedExtension,
    L: LocaleStore,
{
    pub fn new(config: &ShellConfig, extension: E, locale_store: L) -> Self {
        tracing::info!(
            base_path = %config.base_path,
            desktop_background = config.background.desktop_url().is_some(),
            mobile_background = config.background.mobile_url().is_some(),
            "dashboard shell created"
        );
        Self {
            routes: RouteTable::new(&config.base_path),
            background: resolve_background_layers(&config.background),
            loader: SettingsLoader::default(),
            gate: InjectionGate::default(),
            locale: LocalePreferenceApplier::default(),
            extension,
            locale_store,
        }
    }

    #[must_use]
    pub fn fetch_result(&self) -> &FetchResult {
        self.loader.result()
    }

    #[must_use]
    pub fn injection_state(&self) -> InjectionState {
        self.gate.state()
    }

    #[must_use]
    pub fn cache_key(&self) -> &str {
        self.loader.cache_key()
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn extension(&self) -> &E {
        &self.extension
    }

    #[must_use]
    pub fn locale_store(&self) -> &L {
        &self.locale_store
    }

    pub fn begin_refresh(&mut self, trigger: RefreshTrigger) -> FetchTicket {
        self.loader.begin_fetch(trigger)
    }

    /// Records a finished fetch and, for a fresh snapshot, runs the injection
    /// gate and the locale applier. Injection failures are returned, not
    /// swallowed; the gate then stays closed.
    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Settings, FetchError>,
    ) -> Result<FetchOutcome, InjectionError> {
        let outcome = self.loader.complete(ticket, result);
        if outcome != FetchOutcome::Loaded {
            return Ok(outcome);
        }
        let Some(settings) = self.loader.result().data.clone() else {
            return Ok(outcome);
        };

        self.gate.observe(&settings, &mut self.extension)?;
        if let LocaleDecision::KeptPersisted(locale) =
            self.locale.apply(&settings, &mut self.locale_store)
        {
            tracing::debug!(%locale, "user locale preference kept");
        }
        Ok(outcome)
    }

    pub async fn refresh<T>(
        &mut self,
        transport: &T,
        trigger: RefreshTrigger,
    ) -> Result<FetchOutcome, InjectionError>
    where
        T: SettingsTransport + ?Sized,
    {
        let ticket = self.begin_refresh(trigger);
        let result = transport.fetch_settings(self.loader.cache_key()).await;
        self.apply_fetch(ticket, result)
    }

    #[must_use]
    pub fn render(&self, location: &str) -> ShellOutput {
        let result = self.loader.result();
        if let Some(error) = &result.error {
            return ShellOutput::Error(ErrorView {
                code: SETTINGS_FAILURE_STATUS,
                message: error.message.clone(),
            });
        }
        let Some(settings) = &result.data else {
            return ShellOutput::Empty;
        };
        if !self.gate.is_ready() {
            return ShellOutput::Empty;
        }

        ShellOutput::Mounted(MountedShell {
            background: self.background.clone(),
            settings: Arc::clone(settings),
            route: self.routes.resolve(location),
        })
    }
}
