use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use futures::executor::block_on;
use nezha_dash_core::{
    BackgroundConfig, DashboardShell, ErrorView, FetchError, FetchOutcome, InjectionError,
    InjectionState, LayerKind, MOBILE_BREAKPOINT_PX, MemoryLocaleStore, RefreshTrigger, Settings,
    SettingsTransport, ShellConfig, ShellOutput, TrustedExtension, ViewId,
};

/// Hands out scripted responses in order and records the cache keys it saw.
#[derive(Default)]
struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<Settings, FetchError>>>,
    requested_keys: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    fn with(responses: Vec<Result<Settings, FetchError>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requested_keys: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl SettingsTransport for ScriptedTransport {
    async fn fetch_settings(&self, cache_key: &str) -> Result<Settings, FetchError> {
        self.requested_keys.borrow_mut().push(cache_key.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::network("no scripted response")))
    }
}

#[derive(Default)]
struct RecordingExtension {
    injected: Vec<String>,
}

impl TrustedExtension for RecordingExtension {
    fn inject(&mut self, code: &str) -> Result<(), InjectionError> {
        self.injected.push(code.to_string());
        Ok(())
    }
}

fn settings(code: Option<&str>, language: Option<&str>) -> Settings {
    Settings {
        custom_code: code.map(ToString::to_string),
        language: language.map(ToString::to_string),
        ..Settings::default()
    }
}

fn new_shell(config: &ShellConfig) -> DashboardShell<RecordingExtension, MemoryLocaleStore> {
    DashboardShell::new(
        config,
        RecordingExtension::default(),
        MemoryLocaleStore::default(),
    )
}

#[test]
fn mount_then_focus_refetch_injects_once_and_renders_routes() {
    let transport = ScriptedTransport::with(vec![
        Ok(settings(Some("<script>console.log(1)</script>"), Some("fr"))),
        Ok(settings(Some("<script>console.log(1)</script>"), Some("fr"))),
    ]);
    let mut shell = new_shell(&ShellConfig::default());

    assert_eq!(shell.render("/"), ShellOutput::Empty);

    let outcome = block_on(shell.refresh(&transport, RefreshTrigger::Mount)).expect("mount");
    assert_eq!(outcome, FetchOutcome::Loaded);
    let outcome = block_on(shell.refresh(&transport, RefreshTrigger::Focus)).expect("focus");
    assert_eq!(outcome, FetchOutcome::Loaded);

    assert_eq!(shell.injection_state(), InjectionState::Ready);
    assert_eq!(shell.extension().injected.len(), 1);
    assert_eq!(shell.locale_store().active.as_deref(), Some("fr"));
    assert_eq!(shell.locale_store().activations, 1);
    assert_eq!(
        *transport.requested_keys.borrow(),
        vec!["setting".to_string(), "setting".to_string()]
    );

    let ShellOutput::Mounted(mounted) = shell.render("/") else {
        panic!("expected mounted shell");
    };
    assert_eq!(mounted.route.view, ViewId::ServerList);
}

#[test]
fn fetch_failure_shows_error_then_recovers_on_next_focus() {
    let transport = ScriptedTransport::with(vec![
        Ok(settings(None, None)),
        Err(FetchError::network("network down")),
        Ok(settings(None, None)),
    ]);
    let mut shell = new_shell(&ShellConfig::default());

    block_on(shell.refresh(&transport, RefreshTrigger::Mount)).expect("mount");
    assert!(matches!(shell.render("/"), ShellOutput::Mounted(_)));

    let outcome = block_on(shell.refresh(&transport, RefreshTrigger::Focus)).expect("focus");
    assert_eq!(outcome, FetchOutcome::Failed);
    assert_eq!(
        shell.render("/server/1"),
        ShellOutput::Error(ErrorView {
            code: 500,
            message: "network down".to_string(),
        })
    );

    block_on(shell.refresh(&transport, RefreshTrigger::Focus)).expect("recovered");
    assert!(matches!(shell.render("/"), ShellOutput::Mounted(_)));
}

#[test]
fn overlapping_fetches_keep_the_newest_snapshot() {
    let mut shell = new_shell(&ShellConfig::default());

    let mount = shell.begin_refresh(RefreshTrigger::Mount);
    let focus = shell.begin_refresh(RefreshTrigger::Focus);

    shell
        .apply_fetch(focus, Ok(settings(Some("new"), None)))
        .expect("newest");
    let outcome = shell
        .apply_fetch(mount, Ok(settings(Some("old"), None)))
        .expect("stale");

    assert_eq!(outcome, FetchOutcome::Stale);
    assert_eq!(shell.extension().injected, vec!["new".to_string()]);
    let data = shell.fetch_result().data.clone().expect("data");
    assert_eq!(data.custom_code(), Some("new"));
}

#[test]
fn stale_failure_does_not_replace_fresh_data() {
    let mut shell = new_shell(&ShellConfig::default());

    let mount = shell.begin_refresh(RefreshTrigger::Mount);
    let focus = shell.begin_refresh(RefreshTrigger::Focus);
    shell
        .apply_fetch(focus, Ok(settings(None, None)))
        .expect("newest");
    shell
        .apply_fetch(mount, Err(FetchError::network("timed out")))
        .expect("stale");

    assert!(shell.fetch_result().error.is_none());
    assert!(matches!(shell.render("/"), ShellOutput::Mounted(_)));
}

#[test]
fn base_path_and_mobile_background_compose_into_output() {
    let config = ShellConfig {
        base_path: "/status".to_string(),
        background: BackgroundConfig::new(Some(""), Some("https://x/img.png")),
        ..ShellConfig::default()
    };
    let mut shell = new_shell(&config);
    let ticket = shell.begin_refresh(RefreshTrigger::Mount);
    shell
        .apply_fetch(ticket, Ok(settings(None, None)))
        .expect("loaded");

    let ShellOutput::Mounted(mounted) = shell.render("/status/server/42") else {
        panic!("expected mounted shell");
    };
    assert_eq!(mounted.route.view, ViewId::ServerDetail);
    assert_eq!(mounted.route.param("id"), Some("42"));

    let background = &mounted.background;
    assert_eq!(background.layers.len(), 1);
    assert_eq!(background.layers[0].kind, LayerKind::Mobile);
    assert_eq!(background.visible_layers_at(MOBILE_BREAKPOINT_PX - 1).len(), 1);
    assert!(background.visible_layers_at(MOBILE_BREAKPOINT_PX).is_empty());
    assert!(!background.default_background_at(MOBILE_BREAKPOINT_PX - 1));
    assert!(background.default_background_at(MOBILE_BREAKPOINT_PX));

    let ShellOutput::Mounted(outside) = shell.render("/server/42") else {
        panic!("expected mounted shell");
    };
    assert_eq!(outside.route.view, ViewId::NotFound);
}

#[test]
fn persisted_locale_survives_settings_language() {
    let mut shell = DashboardShell::new(
        &ShellConfig::default(),
        RecordingExtension::default(),
        MemoryLocaleStore::with_persisted("en"),
    );
    let ticket = shell.begin_refresh(RefreshTrigger::Mount);
    shell
        .apply_fetch(ticket, Ok(settings(None, Some("fr"))))
        .expect("loaded");

    assert_eq!(shell.locale_store().active.as_deref(), Some("en"));
    assert_eq!(shell.locale_store().activations, 0);
}
