#[cfg(any(target_arch = "wasm32", test))]
mod boot;
#[cfg(any(target_arch = "wasm32", test))]
mod locale_bridge;
#[cfg(any(target_arch = "wasm32", test))]
mod shell_markup;
#[cfg(target_arch = "wasm32")]
mod web_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;

    use async_trait::async_trait;
    use gloo_net::http::Request;
    use nezha_dash_core::{
        DashboardShell, FetchError, FetchOutcome, InjectionError, LOCALE_STORAGE_KEY,
        RefreshTrigger, Settings, SettingsTransport, ShellConfig, ShellOutput, TrustedExtension,
    };
    use serde::Serialize;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Element, HtmlAnchorElement, HtmlElement, MouseEvent, Node};

    use crate::boot::{BootError, HostContext, shell_config_from_host};
    use crate::locale_bridge::{HostLocaleStore, LocaleHost};
    use crate::shell_markup::{ElementSpec, ROOT_ID, STYLESHEET_ID, render_output, responsive_stylesheet};
    use crate::web_constants::*;

    mod dom;
    mod extension;
    mod lifecycle;
    mod locale_store;
    mod network;
    mod routing;

    use dom::*;
    use extension::DomCodeInjector;
    use lifecycle::*;
    use locale_store::{BrowserLocaleHost, BrowserLocaleStore};
    use network::GlooSettingsTransport;
    use routing::*;

    type BrowserShell = DashboardShell<DomCodeInjector, BrowserLocaleStore>;
    type EventHandler = Closure<dyn FnMut(web_sys::Event)>;

    #[derive(Debug, Clone, Default, Serialize)]
    struct BootDiagnostics {
        phase: String,
        detail: String,
        last_error: Option<String>,
        refreshes: u64,
    }

    thread_local! {
        static SHELL: RefCell<Option<BrowserShell>> = const { RefCell::new(None) };
        static TRANSPORT: RefCell<Option<GlooSettingsTransport>> = const { RefCell::new(None) };
        static DIAGNOSTICS: RefCell<BootDiagnostics> = RefCell::new(BootDiagnostics::default());
        static ROUTE_POPSTATE_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static ROUTE_LINK_CLICK_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static WINDOW_FOCUS_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
        static VISIBILITY_HANDLER: RefCell<Option<EventHandler>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
        set_boot_phase("booting", "initializing nezha-dash shell");
        spawn_local(async {
            if let Err(error) = boot().await {
                tracing::error!(%error, "nezha-dash shell failed to start");
                set_boot_error(&error.to_string());
            }
        });
    }

    #[wasm_bindgen]
    pub fn boot_diagnostics_json() -> String {
        DIAGNOSTICS.with(|state| {
            serde_json::to_string(&*state.borrow()).unwrap_or_else(|_| {
                "{\"phase\":\"error\",\"detail\":\"diagnostics serialization failed\"}".to_string()
            })
        })
    }

    /// Current shell output for the browser location, as JSON.
    #[wasm_bindgen]
    pub fn shell_state_json() -> String {
        let output = current_output(&current_location());
        serde_json::to_string(&output).unwrap_or_else(|_| "{\"kind\":\"empty\"}".to_string())
    }

    /// Client-side navigation for host scripts.
    #[wasm_bindgen]
    pub fn navigate(path: &str) {
        navigate_to(path, true);
    }

    async fn boot() -> Result<(), BootError> {
        let config = shell_config_from_host(&read_host_context())?;
        tracing::info!(
            base_path = %config.base_path,
            settings_url = %config.settings_url(),
            "booting nezha-dash shell"
        );

        ensure_stylesheet().map_err(BootError::Dom)?;
        TRANSPORT.with(|slot| {
            *slot.borrow_mut() = Some(GlooSettingsTransport::new(&config));
        });
        SHELL.with(|slot| {
            *slot.borrow_mut() = Some(DashboardShell::new(
                &config,
                DomCodeInjector::default(),
                BrowserLocaleStore::new(BrowserLocaleHost),
            ));
        });
        install_browser_navigation_handlers();
        install_refresh_handlers();
        render_current();

        set_boot_phase("fetching", "loading dashboard settings");
        refresh_settings(RefreshTrigger::Mount).await?;
        set_boot_phase("ready", "settings loaded");
        Ok(())
    }
}
