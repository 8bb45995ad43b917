//! Bootstrap core for the nezha-dash client shell.
//!
//! The shell fetches operator settings, runs the operator's custom code once,
//! applies the settings locale, resolves the host-provided background layers and
//! mounts the static route table. Everything platform specific (HTTP, the DOM,
//! the i18n engine) is reached through the traits re-exported here, so the same
//! core drives the browser build and the native preview tool.

pub mod background;
pub mod config;
pub mod injection;
pub mod locale;
pub mod routes;
pub mod settings;
pub mod shell;

pub use background::{
    BackgroundConfig, BackgroundLayer, BackgroundPlan, LayerKind, LayerVisibility,
    MOBILE_BREAKPOINT_PX, resolve_background_layers,
};
pub use config::{ConfigError, ShellConfig};
pub use injection::{
    InjectionError, InjectionGate, InjectionOutcome, InjectionState, TrustedExtension,
};
pub use locale::{
    LOCALE_STORAGE_KEY, LocaleDecision, LocalePreferenceApplier, LocaleStore, MemoryLocaleStore,
};
pub use routes::{ErrorViewParams, ROUTE_TABLE, RouteMatch, RouteTable, ViewId};
pub use settings::{
    FetchError, FetchErrorKind, FetchOutcome, FetchResult, FetchTicket, RefreshTrigger,
    SETTINGS_API_PATH, SETTINGS_CACHE_KEY, Settings, SettingsLoader, SettingsTransport,
};
pub use shell::{DashboardShell, ErrorView, MountedShell, ShellOutput, ShellRegion};
