/// Router base path, fixed when the bundle is built.
pub(crate) const BUILD_BASE_PATH: Option<&str> = option_env!("NEZHA_DASH_BASE_PATH");

/// Element the host page reserves for the dashboard; `<body>` is used when absent.
pub(crate) const MOUNT_POINT_ID: &str = "root";
pub(crate) const HOST_BACKGROUND_GLOBAL: &str = "CustomBackgroundImage";
pub(crate) const HOST_MOBILE_BACKGROUND_GLOBAL: &str = "CustomMobileBackgroundImage";
/// Optional host function that switches the translation engine language.
pub(crate) const HOST_LOCALE_HOOK: &str = "NezhaDashChangeLanguage";
pub(crate) const INJECTED_MARKER_ATTRIBUTE: &str = "data-nezha-dash-injected";
