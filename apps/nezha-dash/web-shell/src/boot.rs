use nezha_dash_core::config::{
    ENV_API_BASE_URL, ENV_BACKGROUND_IMAGE, ENV_BASE_PATH, ENV_MOBILE_BACKGROUND_IMAGE,
};
use nezha_dash_core::{ConfigError, InjectionError, ShellConfig};
use thiserror::Error;

/// Values the hosting page exposes at boot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HostContext {
    /// Page origin; the settings endpoint is same-origin in the browser.
    pub origin: Option<String>,
    /// Router base path baked in at build time.
    pub base_path: Option<String>,
    /// `window.CustomBackgroundImage`
    pub background_image: Option<String>,
    /// `window.CustomMobileBackgroundImage`
    pub mobile_background_image: Option<String>,
}

#[derive(Debug, Error)]
pub(crate) enum BootError {
    #[error("page origin is unavailable")]
    MissingOrigin,
    #[error("dashboard shell is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Injection(#[from] InjectionError),
    #[error("{0}")]
    Dom(String),
}

pub(crate) fn shell_config_from_host(context: &HostContext) -> Result<ShellConfig, BootError> {
    let origin = context
        .origin
        .as_deref()
        .map(str::trim)
        .filter(|origin| !origin.is_empty() && *origin != "null")
        .ok_or(BootError::MissingOrigin)?;

    let config = ShellConfig::from_lookup(|key| match key {
        ENV_API_BASE_URL => Some(origin.to_string()),
        ENV_BASE_PATH => context.base_path.clone(),
        ENV_BACKGROUND_IMAGE => context.background_image.clone(),
        ENV_MOBILE_BACKGROUND_IMAGE => context.mobile_background_image.clone(),
        _ => None,
    })?;
    Ok(config)
}
