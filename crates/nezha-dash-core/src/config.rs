use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::background::BackgroundConfig;
use crate::settings::SETTINGS_API_PATH;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8008";
pub const DEFAULT_BASE_PATH: &str = "/";
pub const ENV_API_BASE_URL: &str = "NEZHA_DASH_API_BASE_URL";
pub const ENV_BASE_PATH: &str = "NEZHA_DASH_BASE_PATH";
pub const ENV_BACKGROUND_IMAGE: &str = "NEZHA_DASH_BACKGROUND_IMAGE";
pub const ENV_MOBILE_BACKGROUND_IMAGE: &str = "NEZHA_DASH_MOBILE_BACKGROUND_IMAGE";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("api base url must not be empty")]
    EmptyBaseUrl,
    #[error("api base url '{value}' must use http:// or https:// and include a host")]
    InvalidBaseUrl { value: String },
    #[error("base path '{value}' must start with '/'")]
    InvalidBasePath { value: String },
}

/// Startup configuration handed to the composition root by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    pub base_path: String,
    pub api_base_url: String,
    pub background: BackgroundConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            background: BackgroundConfig::default(),
        }
    }
}

impl ShellConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_base_url = normalize_base_url(
            &non_empty(ENV_API_BASE_URL).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )?;
        let base_path = normalize_base_path(
            &non_empty(ENV_BASE_PATH).unwrap_or_else(|| DEFAULT_BASE_PATH.to_string()),
        )?;
        let background = BackgroundConfig::new(
            non_empty(ENV_BACKGROUND_IMAGE).as_deref(),
            non_empty(ENV_MOBILE_BACKGROUND_IMAGE).as_deref(),
        );

        Ok(Self {
            base_path,
            api_base_url,
            background,
        })
    }

    #[must_use]
    pub fn settings_url(&self) -> String {
        format!("{}{SETTINGS_API_PATH}", self.api_base_url)
    }
}

pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyBaseUrl);
    }
    let invalid = || ConfigError::InvalidBaseUrl {
        value: raw.trim().to_string(),
    };
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(invalid());
    }
    let Some((_, remainder)) = trimmed.split_once("://") else {
        return Err(invalid());
    };
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(invalid());
    }
    Ok(trimmed.to_string())
}

pub fn normalize_base_path(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_BASE_PATH.to_string());
    }
    if !trimmed.starts_with('/') {
        return Err(ConfigError::InvalidBasePath {
            value: trimmed.to_string(),
        });
    }
    let inner = trimmed.trim_matches('/');
    if inner.is_empty() {
        Ok(DEFAULT_BASE_PATH.to_string())
    } else {
        Ok(format!("/{inner}"))
    }
}
