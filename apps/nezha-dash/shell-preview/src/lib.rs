//! Native preview of the dashboard shell bootstrap.
//!
//! Drives the same composition root as the browser build against a live
//! settings endpoint (or a saved response), never executes custom code, and
//! reports what the browser would show for a location.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use nezha_dash_core::config::{normalize_base_path, normalize_base_url};
use nezha_dash_core::settings::decode_settings_response;
use nezha_dash_core::{
    BackgroundConfig, DashboardShell, FetchError, FetchOutcome, InjectionError,
    MemoryLocaleStore, RefreshTrigger, Settings, SettingsTransport, ShellConfig, ShellOutput,
    TrustedExtension,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "nezha-dash-preview")]
#[command(about = "Preview what the nezha-dash shell renders for a location")]
pub struct PreviewArgs {
    /// Location to resolve, including any query string.
    #[arg(default_value = "/")]
    pub location: String,
    /// Dashboard origin. Defaults to NEZHA_DASH_API_BASE_URL or http://127.0.0.1:8008.
    #[arg(long)]
    pub api_base_url: Option<String>,
    /// Router base path. Defaults to NEZHA_DASH_BASE_PATH or "/".
    #[arg(long)]
    pub base_path: Option<String>,
    #[arg(long)]
    pub background_image: Option<String>,
    #[arg(long)]
    pub mobile_background_image: Option<String>,
    /// Read the settings response body from a file instead of the network.
    #[arg(long)]
    pub settings_file: Option<PathBuf>,
    /// Locale the simulated user picked earlier.
    #[arg(long)]
    pub persisted_locale: Option<String>,
    /// Window-focus refetches to simulate after the initial load.
    #[arg(long, default_value_t = 0)]
    pub focus_refreshes: u32,
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
    #[arg(long)]
    pub pretty: bool,
}

/// Stand-in for the page injector: records custom code and never runs it.
#[derive(Debug, Default)]
pub struct DryRunExtension {
    pub injected: Vec<String>,
}

impl TrustedExtension for DryRunExtension {
    fn inject(&mut self, code: &str) -> Result<(), InjectionError> {
        tracing::info!(bytes = code.len(), "custom code recorded, not executed");
        self.injected.push(code.to_string());
        Ok(())
    }
}

pub struct ReqwestSettingsTransport {
    http: reqwest::Client,
    settings_url: String,
}

impl ReqwestSettingsTransport {
    pub fn new(config: &ShellConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            settings_url: config.settings_url(),
        })
    }
}

#[async_trait(?Send)]
impl SettingsTransport for ReqwestSettingsTransport {
    async fn fetch_settings(&self, cache_key: &str) -> Result<Settings, FetchError> {
        tracing::debug!(cache_key, url = %self.settings_url, "requesting settings");
        let response = self
            .http
            .get(&self.settings_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| FetchError::network(format!("settings request failed: {error}")))?;
        let status_code = response.status().as_u16();
        let body = response.text().await.map_err(|error| {
            FetchError::network(format!("settings response body unreadable: {error}"))
        })?;
        decode_settings_response(status_code, &body)
    }
}

/// Replays one saved response body for every fetch.
pub struct SavedSettingsTransport {
    body: String,
}

impl SavedSettingsTransport {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

#[async_trait(?Send)]
impl SettingsTransport for SavedSettingsTransport {
    async fn fetch_settings(&self, _cache_key: &str) -> Result<Settings, FetchError> {
        decode_settings_response(200, &self.body)
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewReport {
    pub location: String,
    pub settings_url: String,
    pub fetches: Vec<&'static str>,
    pub injection_state: &'static str,
    pub injected_code: Vec<String>,
    pub active_locale: Option<String>,
    pub output: ShellOutput,
}

pub fn resolve_config(args: &PreviewArgs) -> Result<ShellConfig> {
    let mut config = ShellConfig::from_env().context("read shell config from environment")?;
    if let Some(url) = args.api_base_url.as_deref() {
        config.api_base_url = normalize_base_url(url)?;
    }
    if let Some(path) = args.base_path.as_deref() {
        config.base_path = normalize_base_path(path)?;
    }
    if args.background_image.is_some() || args.mobile_background_image.is_some() {
        config.background = BackgroundConfig::new(
            args.background_image
                .as_deref()
                .or(config.background.desktop_url()),
            args.mobile_background_image
                .as_deref()
                .or(config.background.mobile_url()),
        );
    }
    Ok(config)
}

fn outcome_label(outcome: FetchOutcome) -> &'static str {
    match outcome {
        FetchOutcome::Loaded => "loaded",
        FetchOutcome::Failed => "failed",
        FetchOutcome::Stale => "stale",
    }
}

/// Mount fetch, then `focus_refreshes` focus refetches, then one render.
pub async fn preview<T>(
    config: &ShellConfig,
    transport: &T,
    args: &PreviewArgs,
) -> Result<PreviewReport>
where
    T: SettingsTransport + ?Sized,
{
    let locale_store = args
        .persisted_locale
        .as_deref()
        .map(MemoryLocaleStore::with_persisted)
        .unwrap_or_default();
    let mut shell = DashboardShell::new(config, DryRunExtension::default(), locale_store);

    let triggers = std::iter::once(RefreshTrigger::Mount)
        .chain((0..args.focus_refreshes).map(|_| RefreshTrigger::Focus));
    let mut fetches = Vec::new();
    for trigger in triggers {
        let outcome = shell
            .refresh(transport, trigger)
            .await
            .with_context(|| format!("{} refresh", trigger.as_str()))?;
        fetches.push(outcome_label(outcome));
    }

    Ok(PreviewReport {
        location: args.location.clone(),
        settings_url: config.settings_url(),
        fetches,
        injection_state: shell.injection_state().as_str(),
        injected_code: shell.extension().injected.clone(),
        active_locale: shell.locale_store().active.clone(),
        output: shell.render(&args.location),
    })
}

pub async fn run(args: PreviewArgs) -> Result<PreviewReport> {
    let config = resolve_config(&args)?;
    match args.settings_file.as_deref() {
        Some(path) => {
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("read settings file {}", path.display()))?;
            preview(&config, &SavedSettingsTransport::new(body), &args).await
        }
        None => {
            let transport =
                ReqwestSettingsTransport::new(&config, Duration::from_secs(args.timeout_secs))?;
            preview(&config, &transport, &args).await
        }
    }
}
