use super::*;

use nezha_dash_core::settings::decode_settings_response;

/// Same-origin settings client backed by `fetch`.
#[derive(Debug, Clone)]
pub(super) struct GlooSettingsTransport {
    settings_url: String,
}

impl GlooSettingsTransport {
    pub(super) fn new(config: &ShellConfig) -> Self {
        Self {
            settings_url: config.settings_url(),
        }
    }
}

#[async_trait(?Send)]
impl SettingsTransport for GlooSettingsTransport {
    async fn fetch_settings(&self, cache_key: &str) -> Result<Settings, FetchError> {
        tracing::debug!(cache_key, url = %self.settings_url, "requesting settings");
        let response = Request::get(&self.settings_url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|error| FetchError::network(format!("settings request failed: {error}")))?;
        let status_code = response.status();
        let body = response.text().await.map_err(|error| {
            FetchError::network(format!("settings response body unreadable: {error}"))
        })?;
        decode_settings_response(status_code, &body)
    }
}
