use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SETTINGS_CACHE_KEY: &str = "setting";
pub const SETTINGS_API_PATH: &str = "/api/v1/setting";

/// Operator settings snapshot served by the dashboard backend.
///
/// Only the fields the shell acts on are typed; everything else the backend
/// sends is kept verbatim in `extra` for the page views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    #[must_use]
    pub fn custom_code(&self) -> Option<&str> {
        non_empty(self.custom_code.as_deref())
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        non_empty(self.language.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
struct SettingsEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    data: Option<Settings>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Network,
    Http,
    Api,
    Decode,
}

impl FetchErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Http => "http",
            Self::Api => "api",
            Self::Decode => "decode",
        }
    }
}

/// Failure reported by the settings transport. The message is what the error
/// view shows, so it is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub message: String,
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            status_code: None,
            message: message.into(),
        }
    }

    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Http,
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Api,
            status_code: None,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Decode,
            status_code: None,
            message: message.into(),
        }
    }
}

/// Decodes a `/api/v1/setting` response body.
pub fn decode_settings_response(status_code: u16, body: &str) -> Result<Settings, FetchError> {
    let envelope = serde_json::from_str::<SettingsEnvelope>(body);

    if !(200..300).contains(&status_code) {
        let message = envelope
            .ok()
            .and_then(|envelope| envelope.error)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| format!("settings request failed with status {status_code}"));
        return Err(FetchError::http(status_code, message));
    }

    let envelope = envelope
        .map_err(|error| FetchError::decode(format!("invalid settings response: {error}")))?;

    if envelope.success == Some(false) {
        return Err(FetchError::api(
            envelope
                .error
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| "settings request was rejected".to_string()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| FetchError::api("settings response has no data"))
}

/// Latest state of the settings query. Both fields empty means pending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResult {
    pub data: Option<Arc<Settings>>,
    pub error: Option<FetchError>,
}

impl FetchResult {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTrigger {
    Mount,
    Focus,
}

impl RefreshTrigger {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mount => "mount",
            Self::Focus => "focus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    trigger: RefreshTrigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded,
    Failed,
    Stale,
}

#[async_trait(?Send)]
pub trait SettingsTransport {
    async fn fetch_settings(&self, cache_key: &str) -> Result<Settings, FetchError>;
}

/// Settings query keyed by a stable cache key.
///
/// Every refresh takes a ticket; only the newest ticket may settle the
/// result, so a slow fetch that finishes after a newer one was issued is
/// dropped instead of overwriting fresher data.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    cache_key: String,
    issued: u64,
    settled: u64,
    result: FetchResult,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new(SETTINGS_CACHE_KEY)
    }
}

impl SettingsLoader {
    pub fn new(cache_key: impl Into<String>) -> Self {
        Self {
            cache_key: cache_key.into(),
            issued: 0,
            settled: 0,
            result: FetchResult::default(),
        }
    }

    #[must_use]
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    #[must_use]
    pub fn result(&self) -> &FetchResult {
        &self.result
    }

    pub fn begin_fetch(&mut self, trigger: RefreshTrigger) -> FetchTicket {
        self.issued += 1;
        tracing::debug!(
            cache_key = %self.cache_key,
            generation = self.issued,
            trigger = trigger.as_str(),
            "settings fetch started"
        );
        FetchTicket {
            generation: self.issued,
            trigger,
        }
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Settings, FetchError>,
    ) -> FetchOutcome {
        if ticket.generation < self.issued || ticket.generation <= self.settled {
            tracing::debug!(
                cache_key = %self.cache_key,
                generation = ticket.generation,
                newest = self.issued,
                "dropping stale settings fetch"
            );
            return FetchOutcome::Stale;
        }
        self.settled = ticket.generation;

        match result {
            Ok(settings) => {
                tracing::info!(
                    cache_key = %self.cache_key,
                    trigger = ticket.trigger.as_str(),
                    has_custom_code = settings.custom_code().is_some(),
                    language = settings.language().unwrap_or_default(),
                    "settings loaded"
                );
                self.result.data = Some(Arc::new(settings));
                self.result.error = None;
                FetchOutcome::Loaded
            }
            Err(error) => {
                tracing::warn!(
                    cache_key = %self.cache_key,
                    trigger = ticket.trigger.as_str(),
                    kind = error.kind.as_str(),
                    error = %error,
                    "settings fetch failed"
                );
                self.result.error = Some(error);
                FetchOutcome::Failed
            }
        }
    }

    pub async fn refresh<T>(&mut self, transport: &T, trigger: RefreshTrigger) -> FetchOutcome
    where
        T: SettingsTransport + ?Sized,
    {
        let ticket = self.begin_fetch(trigger);
        let result = transport.fetch_settings(&self.cache_key).await;
        self.complete(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings_with_code(code: &str) -> Settings {
        Settings {
            custom_code: Some(code.to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn decodes_settings_envelope_and_keeps_unknown_fields() {
        let body = json!({
            "success": true,
            "data": {
                "custom_code": "<script>window.x = 1</script>",
                "language": "zh_CN",
                "site_name": "Nezha",
                "version": "1.4.2",
                "tls": false
            }
        })
        .to_string();

        let settings = decode_settings_response(200, &body).expect("decoded");
        assert_eq!(settings.custom_code(), Some("<script>window.x = 1</script>"));
        assert_eq!(settings.language(), Some("zh_CN"));
        assert_eq!(settings.site_name.as_deref(), Some("Nezha"));
        assert_eq!(settings.extra.get("tls"), Some(&json!(false)));
    }

    #[test]
    fn blank_fields_read_as_absent() {
        let settings = Settings {
            custom_code: Some("   ".to_string()),
            language: Some(String::new()),
            ..Settings::default()
        };
        assert_eq!(settings.custom_code(), None);
        assert_eq!(settings.language(), None);
    }

    #[test]
    fn rejected_envelope_surfaces_backend_message() {
        let body = json!({ "success": false, "error": "database locked" }).to_string();
        let error = decode_settings_response(200, &body).expect_err("rejected");
        assert_eq!(error.kind, FetchErrorKind::Api);
        assert_eq!(error.message, "database locked");
    }

    #[test]
    fn http_failure_keeps_status_and_falls_back_to_generic_message() {
        let error = decode_settings_response(502, "<html>bad gateway</html>").expect_err("http");
        assert_eq!(error.kind, FetchErrorKind::Http);
        assert_eq!(error.status_code, Some(502));
        assert_eq!(error.message, "settings request failed with status 502");
    }

    #[test]
    fn undecodable_body_is_a_decode_error() {
        let error = decode_settings_response(200, "not json").expect_err("decode");
        assert_eq!(error.kind, FetchErrorKind::Decode);
        assert!(error.message.starts_with("invalid settings response"));
    }

    #[test]
    fn new_snapshot_replaces_previous_wholesale() {
        let mut loader = SettingsLoader::default();
        let first = loader.begin_fetch(RefreshTrigger::Mount);
        let mut initial = settings_with_code("a");
        initial.language = Some("en".to_string());
        assert_eq!(loader.complete(first, Ok(initial)), FetchOutcome::Loaded);

        let second = loader.begin_fetch(RefreshTrigger::Focus);
        assert_eq!(
            loader.complete(second, Ok(settings_with_code("b"))),
            FetchOutcome::Loaded
        );

        let data = loader.result().data.clone().expect("data");
        assert_eq!(data.custom_code(), Some("b"));
        assert_eq!(data.language(), None);
    }

    #[test]
    fn older_ticket_completing_late_is_dropped() {
        let mut loader = SettingsLoader::default();
        let slow = loader.begin_fetch(RefreshTrigger::Mount);
        let fast = loader.begin_fetch(RefreshTrigger::Focus);

        assert_eq!(
            loader.complete(fast, Ok(settings_with_code("new"))),
            FetchOutcome::Loaded
        );
        assert_eq!(
            loader.complete(slow, Ok(settings_with_code("old"))),
            FetchOutcome::Stale
        );

        let data = loader.result().data.clone().expect("data");
        assert_eq!(data.custom_code(), Some("new"));
    }

    #[test]
    fn failure_keeps_last_snapshot_and_success_clears_error() {
        let mut loader = SettingsLoader::default();
        let ticket = loader.begin_fetch(RefreshTrigger::Mount);
        loader.complete(ticket, Ok(settings_with_code("a")));

        let ticket = loader.begin_fetch(RefreshTrigger::Focus);
        assert_eq!(
            loader.complete(ticket, Err(FetchError::network("network down"))),
            FetchOutcome::Failed
        );
        assert!(loader.result().data.is_some());
        assert_eq!(
            loader.result().error.as_ref().map(|error| error.message.as_str()),
            Some("network down")
        );

        let ticket = loader.begin_fetch(RefreshTrigger::Focus);
        loader.complete(ticket, Ok(settings_with_code("a")));
        assert!(loader.result().error.is_none());
    }

    #[test]
    fn fresh_loader_is_pending() {
        let loader = SettingsLoader::default();
        assert!(loader.result().is_pending());
        assert_eq!(loader.cache_key(), SETTINGS_CACHE_KEY);
    }
}
