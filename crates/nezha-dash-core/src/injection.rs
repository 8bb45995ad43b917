use serde::Serialize;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionState {
    Uninitialized,
    Injecting,
    Ready,
}

impl InjectionState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Injecting => "injecting",
            Self::Ready => "ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InjectionError {
    #[error("page context is unavailable: {0}")]
    ContextUnavailable(String),
    #[error("custom code injection failed: {0}")]
    Failed(String),
}

/// Executes operator-supplied custom code in the page context.
///
/// Trust boundary: the code comes from the dashboard settings endpoint and is
/// controlled by the deployment operator, never by end users. Implementations
/// run it with whatever privileges the page has, so nothing derived from user
/// input may ever be passed to `inject`.
pub trait TrustedExtension {
    fn inject(&mut self, code: &str) -> Result<(), InjectionError>;
}

impl<T: TrustedExtension + ?Sized> TrustedExtension for Box<T> {
    fn inject(&mut self, code: &str) -> Result<(), InjectionError> {
        (**self).inject(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionOutcome {
    Injected,
    AlreadyInjected,
    NothingToInject,
}

/// One-shot gate between the first settings snapshot and the first render.
///
/// States only move forward. Each distinct non-empty `custom_code` is handed
/// to the extension once; an absent or empty value opens the gate without
/// running anything.
#[derive(Debug, Clone)]
pub struct InjectionGate {
    state: InjectionState,
    last_code: Option<String>,
}

impl Default for InjectionGate {
    fn default() -> Self {
        Self {
            state: InjectionState::Uninitialized,
            last_code: None,
        }
    }
}

impl InjectionGate {
    #[must_use]
    pub fn state(&self) -> InjectionState {
        self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == InjectionState::Ready
    }

    pub fn observe<E>(
        &mut self,
        settings: &Settings,
        extension: &mut E,
    ) -> Result<InjectionOutcome, InjectionError>
    where
        E: TrustedExtension + ?Sized,
    {
        let Some(code) = settings.custom_code() else {
            self.advance(InjectionState::Ready);
            return Ok(InjectionOutcome::NothingToInject);
        };

        if self.last_code.as_deref() == Some(code) {
            return Ok(InjectionOutcome::AlreadyInjected);
        }

        // Recorded before running so a failing value is not retried on re-delivery.
        self.last_code = Some(code.to_string());
        self.advance(InjectionState::Injecting);
        tracing::info!(code_len = code.len(), "injecting operator custom code");

        if let Err(error) = extension.inject(code) {
            tracing::error!(error = %error, state = self.state.as_str(), "custom code injection failed");
            return Err(error);
        }

        self.advance(InjectionState::Ready);
        Ok(InjectionOutcome::Injected)
    }

    fn advance(&mut self, next: InjectionState) {
        if next > self.state {
            tracing::debug!(from = self.state.as_str(), to = next.as_str(), "injection gate advanced");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingExtension {
        calls: Vec<String>,
        fail_with: Option<String>,
    }

    impl TrustedExtension for RecordingExtension {
        fn inject(&mut self, code: &str) -> Result<(), InjectionError> {
            self.calls.push(code.to_string());
            match &self.fail_with {
                Some(message) => Err(InjectionError::Failed(message.clone())),
                None => Ok(()),
            }
        }
    }

    fn settings(code: Option<&str>) -> Settings {
        Settings {
            custom_code: code.map(ToString::to_string),
            ..Settings::default()
        }
    }

    #[test]
    fn starts_uninitialized() {
        let gate = InjectionGate::default();
        assert_eq!(gate.state(), InjectionState::Uninitialized);
        assert!(!gate.is_ready());
    }

    #[test]
    fn missing_code_opens_gate_without_injecting() {
        let mut gate = InjectionGate::default();
        let mut extension = RecordingExtension::default();

        let outcome = gate.observe(&settings(None), &mut extension).expect("observed");
        assert_eq!(outcome, InjectionOutcome::NothingToInject);
        assert!(gate.is_ready());
        assert!(extension.calls.is_empty());
    }

    #[test]
    fn empty_code_opens_gate_without_injecting() {
        let mut gate = InjectionGate::default();
        let mut extension = RecordingExtension::default();

        gate.observe(&settings(Some("")), &mut extension).expect("observed");
        assert!(gate.is_ready());
        assert!(extension.calls.is_empty());
    }

    #[test]
    fn same_code_redelivered_injects_once() {
        let mut gate = InjectionGate::default();
        let mut extension = RecordingExtension::default();
        let snapshot = settings(Some("<style>body{}</style>"));

        assert_eq!(
            gate.observe(&snapshot, &mut extension).expect("first"),
            InjectionOutcome::Injected
        );
        assert_eq!(
            gate.observe(&snapshot, &mut extension).expect("second"),
            InjectionOutcome::AlreadyInjected
        );
        assert_eq!(extension.calls, vec!["<style>body{}</style>".to_string()]);
        assert!(gate.is_ready());
    }

    #[test]
    fn distinct_code_injects_again_and_stays_ready() {
        let mut gate = InjectionGate::default();
        let mut extension = RecordingExtension::default();

        gate.observe(&settings(Some("a")), &mut extension).expect("a");
        gate.observe(&settings(Some("b")), &mut extension).expect("b");

        assert_eq!(extension.calls, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(gate.state(), InjectionState::Ready);
    }

    #[test]
    fn clearing_code_after_ready_does_not_move_backwards() {
        let mut gate = InjectionGate::default();
        let mut extension = RecordingExtension::default();

        gate.observe(&settings(Some("a")), &mut extension).expect("a");
        gate.observe(&settings(None), &mut extension).expect("cleared");
        assert_eq!(gate.state(), InjectionState::Ready);
        assert_eq!(extension.calls.len(), 1);
    }

    #[test]
    fn failure_propagates_and_keeps_gate_closed() {
        let mut gate = InjectionGate::default();
        let mut extension = RecordingExtension {
            fail_with: Some("syntax error".to_string()),
            ..RecordingExtension::default()
        };

        let error = gate
            .observe(&settings(Some("broken(")), &mut extension)
            .expect_err("propagated");
        assert_eq!(error, InjectionError::Failed("syntax error".to_string()));
        assert_eq!(gate.state(), InjectionState::Injecting);

        let outcome = gate
            .observe(&settings(Some("broken(")), &mut extension)
            .expect("not retried");
        assert_eq!(outcome, InjectionOutcome::AlreadyInjected);
        assert_eq!(extension.calls.len(), 1);
        assert!(!gate.is_ready());
    }

    #[test]
    fn boxed_extension_forwards() {
        let mut gate = InjectionGate::default();
        let mut extension: Box<dyn TrustedExtension> = Box::new(RecordingExtension::default());
        gate.observe(&settings(Some("a")), &mut extension).expect("boxed");
        assert!(gate.is_ready());
    }
}
