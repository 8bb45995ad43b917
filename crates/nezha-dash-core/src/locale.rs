use crate::settings::Settings;

/// Key the user's explicit language choice is persisted under.
pub const LOCALE_STORAGE_KEY: &str = "language";

/// Bridge to the translation engine and the persisted user preference.
pub trait LocaleStore {
    /// The locale the user explicitly chose, if any.
    fn persisted_locale(&self) -> Option<String>;
    fn active_locale(&self) -> Option<String>;
    /// Switches the active locale without recording it as a user choice.
    fn set_active_locale(&mut self, locale: &str);
}

/// In-memory store used by the native preview and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLocaleStore {
    pub persisted: Option<String>,
    pub active: Option<String>,
    pub activations: usize,
}

impl MemoryLocaleStore {
    pub fn with_persisted(locale: impl Into<String>) -> Self {
        let locale = locale.into();
        Self {
            persisted: Some(locale.clone()),
            active: Some(locale),
            activations: 0,
        }
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn persisted_locale(&self) -> Option<String> {
        self.persisted.clone().filter(|locale| !locale.is_empty())
    }

    fn active_locale(&self) -> Option<String> {
        self.active.clone()
    }

    fn set_active_locale(&mut self, locale: &str) {
        self.active = Some(locale.to_string());
        self.activations += 1;
    }
}

/// Backend locale codes use underscores (`zh_CN`); the translation engine
/// expects BCP-47 tags (`zh-CN`).
#[must_use]
pub fn normalize_locale(raw: &str) -> Option<String> {
    let normalized = raw.trim().replace('_', "-");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleDecision {
    NoLanguage,
    Applied(String),
    KeptPersisted(String),
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct LocalePreferenceApplier {
    last_applied: Option<String>,
}

impl LocalePreferenceApplier {
    pub fn apply<S>(&mut self, settings: &Settings, store: &mut S) -> LocaleDecision
    where
        S: LocaleStore + ?Sized,
    {
        let Some(language) = settings.language().and_then(normalize_locale) else {
            return LocaleDecision::NoLanguage;
        };

        if let Some(persisted) = store.persisted_locale() {
            return LocaleDecision::KeptPersisted(persisted);
        }

        if self.last_applied.as_deref() == Some(language.as_str())
            || store.active_locale().as_deref() == Some(language.as_str())
        {
            self.last_applied = Some(language);
            return LocaleDecision::Unchanged;
        }

        tracing::info!(locale = %language, "applying settings locale");
        store.set_active_locale(&language);
        self.last_applied = Some(language.clone());
        LocaleDecision::Applied(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(language: Option<&str>) -> Settings {
        Settings {
            language: language.map(ToString::to_string),
            ..Settings::default()
        }
    }

    #[test]
    fn applies_settings_language_when_nothing_persisted() {
        let mut applier = LocalePreferenceApplier::default();
        let mut store = MemoryLocaleStore::default();

        let decision = applier.apply(&settings(Some("fr")), &mut store);
        assert_eq!(decision, LocaleDecision::Applied("fr".to_string()));
        assert_eq!(store.active.as_deref(), Some("fr"));
        assert_eq!(store.persisted, None);
    }

    #[test]
    fn repeated_checks_change_locale_once() {
        let mut applier = LocalePreferenceApplier::default();
        let mut store = MemoryLocaleStore::default();

        for _ in 0..3 {
            applier.apply(&settings(Some("fr")), &mut store);
        }
        assert_eq!(store.activations, 1);
    }

    #[test]
    fn persisted_preference_wins() {
        let mut applier = LocalePreferenceApplier::default();
        let mut store = MemoryLocaleStore::with_persisted("en");

        let decision = applier.apply(&settings(Some("fr")), &mut store);
        assert_eq!(decision, LocaleDecision::KeptPersisted("en".to_string()));
        assert_eq!(store.active.as_deref(), Some("en"));
        assert_eq!(store.activations, 0);
    }

    #[test]
    fn missing_language_is_ignored() {
        let mut applier = LocalePreferenceApplier::default();
        let mut store = MemoryLocaleStore::default();

        assert_eq!(
            applier.apply(&settings(None), &mut store),
            LocaleDecision::NoLanguage
        );
        assert_eq!(
            applier.apply(&settings(Some(" ")), &mut store),
            LocaleDecision::NoLanguage
        );
        assert_eq!(store.activations, 0);
    }

    #[test]
    fn backend_codes_are_normalized() {
        let mut applier = LocalePreferenceApplier::default();
        let mut store = MemoryLocaleStore::default();

        applier.apply(&settings(Some("zh_CN")), &mut store);
        assert_eq!(store.active.as_deref(), Some("zh-CN"));
        assert_eq!(normalize_locale("  "), None);
    }

    #[test]
    fn already_active_language_is_left_alone() {
        let mut applier = LocalePreferenceApplier::default();
        let mut store = MemoryLocaleStore {
            active: Some("de".to_string()),
            ..MemoryLocaleStore::default()
        };

        assert_eq!(
            applier.apply(&settings(Some("de")), &mut store),
            LocaleDecision::Unchanged
        );
        assert_eq!(store.activations, 0);
    }

    #[test]
    fn new_settings_language_replaces_previous_default() {
        let mut applier = LocalePreferenceApplier::default();
        let mut store = MemoryLocaleStore::default();

        applier.apply(&settings(Some("fr")), &mut store);
        applier.apply(&settings(Some("de")), &mut store);
        assert_eq!(store.active.as_deref(), Some("de"));
        assert_eq!(store.activations, 2);
    }
}
