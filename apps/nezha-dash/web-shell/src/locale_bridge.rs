use nezha_dash_core::LocaleStore;

/// Page-side locale facilities: the stored user choice and the translation
/// engine switch.
pub(crate) trait LocaleHost {
    fn stored_preference(&self) -> Option<String>;
    fn change_language(&mut self, locale: &str);
}

/// Locale store over a [`LocaleHost`].
///
/// The active locale is only what this store has applied. Page markup such
/// as `<html lang>` says nothing about the engine's current language, so it
/// is never read back.
#[derive(Debug, Default)]
pub(crate) struct HostLocaleStore<H> {
    host: H,
    active: Option<String>,
}

impl<H> HostLocaleStore<H> {
    pub(crate) fn new(host: H) -> Self {
        Self { host, active: None }
    }
}

impl<H: LocaleHost> LocaleStore for HostLocaleStore<H> {
    fn persisted_locale(&self) -> Option<String> {
        self.host
            .stored_preference()
            .filter(|locale| !locale.trim().is_empty())
    }

    fn active_locale(&self) -> Option<String> {
        self.active.clone()
    }

    fn set_active_locale(&mut self, locale: &str) {
        self.host.change_language(locale);
        self.active = Some(locale.to_string());
    }
}
