use super::*;

/// Browser side of the locale bridge: the user choice lives in
/// `localStorage`; switching updates `<html lang>` and, when the host page
/// exposes one, its translation engine.
#[derive(Debug, Default)]
pub(super) struct BrowserLocaleHost;

pub(super) type BrowserLocaleStore = HostLocaleStore<BrowserLocaleHost>;

impl LocaleHost for BrowserLocaleHost {
    fn stored_preference(&self) -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok()??;
        storage.get_item(LOCALE_STORAGE_KEY).ok().flatten()
    }

    fn change_language(&mut self, locale: &str) {
        if let Some(root) = document().ok().and_then(|document| document.document_element()) {
            if let Err(error) = root.set_attribute("lang", locale) {
                tracing::warn!(?error, locale, "failed to set document language");
            }
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let hook = js_sys::Reflect::get(&window, &JsValue::from_str(HOST_LOCALE_HOOK))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok());
        if let Some(hook) = hook {
            if let Err(error) = hook.call1(&JsValue::NULL, &JsValue::from_str(locale)) {
                tracing::warn!(?error, locale, "host locale hook failed");
            }
        }
    }
}
