use super::*;

    /// Path, query and fragment of the page, which is what the route table resolves.
    pub(super) fn current_location() -> String {
        let Some(window) = web_sys::window() else {
            return "/".to_string();
        };
        let location = window.location();
        let Ok(pathname) = location.pathname() else {
            return "/".to_string();
        };
        let pathname = if pathname.trim().is_empty() {
            "/".to_string()
        } else {
            pathname
        };
        let search = location.search().unwrap_or_default();
        let hash = location.hash().unwrap_or_default();
        format!("{pathname}{search}{hash}")
    }

    pub(super) fn navigate_to(path: &str, push_history: bool) {
        if push_history {
            if let Some(window) = web_sys::window() {
                if let Ok(history) = window.history() {
                    if let Err(error) = history.push_state_with_url(&JsValue::NULL, "", Some(path)) {
                        tracing::warn!(?error, path, "failed to push history entry");
                    }
                }
            }
        }
        render_current();
    }

    pub(super) fn install_browser_navigation_handlers() {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        ROUTE_POPSTATE_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                render_current();
            }));
            let _ = window
                .add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref());
            *slot.borrow_mut() = Some(callback);
        });

        ROUTE_LINK_CLICK_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |event| {
                intercept_internal_link_click(event);
            }));
            let _ = document.add_event_listener_with_callback_and_bool(
                "click",
                callback.as_ref().unchecked_ref(),
                true,
            );
            *slot.borrow_mut() = Some(callback);
        });
    }

    pub(super) fn intercept_internal_link_click(event: web_sys::Event) {
        if event.default_prevented() {
            return;
        }
        let Some(mouse_event) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        if mouse_event.button() != 0
            || mouse_event.meta_key()
            || mouse_event.ctrl_key()
            || mouse_event.shift_key()
            || mouse_event.alt_key()
        {
            return;
        }

        let Some(anchor) = anchor_from_event(&event) else {
            return;
        };
        let href_attribute = anchor.get_attribute("href").unwrap_or_default();
        if href_attribute.trim().is_empty() || href_attribute.starts_with('#') {
            return;
        }
        if anchor.has_attribute("download") {
            return;
        }
        let target = anchor.target();
        if !target.is_empty() && target != "_self" {
            return;
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(origin) = window.location().origin() else {
            return;
        };
        let href = anchor.href();
        let Some(path_with_query_and_hash) = href.strip_prefix(&origin) else {
            return;
        };
        let path = path_with_query_and_hash
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        if path.is_empty() || !is_shell_path(path) {
            return;
        }

        event.prevent_default();
        navigate_to(path_with_query_and_hash, true);
    }

    pub(super) fn anchor_from_event(event: &web_sys::Event) -> Option<HtmlAnchorElement> {
        let composed_path = event.composed_path();
        for index in 0..composed_path.length() {
            let value = composed_path.get(index);
            if let Ok(anchor) = value.dyn_into::<HtmlAnchorElement>() {
                return Some(anchor);
            }
        }
        None
    }

    /// Links under the router base path stay client side; anything else is a
    /// regular page load.
    pub(super) fn is_shell_path(path: &str) -> bool {
        let base_path = SHELL.with(|slot| {
            slot.try_borrow()
                .ok()
                .and_then(|shell| shell.as_ref().map(|shell| shell.routes().base_path().to_string()))
        });
        let Some(base_path) = base_path else {
            return false;
        };
        base_path == "/"
            || path == base_path
            || path
                .strip_prefix(base_path.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
