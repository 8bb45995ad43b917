use super::*;

    pub(super) fn set_boot_phase(phase: &str, detail: &str) {
        DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.phase = phase.to_string();
            state.detail = detail.to_string();
            if phase != "error" {
                state.last_error = None;
            }
        });
        tracing::debug!(phase, detail, "boot phase");
    }

    pub(super) fn set_boot_error(message: &str) {
        DIAGNOSTICS.with(|state| {
            let mut state = state.borrow_mut();
            state.phase = "error".to_string();
            state.detail = "startup failed".to_string();
            state.last_error = Some(message.to_string());
        });
    }

    pub(super) fn read_host_context() -> HostContext {
        let Some(window) = web_sys::window() else {
            return HostContext::default();
        };
        HostContext {
            origin: window.location().origin().ok(),
            base_path: BUILD_BASE_PATH.map(ToString::to_string),
            background_image: host_string_global(&window, HOST_BACKGROUND_GLOBAL),
            mobile_background_image: host_string_global(&window, HOST_MOBILE_BACKGROUND_GLOBAL),
        }
    }

    fn host_string_global(window: &web_sys::Window, name: &str) -> Option<String> {
        js_sys::Reflect::get(window, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.as_string())
    }

    /// Runs one settings fetch. The shell is only borrowed before and after
    /// the await, so overlapping refreshes are settled by their tickets.
    pub(super) async fn refresh_settings(trigger: RefreshTrigger) -> Result<FetchOutcome, BootError> {
        let transport = TRANSPORT
            .with(|slot| slot.borrow().clone())
            .ok_or(BootError::NotInitialized)?;
        let (ticket, cache_key) = SHELL
            .with(|slot| {
                slot.borrow_mut().as_mut().map(|shell| {
                    (shell.begin_refresh(trigger), shell.cache_key().to_string())
                })
            })
            .ok_or(BootError::NotInitialized)?;
        DIAGNOSTICS.with(|state| state.borrow_mut().refreshes += 1);

        let result = transport.fetch_settings(&cache_key).await;
        let applied = SHELL
            .with(|slot| {
                slot.borrow_mut()
                    .as_mut()
                    .map(|shell| shell.apply_fetch(ticket, result))
            })
            .ok_or(BootError::NotInitialized)?;
        render_current();
        Ok(applied?)
    }

    pub(super) fn schedule_refresh(trigger: RefreshTrigger) {
        spawn_local(async move {
            if let Err(error) = refresh_settings(trigger).await {
                tracing::error!(%error, trigger = trigger.as_str(), "settings refresh failed");
                set_boot_error(&error.to_string());
            }
        });
    }

    pub(super) fn install_refresh_handlers() {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        WINDOW_FOCUS_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                schedule_refresh(RefreshTrigger::Focus);
            }));
            let _ = window
                .add_event_listener_with_callback("focus", callback.as_ref().unchecked_ref());
            *slot.borrow_mut() = Some(callback);
        });

        VISIBILITY_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let observed = document.clone();
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                if observed.visibility_state() == web_sys::VisibilityState::Visible {
                    schedule_refresh(RefreshTrigger::Focus);
                }
            }));
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                callback.as_ref().unchecked_ref(),
            );
            *slot.borrow_mut() = Some(callback);
        });
    }

    pub(super) fn current_output(location: &str) -> ShellOutput {
        SHELL
            .with(|slot| {
                slot.try_borrow()
                    .ok()
                    .and_then(|shell| shell.as_ref().map(|shell| shell.render(location)))
            })
            .unwrap_or(ShellOutput::Empty)
    }

    /// Re-renders for the current location. Skipped while the shell is busy,
    /// e.g. when injected code navigates during injection; the caller renders
    /// once it releases the shell.
    pub(super) fn render_current() {
        let location = current_location();
        let output = SHELL.with(|slot| {
            slot.try_borrow()
                .ok()
                .and_then(|shell| shell.as_ref().map(|shell| shell.render(&location)))
        });
        let Some(output) = output else {
            tracing::debug!("shell busy or not initialized, render skipped");
            return;
        };
        if let Err(error) = mount_output(&output) {
            tracing::error!(%error, "failed to render dashboard shell");
        }
    }
