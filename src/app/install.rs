//! Install prompt context.
//!
//! Listens for `beforeinstallprompt`, keeps the event in an
//! `InstallPromptManager` signal and replays it from the install card.
//! Also schedules the redirect when launched as an installed app.

use dioxus::prelude::*;
use futures::future::LocalBoxFuture;

use super::host::{sleep, PageHost};
use crate::host::{HostError, HostSurface};
use crate::install::{accept_install, InstallPrompt, InstallPromptManager, UserChoice};
use crate::settings::LauncherSettings;

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    /// Chromium's install-availability event (not in web-sys)
    #[wasm_bindgen(extends = web_sys::Event)]
    #[derive(Clone, Debug)]
    pub type BeforeInstallPromptEvent;

    #[wasm_bindgen(method, catch)]
    fn prompt(this: &BeforeInstallPromptEvent) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, getter, js_name = userChoice)]
    fn user_choice(this: &BeforeInstallPromptEvent) -> js_sys::Promise;
}

/// Retained `beforeinstallprompt` event
pub struct BrowserInstallPrompt {
    #[cfg(target_arch = "wasm32")]
    event: BeforeInstallPromptEvent,
}

impl InstallPrompt for BrowserInstallPrompt {
    fn prevent_default(&self) {
        #[cfg(target_arch = "wasm32")]
        self.event.prevent_default();
    }

    #[cfg(target_arch = "wasm32")]
    fn prompt(self) -> LocalBoxFuture<'static, Result<UserChoice, HostError>> {
        use wasm_bindgen_futures::JsFuture;

        let rejected = |e: JsValue| HostError::Rejected {
            action: "install prompt",
            reason: e.as_string().unwrap_or_else(|| format!("{:?}", e)),
        };
        Box::pin(async move {
            self.event.prompt().map_err(rejected)?;
            let choice = JsFuture::from(self.event.user_choice())
                .await
                .map_err(rejected)?;
            let outcome = js_sys::Reflect::get(&choice, &JsValue::from_str("outcome"))
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_default();
            Ok(UserChoice::from_outcome(&outcome))
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn prompt(self) -> LocalBoxFuture<'static, Result<UserChoice, HostError>> {
        Box::pin(async { Err(HostError::Unsupported("install prompt")) })
    }
}

pub type PageInstallManager = InstallPromptManager<BrowserInstallPrompt>;

/// Global install state shared via context
#[derive(Clone, Copy)]
pub struct InstallContext {
    pub manager: Signal<PageInstallManager>,
}

impl InstallContext {
    pub fn prompt_visible(&self) -> bool {
        self.manager.read().prompt_visible()
    }

    /// Install button
    pub fn accept(&self) {
        let mut manager = self.manager;
        let event = manager.write().begin_install();
        spawn(async move {
            if let Some(result) = accept_install(event).await {
                manager.write().finish_install(result);
            }
        });
    }

    /// Not-now button
    pub fn dismiss(&self) {
        let mut manager = self.manager;
        manager.write().dismiss();
    }
}

/// Removes the window listener when the app unmounts
#[cfg(target_arch = "wasm32")]
struct InstallListenerGuard {
    window: web_sys::Window,
    listener: Closure<dyn FnMut(web_sys::Event)>,
}

#[cfg(target_arch = "wasm32")]
impl Drop for InstallListenerGuard {
    fn drop(&mut self) {
        let _ = self.window.remove_event_listener_with_callback(
            "beforeinstallprompt",
            self.listener.as_ref().unchecked_ref(),
        );
    }
}

/// Initialize install context provider - call once at app root
pub fn use_install_provider(host: PageHost, settings: LauncherSettings) -> InstallContext {
    let manager = use_signal(|| PageInstallManager::detect(&host));
    let ctx = use_context_provider(|| InstallContext { manager });

    // Launched as an installed app: go straight to the game after a pause
    use_effect(move || {
        let redirect = manager
            .peek()
            .launch_redirect(&settings.play_url, settings.redirect_delay());
        if let Some(redirect) = redirect {
            let mut host = host;
            spawn(async move {
                sleep(redirect.delay).await;
                host.navigate(&redirect.url);
            });
        }
    });

    #[cfg(target_arch = "wasm32")]
    {
        let guard: Rc<RefCell<Option<InstallListenerGuard>>> =
            use_hook(|| Rc::new(RefCell::new(None)));

        let guard_clone = guard.clone();
        use_effect(move || {
            if guard_clone.borrow().is_some() {
                return;
            }
            let Some(window) = web_sys::window() else {
                return;
            };

            let mut manager = manager;
            let listener = Closure::wrap(Box::new(move |event: web_sys::Event| {
                let event: BeforeInstallPromptEvent = event.unchecked_into();
                manager
                    .write()
                    .on_install_available(BrowserInstallPrompt { event });
            }) as Box<dyn FnMut(_)>);

            if let Err(e) = window.add_event_listener_with_callback(
                "beforeinstallprompt",
                listener.as_ref().unchecked_ref(),
            ) {
                tracing::warn!("Failed to listen for install prompts: {:?}", e);
                return;
            }
            *guard_clone.borrow_mut() = Some(InstallListenerGuard {
                window,
                listener,
            });
        });
    }

    ctx
}

/// Get install context - use in any component
pub fn use_install() -> InstallContext {
    use_context::<InstallContext>()
}
