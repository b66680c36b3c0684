//! Dioxus launcher page.
//!
//! The page logic (embed, theme, install) lives in plain state objects; this
//! module owns them in signals, wires them to browser events and renders the
//! launcher from the resulting `PageView`.

use dioxus::prelude::*;

pub mod components;
pub mod host;
pub mod install;
pub mod launcher;
pub mod pages;
pub mod theme;

use crate::settings::LauncherSettings;
use host::{use_page_host, PageHost};
use install::use_install_provider;
use launcher::use_launcher_provider;
use pages::Home;
use theme::use_theme_provider;

/// Root app component
#[component]
pub fn App() -> Element {
    let settings = use_hook(LauncherSettings::default);

    use_launcher_contexts(&settings);
    use_service_worker(settings.service_worker_path.clone());

    rsx! {
        Home {}
    }
}

/// Provide the settings, page host, theme, launcher and install contexts
/// the page components read
pub fn use_launcher_contexts(settings: &LauncherSettings) -> PageHost {
    use_context_provider(|| settings.clone());

    // Page view signal + browser calls, shared by every context below
    let host = use_page_host();

    use_theme_provider(host);
    use_launcher_provider(host, settings.clone());
    use_install_provider(host, settings.clone());
    host
}

/// Get the launcher settings - use in any component
pub fn use_settings() -> LauncherSettings {
    use_context::<LauncherSettings>()
}

/// Register the shell service worker once the page is up (best effort)
pub fn use_service_worker(script: String) {
    #[cfg(target_arch = "wasm32")]
    {
        use_effect(move || {
            let script = script.clone();
            spawn(async move {
                if let Err(e) = register_service_worker(&script).await {
                    tracing::debug!("Service worker registration skipped: {}", e);
                }
            });
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = script;
    }
}

// ============ WASM-only helpers ============

#[cfg(target_arch = "wasm32")]
async fn register_service_worker(script: &str) -> Result<(), String> {
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;

    let window = web_sys::window().ok_or("no window")?;
    let navigator = window.navigator();
    let supported = js_sys::Reflect::has(&navigator, &JsValue::from_str("serviceWorker"))
        .unwrap_or(false);
    if !supported {
        return Err("service workers not supported".into());
    }

    JsFuture::from(navigator.service_worker().register(script))
        .await
        .map_err(|e| format!("{:?}", e))?;
    tracing::info!("Service worker registered: {}", script);
    Ok(())
}
