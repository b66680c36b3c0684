//! Browser host surface.
//!
//! Element visibility, the frame and the notice live in a `PageView` signal
//! the components render from. Fullscreen, storage, window and display-mode
//! calls go to `web-sys`; outside the browser they degrade to no-ops.

use dioxus::prelude::*;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::host::{FrameId, HostError, HostSurface, Slot};
use crate::theme::Theme;

/// DOM id of the game container (fullscreen target)
pub const GAME_CONTAINER_ID: &str = "gameContainer";

/// Everything the page renders from
#[derive(Clone, Debug, PartialEq)]
pub struct PageView {
    pub visible: BTreeSet<Slot>,
    pub frame: Option<FrameId>,
    pub frame_url: Option<String>,
    /// Bumped on every frame navigation
    pub navigation: u64,
    pub next_frame: u64,
    pub fullscreen_enabled: bool,
    pub notice: Option<String>,
    pub theme: Theme,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            // Preview image shows until the embed boots
            visible: [Slot::Preview].into_iter().collect(),
            frame: None,
            frame_url: None,
            navigation: 0,
            next_frame: 0,
            fullscreen_enabled: false,
            notice: None,
            theme: Theme::default(),
        }
    }
}

impl PageView {
    pub fn is_visible(&self, slot: Slot) -> bool {
        self.visible.contains(&slot)
    }

    /// Point the frame at `url`. Every call counts as a new navigation, so
    /// the same URL twice still reloads.
    pub fn navigate_frame(&mut self, frame: FrameId, url: &str) {
        if self.frame == Some(frame) {
            self.frame_url = Some(url.to_string());
            self.navigation += 1;
        }
    }

    /// Element key for the iframe. It changes with every navigation, so the
    /// renderer mounts a fresh element that loads (and fires `load`) again.
    pub fn frame_key(&self) -> Option<String> {
        self.frame.map(|frame| format!("{}-{}", frame, self.navigation))
    }
}

/// `HostSurface` over the page signal. Copy, so handlers can capture it.
#[derive(Clone, Copy)]
pub struct PageHost {
    pub view: Signal<PageView>,
}

/// Create the page host and provide it - call once at app root
pub fn use_page_host() -> PageHost {
    let view = use_signal(PageView::default);
    use_context_provider(|| PageHost { view })
}

/// Get the page host - use in any component
pub fn use_page() -> PageHost {
    use_context::<PageHost>()
}

impl PageHost {
    pub fn dismiss_notice(&mut self) {
        self.view.write().notice = None;
    }
}

// Logic reads go through `peek` so effects and handlers driving the
// controllers never subscribe to the view they are updating.
impl HostSurface for PageHost {
    fn has(&self, _slot: Slot) -> bool {
        // Every slot is part of the page markup
        true
    }

    fn set_visible(&mut self, slot: Slot, visible: bool) {
        let mut view = self.view.write();
        if visible {
            view.visible.insert(slot);
        } else {
            view.visible.remove(&slot);
        }
    }

    fn frame(&self) -> Option<FrameId> {
        self.view.peek().frame
    }

    fn create_frame(&mut self) -> FrameId {
        let mut view = self.view.write();
        let frame = FrameId(view.next_frame);
        view.next_frame += 1;
        view.frame = Some(frame);
        view.frame_url = None;
        frame
    }

    fn navigate_frame(&mut self, frame: FrameId, url: &str) {
        self.view.write().navigate_frame(frame, url);
    }

    fn remove_frame(&mut self, frame: FrameId) {
        let mut view = self.view.write();
        if view.frame == Some(frame) {
            view.frame = None;
            view.frame_url = None;
        }
    }

    fn enable_fullscreen_control(&mut self) {
        self.view.write().fullscreen_enabled = true;
    }

    fn is_fullscreen(&self) -> bool {
        browser::is_fullscreen()
    }

    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        browser::request_fullscreen(GAME_CONTAINER_ID)
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        browser::exit_fullscreen()
    }

    fn open_in_new_tab(&mut self, url: &str) -> bool {
        browser::open_in_new_tab(url)
    }

    fn notify(&mut self, message: &str) {
        self.view.write().notice = Some(message.to_string());
    }

    fn navigate(&mut self, url: &str) {
        browser::navigate(url)
    }

    fn is_standalone(&self) -> bool {
        browser::is_standalone()
    }

    fn load_item(&self, key: &str) -> Option<String> {
        browser::load_item(key)
    }

    fn store_item(&mut self, key: &str, value: &str) -> Result<(), HostError> {
        browser::store_item(key, value)
    }

    fn apply_theme(&mut self, theme: Theme) {
        browser::set_data_theme(theme.data_theme());
        self.view.write().theme = theme;
    }
}

pub use browser::sleep;

// ============ WASM-only helpers ============

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use wasm_bindgen::JsValue;

    fn rejected(action: &'static str, e: JsValue) -> HostError {
        HostError::Rejected {
            action,
            reason: e.as_string().unwrap_or_else(|| format!("{:?}", e)),
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    pub fn is_fullscreen() -> bool {
        document()
            .and_then(|d| d.fullscreen_element())
            .is_some()
    }

    pub fn request_fullscreen(container_id: &str) -> Result<(), HostError> {
        let container = document()
            .and_then(|d| d.get_element_by_id(container_id))
            .ok_or(HostError::Unsupported("fullscreen"))?;
        container
            .request_fullscreen()
            .map_err(|e| rejected("fullscreen", e))
    }

    pub fn exit_fullscreen() -> Result<(), HostError> {
        let document = document().ok_or(HostError::Unsupported("fullscreen"))?;
        document.exit_fullscreen();
        Ok(())
    }

    /// Opens without the `noopener` feature (which makes `open` return null
    /// even on success) and cuts the opener afterwards.
    pub fn open_in_new_tab(url: &str) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        match window.open_with_url_and_target(url, "_blank") {
            Ok(Some(opened)) => {
                if let Err(e) = opened.set_opener(&JsValue::NULL) {
                    tracing::debug!("Could not clear opener: {:?}", e);
                }
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("window.open failed: {:?}", e);
                false
            }
        }
    }

    pub fn navigate(url: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                tracing::warn!("Navigation to {} failed: {:?}", url, e);
            }
        }
    }

    pub fn is_standalone() -> bool {
        web_sys::window()
            .and_then(|w| w.match_media("(display-mode: standalone)").ok().flatten())
            .map(|query| query.matches())
            .unwrap_or(false)
    }

    pub fn load_item(key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    pub fn store_item(key: &str, value: &str) -> Result<(), HostError> {
        local_storage()
            .ok_or(HostError::StorageUnavailable)?
            .set_item(key, value)
            .map_err(|e| rejected("storage write", e))
    }

    pub fn set_data_theme(value: Option<&str>) {
        let Some(root) = document().and_then(|d| d.document_element()) else {
            return;
        };
        let result = match value {
            Some(value) => root.set_attribute("data-theme", value),
            None => root.remove_attribute("data-theme"),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to apply theme attribute: {:?}", e);
        }
    }

    /// Resolve after `delay` via `setTimeout`
    pub async fn sleep(delay: Duration) {
        let ms = delay.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
            }
        });
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod browser {
    use super::*;

    pub fn is_fullscreen() -> bool {
        false
    }

    pub fn request_fullscreen(_container_id: &str) -> Result<(), HostError> {
        Err(HostError::Unsupported("fullscreen"))
    }

    pub fn exit_fullscreen() -> Result<(), HostError> {
        Err(HostError::Unsupported("fullscreen"))
    }

    pub fn open_in_new_tab(_url: &str) -> bool {
        false
    }

    pub fn navigate(url: &str) {
        tracing::debug!("Navigation to {} ignored outside the browser", url);
    }

    pub fn is_standalone() -> bool {
        false
    }

    pub fn load_item(_key: &str) -> Option<String> {
        None
    }

    pub fn store_item(_key: &str, _value: &str) -> Result<(), HostError> {
        Err(HostError::StorageUnavailable)
    }

    pub fn set_data_theme(_value: Option<&str>) {}

    /// No timer outside the browser: never resolves
    pub async fn sleep(_delay: Duration) {
        futures::future::pending::<()>().await
    }
}
