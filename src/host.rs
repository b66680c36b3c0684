//! Host surface - everything the page logic needs from the browser.
//!
//! The embed controller, theme switcher and install manager never touch
//! `web-sys` directly. They drive a `HostSurface`, which the web app backs
//! with Dioxus signals plus browser calls, and which tests back with a fake.

use thiserror::Error;

use crate::theme::Theme;

/// Page elements the launcher logic toggles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    /// Game container that hosts the frame and goes fullscreen
    Container,
    /// Static preview image shown before the embed starts
    Preview,
    /// Loading skeleton
    Skeleton,
    /// Fallback overlay with the "open in new tab" affordance
    Overlay,
    /// Fullscreen toggle button
    FullscreenButton,
}

/// Identity of one iframe instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum HostError {
    #[error("{0} is not available outside the browser")]
    Unsupported(&'static str),

    #[error("{action} rejected: {reason}")]
    Rejected {
        action: &'static str,
        reason: String,
    },

    #[error("storage unavailable")]
    StorageUnavailable,
}

/// Capability set the page logic runs against.
pub trait HostSurface {
    /// Whether the element exists on this page
    fn has(&self, slot: Slot) -> bool;

    fn set_visible(&mut self, slot: Slot, visible: bool);

    /// The game frame currently in the document, if any
    fn frame(&self) -> Option<FrameId>;

    /// Create a new frame inside the container
    fn create_frame(&mut self) -> FrameId;

    fn navigate_frame(&mut self, frame: FrameId, url: &str);

    fn remove_frame(&mut self, frame: FrameId);

    /// Enable the fullscreen button (disabled until the game loads)
    fn enable_fullscreen_control(&mut self);

    fn is_fullscreen(&self) -> bool;

    /// Request fullscreen on the game container
    fn request_fullscreen(&mut self) -> Result<(), HostError>;

    fn exit_fullscreen(&mut self) -> Result<(), HostError>;

    /// Open `url` in a new browsing context. False when no window handle
    /// came back (popup blocker).
    fn open_in_new_tab(&mut self, url: &str) -> bool;

    /// Show a user-visible notice
    fn notify(&mut self, message: &str);

    /// Navigate the page itself
    fn navigate(&mut self, url: &str);

    /// Whether the page runs in installed (standalone) display mode
    fn is_standalone(&self) -> bool;

    fn load_item(&self, key: &str) -> Option<String>;

    fn store_item(&mut self, key: &str, value: &str) -> Result<(), HostError>;

    fn apply_theme(&mut self, theme: Theme);
}

/// In-memory host for unit tests
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::{BTreeSet, HashMap};

    use super::*;

    #[derive(Default)]
    pub struct FakeHost {
        pub missing: BTreeSet<Slot>,
        pub visible: HashMap<Slot, bool>,
        pub frame: Option<FrameId>,
        pub frame_url: Option<String>,
        pub frame_navigations: u32,
        pub frames_created: u64,
        pub fullscreen: bool,
        pub fullscreen_enabled: bool,
        pub fullscreen_fails: bool,
        pub popups_blocked: bool,
        pub opened: Vec<String>,
        pub notices: Vec<String>,
        pub navigations: Vec<String>,
        pub standalone: bool,
        pub storage: HashMap<String, String>,
        pub theme: Option<Theme>,
    }

    impl FakeHost {
        pub fn without(mut self, slot: Slot) -> Self {
            self.missing.insert(slot);
            self
        }

        pub fn is_visible(&self, slot: Slot) -> bool {
            self.visible.get(&slot).copied().unwrap_or(false)
        }
    }

    impl HostSurface for FakeHost {
        fn has(&self, slot: Slot) -> bool {
            !self.missing.contains(&slot)
        }

        fn set_visible(&mut self, slot: Slot, visible: bool) {
            if self.has(slot) {
                self.visible.insert(slot, visible);
            }
        }

        fn frame(&self) -> Option<FrameId> {
            self.frame
        }

        fn create_frame(&mut self) -> FrameId {
            self.frames_created += 1;
            let id = FrameId(self.frames_created);
            self.frame = Some(id);
            id
        }

        fn navigate_frame(&mut self, frame: FrameId, url: &str) {
            if self.frame == Some(frame) {
                self.frame_url = Some(url.to_string());
                self.frame_navigations += 1;
            }
        }

        fn remove_frame(&mut self, frame: FrameId) {
            if self.frame == Some(frame) {
                self.frame = None;
                self.frame_url = None;
            }
        }

        fn enable_fullscreen_control(&mut self) {
            self.fullscreen_enabled = true;
        }

        fn is_fullscreen(&self) -> bool {
            self.fullscreen
        }

        fn request_fullscreen(&mut self) -> Result<(), HostError> {
            if self.fullscreen_fails {
                return Err(HostError::Rejected {
                    action: "requestFullscreen",
                    reason: "denied".into(),
                });
            }
            self.fullscreen = true;
            Ok(())
        }

        fn exit_fullscreen(&mut self) -> Result<(), HostError> {
            self.fullscreen = false;
            Ok(())
        }

        fn open_in_new_tab(&mut self, url: &str) -> bool {
            if self.popups_blocked {
                return false;
            }
            self.opened.push(url.to_string());
            true
        }

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }

        fn navigate(&mut self, url: &str) {
            self.navigations.push(url.to_string());
        }

        fn is_standalone(&self) -> bool {
            self.standalone
        }

        fn load_item(&self, key: &str) -> Option<String> {
            self.storage.get(key).cloned()
        }

        fn store_item(&mut self, key: &str, value: &str) -> Result<(), HostError> {
            self.storage.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn apply_theme(&mut self, theme: Theme) {
            self.theme = Some(theme);
        }
    }
}
