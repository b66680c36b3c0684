//! Embed controller - preview, loading, embedded or blocked.
//!
//! The destination may refuse to be framed, and the browser gives no error
//! for that. The only signal is the absence of a `load` event, so every
//! embed attempt arms a watchdog; whichever of load/watchdog comes first wins.

use tracing::{debug, info, warn};

use crate::host::{FrameId, HostSurface, Slot};
use crate::settings::LauncherSettings;
use crate::watchdog::{Watchdog, WatchdogId, WatchdogTask};

/// Shown when the new-tab fallback gets no window back
pub const POPUP_BLOCKED_NOTICE: &str =
    "Popup was blocked. Please allow popups or click \"Open in New Tab\".";

/// Visible state of the game frame area
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmbedState {
    #[default]
    Preview,
    Loading,
    Embedded,
    Blocked,
}

/// Result of an embed attempt
#[derive(Debug)]
pub enum EmbedStart {
    /// Frame navigated; run the task against a timer and report back via
    /// `EmbedController::on_watchdog_elapsed`
    Started(WatchdogTask),
    /// No game container on the page
    NoContainer,
}

impl EmbedStart {
    pub fn is_started(&self) -> bool {
        matches!(self, EmbedStart::Started(_))
    }

    pub fn into_watchdog(self) -> Option<WatchdogTask> {
        match self {
            EmbedStart::Started(task) => Some(task),
            EmbedStart::NoContainer => None,
        }
    }
}

/// Direction of a fullscreen toggle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullscreenToggle {
    Entered,
    Exited,
    /// Request failed or no container; nothing changed
    Unchanged,
}

#[derive(Clone, Copy, Debug)]
struct Attempt {
    frame: FrameId,
    loaded: bool,
}

#[derive(Debug)]
pub struct EmbedController {
    settings: LauncherSettings,
    state: EmbedState,
    attempt: Option<Attempt>,
    watchdog: Watchdog,
}

impl EmbedController {
    pub fn new(settings: LauncherSettings) -> Self {
        Self {
            settings,
            state: EmbedState::Preview,
            attempt: None,
            watchdog: Watchdog::new(),
        }
    }

    pub fn state(&self) -> EmbedState {
        self.state
    }

    pub fn play_url(&self) -> &str {
        &self.settings.play_url
    }

    /// Page-load entry: swap the preview for the skeleton and start embedding
    pub fn boot(&mut self, host: &mut impl HostSurface) -> Option<WatchdogTask> {
        host.set_visible(Slot::Preview, false);
        host.set_visible(Slot::Skeleton, true);
        self.play(host)
    }

    /// Manual play trigger
    pub fn play(&mut self, host: &mut impl HostSurface) -> Option<WatchdogTask> {
        let started = self.start_embed(host);
        if !started.is_started() {
            host.set_visible(Slot::Overlay, true);
        }
        started.into_watchdog()
    }

    /// Start (or restart) embedding into the single game frame.
    ///
    /// Reuses the existing frame if there is one. Any watchdog from a
    /// previous attempt is cancelled and a fresh one armed.
    pub fn start_embed(&mut self, host: &mut impl HostSurface) -> EmbedStart {
        if !host.has(Slot::Container) {
            warn!("Game container missing, cannot embed");
            return EmbedStart::NoContainer;
        }

        let frame = match host.frame() {
            Some(frame) => {
                debug!("Reusing {}", frame);
                frame
            }
            None => host.create_frame(),
        };

        self.attempt = Some(Attempt {
            frame,
            loaded: false,
        });
        self.state = EmbedState::Loading;
        host.set_visible(Slot::Skeleton, true);
        host.navigate_frame(frame, &self.settings.play_url);

        let task = self.watchdog.arm(self.settings.watchdog_delay());
        info!(
            "Embedding {} in {} (watchdog {:?})",
            self.settings.play_url,
            frame,
            task.delay()
        );
        EmbedStart::Started(task)
    }

    /// The frame reported `load`. Honoured once per attempt, current frame only.
    pub fn on_frame_loaded(&mut self, host: &mut impl HostSurface, frame: FrameId) -> bool {
        let attempt = match self.attempt.as_mut() {
            Some(attempt) if attempt.frame == frame && !attempt.loaded => attempt,
            _ => {
                debug!("Ignoring load from {}", frame);
                return false;
            }
        };

        attempt.loaded = true;
        self.watchdog.cancel();
        self.state = EmbedState::Embedded;
        host.set_visible(Slot::Skeleton, false);
        if host.has(Slot::FullscreenButton) {
            host.enable_fullscreen_control();
            debug!("Fullscreen button enabled after game load");
        }
        info!("Game loaded in {}", frame);
        true
    }

    /// The watchdog delay elapsed. Acts only for the armed watchdog of an
    /// attempt that has not loaded.
    pub fn on_watchdog_elapsed(&mut self, host: &mut impl HostSurface, id: WatchdogId) -> bool {
        if !self.watchdog.fire(id) {
            return false;
        }
        let attempt = match self.attempt {
            Some(attempt) if !attempt.loaded => attempt,
            _ => return false,
        };

        warn!(
            "{} did not load within {:?}, falling back",
            attempt.frame,
            self.settings.watchdog_delay()
        );
        self.attempt = None;
        host.remove_frame(attempt.frame);
        host.set_visible(Slot::Skeleton, true);
        host.set_visible(Slot::Overlay, true);
        self.state = EmbedState::Blocked;
        true
    }

    /// Enter fullscreen on the container, or leave it. Failures are logged
    /// and otherwise ignored.
    pub fn toggle_fullscreen(&self, host: &mut impl HostSurface) -> FullscreenToggle {
        if !host.has(Slot::Container) {
            debug!("No game container found");
            return FullscreenToggle::Unchanged;
        }

        if host.is_fullscreen() {
            match host.exit_fullscreen() {
                Ok(()) => FullscreenToggle::Exited,
                Err(e) => {
                    warn!("Error exiting fullscreen: {}", e);
                    FullscreenToggle::Unchanged
                }
            }
        } else {
            match host.request_fullscreen() {
                Ok(()) => FullscreenToggle::Entered,
                Err(e) => {
                    warn!("Error entering fullscreen: {}", e);
                    FullscreenToggle::Unchanged
                }
            }
        }
    }

    /// Open the destination outside the frame. Returns false (after showing
    /// a notice) when a popup blocker swallowed the window.
    pub fn open_in_new_tab(&self, host: &mut impl HostSurface) -> bool {
        if host.open_in_new_tab(&self.settings.play_url) {
            true
        } else {
            warn!("Popup blocked opening {}", self.settings.play_url);
            host.notify(POPUP_BLOCKED_NOTICE);
            false
        }
    }
}
