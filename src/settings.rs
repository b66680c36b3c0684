//! Launcher settings shared by the page and the exporter.
//!
//! The page uses the compiled defaults; the exporter can override them via
//! the config loader and bakes them into the generated shell files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// External destination embedded in the frame and used for the standalone redirect
pub const PLAY_URL: &str = "https://slowroads.io";

/// How long the frame gets to report `load` before the fallback kicks in
pub const WATCHDOG_DELAY_MS: u64 = 3500;

/// Delay before redirecting when launched as an installed app
pub const STANDALONE_REDIRECT_DELAY_MS: u64 = 2000;

/// Service worker script, relative to the page
pub const SERVICE_WORKER_PATH: &str = "./slow-roads-sw.js";

/// Page-side launcher settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    pub play_url: String,
    pub frame_title: String,
    pub watchdog_delay_ms: u64,
    pub redirect_delay_ms: u64,
    pub service_worker_path: String,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            play_url: PLAY_URL.to_string(),
            frame_title: "Slow Roads".to_string(),
            watchdog_delay_ms: WATCHDOG_DELAY_MS,
            redirect_delay_ms: STANDALONE_REDIRECT_DELAY_MS,
            service_worker_path: SERVICE_WORKER_PATH.to_string(),
        }
    }
}

impl LauncherSettings {
    pub fn watchdog_delay(&self) -> Duration {
        Duration::from_millis(self.watchdog_delay_ms)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}
