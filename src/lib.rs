//! Slow Roads launcher
//!
//! Launcher page for the Slow Roads driving game, built with Dioxus.
//!
//! This library provides:
//! - Embedding the game with a watchdog fallback to a new tab
//! - Theme cycling with persisted selection
//! - A custom PWA install prompt
//! - The offline shell service worker (compiled to wasm for the browser)
//! - A native exporter that writes and preflights the static shell files

/// Release version stamped by `build.rs`
pub const VERSION: &str = env!("SRL_VERSION");

/// Short commit the build came from, or `unknown`
pub const GIT_SHA: &str = env!("SRL_GIT_SHA");

pub mod app;
pub mod embed;
pub mod host;
pub mod install;
pub mod settings;
pub mod shell;
pub mod theme;
pub mod watchdog;

#[cfg(feature = "export")]
pub mod config;
#[cfg(feature = "export")]
pub mod export;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_stamp_is_a_single_token() {
        for stamp in [VERSION, GIT_SHA] {
            assert!(!stamp.is_empty());
            assert!(!stamp.contains(char::is_whitespace), "{:?}", stamp);
        }
        assert!(GIT_SHA == "unknown" || GIT_SHA.len() <= 40, "{}", GIT_SHA);
    }
}
