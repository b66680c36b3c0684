//! Theme context with localStorage persistence.
//!
//! Wraps the `ThemeSwitcher` in a signal; the label and icon render from
//! the page view, the `data-theme` attribute is set by the host.

use dioxus::prelude::*;

use super::host::PageHost;
use crate::theme::{Theme, ThemeSwitcher};

/// Global theme state shared via context
#[derive(Clone, Copy)]
pub struct ThemeContext {
    host: PageHost,
    pub switcher: Signal<ThemeSwitcher>,
}

impl ThemeContext {
    /// Get current theme
    pub fn get(&self) -> Theme {
        self.host.view.read().theme
    }

    /// Advance to the next theme, apply and persist it
    pub fn toggle(&self) {
        let mut host = self.host;
        let mut switcher = self.switcher;
        switcher.write().toggle(&mut host);
    }
}

/// Initialize theme context provider - call once at app root
pub fn use_theme_provider(host: PageHost) -> ThemeContext {
    let mut switcher = use_signal(ThemeSwitcher::default);
    let ctx = use_context_provider(|| ThemeContext { host, switcher });

    // Client-side: restore the saved theme and apply it
    use_effect(move || {
        let mut host = host;
        switcher.set(ThemeSwitcher::restore(&mut host));
    });

    ctx
}

/// Get theme context - use in any component
pub fn use_theme() -> ThemeContext {
    use_context::<ThemeContext>()
}
