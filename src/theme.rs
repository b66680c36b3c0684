//! Theme cycling with persisted selection.
//!
//! Three fixed themes, cycled by the toggle button. The selected index is
//! stored under `themeIndex` as a decimal string.

use tracing::{debug, warn};

use crate::host::HostSurface;

/// Storage key for the selected theme index
pub const THEME_STORAGE_KEY: &str = "themeIndex";

/// Theme options, in toggle order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Sunset,
    Light,
}

/// Toggle order
pub const THEMES: [Theme; 3] = [Theme::Dark, Theme::Sunset, Theme::Light];

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Sunset => "sunset",
            Theme::Light => "light",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Sunset => "Sunset",
            Theme::Light => "Light",
        }
    }

    /// Value for the root `data-theme` attribute (none for the default dark theme)
    pub fn data_theme(&self) -> Option<&'static str> {
        match self {
            Theme::Dark => None,
            other => Some(other.as_str()),
        }
    }

    /// SVG path drawn inside the toggle button
    pub fn icon_path(&self) -> &'static str {
        match self {
            Theme::Dark => "M12 3c-4.97 0-9 4.03-9 9s4.03 9 9 9 9-4.03 9-9c0-.46-.04-.92-.1-1.36-.98 1.37-2.58 2.26-4.4 2.26-2.98 0-5.4-2.42-5.4-5.4 0-1.81.89-3.42 2.26-4.4-.44-.06-.9-.1-1.36-.1z",
            Theme::Sunset | Theme::Light => "M12 2.25c-5.385 0-9.75 4.365-9.75 9.75s4.365 9.75 9.75 9.75 9.75-4.365 9.75-9.75S17.385 2.25 12 2.25zM12 18c-3.314 0-6-2.686-6-6s2.686-6 6-6 6 2.686 6 6-2.686 6-6 6z",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Theme::Dark => 0,
            Theme::Sunset => 1,
            Theme::Light => 2,
        }
    }

    /// Theme at `index`; anything out of range falls back to dark
    pub fn from_index(index: usize) -> Self {
        THEMES.get(index).copied().unwrap_or_default()
    }

    /// Parse a persisted index. Missing, malformed or out-of-range values
    /// resolve to index 0.
    pub fn parse_index(value: Option<&str>) -> usize {
        value
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|i| *i < THEMES.len())
            .unwrap_or(0)
    }
}

/// Current theme selection, restored from and persisted to host storage
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ThemeSwitcher {
    index: usize,
}

impl ThemeSwitcher {
    /// Load the saved selection and apply it
    pub fn restore(host: &mut impl HostSurface) -> Self {
        let saved = host.load_item(THEME_STORAGE_KEY);
        let index = Theme::parse_index(saved.as_deref());
        debug!("Restoring theme index {} (saved: {:?})", index, saved);
        host.apply_theme(Theme::from_index(index));
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Theme {
        Theme::from_index(self.index)
    }

    /// Advance to the next theme, apply it and persist the index
    pub fn toggle(&mut self, host: &mut impl HostSurface) -> Theme {
        self.index = (self.index + 1) % THEMES.len();
        let theme = self.current();
        host.apply_theme(theme);
        if let Err(e) = host.store_item(THEME_STORAGE_KEY, &self.index.to_string()) {
            warn!("Failed to persist theme {}: {}", theme.as_str(), e);
        }
        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::FakeHost;

    #[test]
    fn parse_index_defaults_to_dark() {
        assert_eq!(Theme::parse_index(None), 0);
        assert_eq!(Theme::parse_index(Some("")), 0);
        assert_eq!(Theme::parse_index(Some("abc")), 0);
        assert_eq!(Theme::parse_index(Some("7")), 0);
        assert_eq!(Theme::parse_index(Some("-1")), 0);
        assert_eq!(Theme::parse_index(Some(" 2 ")), 2);
    }

    #[test]
    fn dark_has_no_data_theme_attribute() {
        assert_eq!(Theme::Dark.data_theme(), None);
        assert_eq!(Theme::Sunset.data_theme(), Some("sunset"));
        assert_eq!(Theme::Light.data_theme(), Some("light"));
    }

    #[test]
    fn toggle_cycles_and_persists() {
        let mut host = FakeHost::default();
        let mut switcher = ThemeSwitcher::restore(&mut host);
        assert_eq!(switcher.index(), 0);
        assert_eq!(host.theme, Some(Theme::Dark));

        let mut seen = Vec::new();
        for _ in 0..4 {
            let theme = switcher.toggle(&mut host);
            seen.push(theme.index());
            assert_eq!(host.theme, Some(theme));
            assert_eq!(
                host.storage.get(THEME_STORAGE_KEY),
                Some(&theme.index().to_string())
            );
        }
        assert_eq!(seen, vec![1, 2, 0, 1]);
    }

    #[test]
    fn restore_applies_saved_theme() {
        let mut host = FakeHost::default();
        host.storage
            .insert(THEME_STORAGE_KEY.to_string(), "2".to_string());

        let switcher = ThemeSwitcher::restore(&mut host);
        assert_eq!(switcher.current(), Theme::Light);
        assert_eq!(host.theme, Some(Theme::Light));
    }
}
