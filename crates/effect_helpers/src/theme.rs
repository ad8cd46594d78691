use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Storage key the host page and the effects agree on.
pub const THEME_KEY: &str = "theme";

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Accent used for trail cells and card glows, per theme.
    pub const fn glow_color(self) -> Color {
        match self {
            // rgb(59, 130, 246), the site's accent blue
            Self::Dark => Color::srgb(0.231, 0.510, 0.965),
            // a darker blue so the glow stays visible on a light page
            Self::Light => Color::srgb(0.145, 0.388, 0.922),
        }
    }

    /// Muted panel color for card backdrops.
    pub const fn panel_color(self) -> Color {
        match self {
            Self::Dark => Color::srgba(1.0, 1.0, 1.0, 0.06),
            Self::Light => Color::srgba(0.0, 0.0, 0.0, 0.05),
        }
    }
}

#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("preference storage is unavailable")]
    Unavailable,
    #[error("could not write preference `{0}`")]
    Write(String),
}

#[cfg(target_arch = "wasm32")]
fn read_preference(key: &str) -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok()??;
    storage.get_item(key).ok()?
}

#[cfg(target_arch = "wasm32")]
fn write_preference(key: &str, value: &str) -> Result<(), PreferenceError> {
    let storage = web_sys::window()
        .and_then(|window| window.local_storage().ok())
        .flatten()
        .ok_or(PreferenceError::Unavailable)?;
    storage
        .set_item(key, value)
        .map_err(|_| PreferenceError::Write(key.to_string()))
}

// Native dev runs have no browser storage; an in-memory map keeps the
// save/load paths exercised.
#[cfg(not(target_arch = "wasm32"))]
static MEMORY_STORE: std::sync::LazyLock<parking_lot::Mutex<std::collections::HashMap<String, String>>> =
    std::sync::LazyLock::new(|| parking_lot::Mutex::new(std::collections::HashMap::new()));

#[cfg(not(target_arch = "wasm32"))]
fn read_preference(key: &str) -> Option<String> {
    MEMORY_STORE.lock().get(key).cloned()
}

#[cfg(not(target_arch = "wasm32"))]
fn write_preference(key: &str, value: &str) -> Result<(), PreferenceError> {
    MEMORY_STORE.lock().insert(key.to_string(), value.to_string());
    Ok(())
}

pub fn load_theme() -> Option<Theme> {
    read_preference(THEME_KEY)?.parse().ok()
}

pub fn save_theme(theme: Theme) -> Result<(), PreferenceError> {
    write_preference(THEME_KEY, &theme.to_string())
}

/// Whether the OS-level color scheme preference is dark.
#[cfg(target_arch = "wasm32")]
pub fn system_prefers_dark() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok())
        .flatten()
        .is_some_and(|query| query.matches())
}

#[cfg(not(target_arch = "wasm32"))]
pub const fn system_prefers_dark() -> bool {
    false
}

/// A saved preference wins; otherwise the system preference decides.
pub fn initial_theme() -> Theme {
    load_theme().unwrap_or_else(|| {
        if system_prefers_dark() {
            Theme::Dark
        } else {
            Theme::Light
        }
    })
}

#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrentTheme(pub Theme);

pub struct ThemePlugin;

impl Plugin for ThemePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(CurrentTheme(initial_theme()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggled_flips_between_light_and_dark() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark, "light toggles to dark");
        assert_eq!(Theme::Dark.toggled(), Theme::Light, "dark toggles to light");
    }

    #[test]
    fn themes_parse_from_their_stored_strings() {
        assert_eq!("light".parse(), Ok(Theme::Light), "light parses");
        assert_eq!("dark".parse(), Ok(Theme::Dark), "dark parses");
        assert!("solarized".parse::<Theme>().is_err(), "unknown value is rejected");
        assert_eq!(Theme::Light.to_string(), "light", "display matches stored form");
    }

    #[test]
    fn initial_theme_prefers_saved_value_over_system_default() {
        // No saved value: native hosts report no dark preference, so the
        // original page logic falls back to light.
        assert_eq!(initial_theme(), Theme::Light, "unsaved default is light");

        save_theme(Theme::Dark).expect("in-memory store accepts writes");
        assert_eq!(load_theme(), Some(Theme::Dark), "stored theme reads back");
        assert_eq!(initial_theme(), Theme::Dark, "saved preference wins");
    }
}
