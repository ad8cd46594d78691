use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Messages the host page posts to an embedded effect.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostMessage {
    /// Apply a specific theme (the page's own toggle already resolved it).
    SetTheme(Theme),
    /// Flip the current theme; the effect resolves and persists the result.
    ToggleTheme,
    /// The page saw interaction start or stop outside the effect's canvas
    /// (forms, menus); effects treat it like their own input activity.
    SetInteracting(bool),
    /// Tear down and rebuild the effect's visual state.
    Restart,
}

/// Messages an effect posts back to the host page.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectMessage {
    /// The effect finished starting up and is listening for host messages.
    Ready,
    /// A theme change was applied and written to the preference store.
    ThemeStored(Theme),
}
