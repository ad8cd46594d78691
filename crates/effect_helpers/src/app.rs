#![allow(
    clippy::allow_attributes,
    reason = "allow attributes are needed for wasm"
)]

use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{WgpuSettings, WgpuSettingsPriority};
use bevy::window::{WindowMode, WindowResolution};

use crate::HostMessageHandler;
#[cfg(target_arch = "wasm32")]
use crate::HostCommunicationPlugin;
#[cfg(target_arch = "wasm32")]
use crate::window_resizing::fit_window_to_browser;

/// CSS selector of the canvas the effects mount into. The host page is
/// expected to place exactly one matching element; when it is absent the
/// wasm entry skips initialization entirely (the effects are decorative).
pub const EFFECT_CANVAS_SELECTOR: &str = "#site-effect";

// Fallback logical size for native dev runs; in the browser the window is
// resized to the viewport every frame.
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 800.0;

// Creates a Bevy app with default settings shared by all site effects.
// This prevents duplication / errors across different effects.
#[allow(clippy::extra_unused_type_parameters)]
pub fn get_default_app<T: HostMessageHandler>(effect_name: &str, effect_version: &str) -> App {
    let mut app = App::new();

    let resolution = WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT);

    let window_plugin = WindowPlugin {
        primary_window: Some(Window {
            title: format!("{effect_name} {effect_version}"),
            present_mode: bevy::window::PresentMode::Fifo,
            resolution,
            canvas: Some(EFFECT_CANVAS_SELECTOR.into()),
            fit_canvas_to_parent: true,
            mode: WindowMode::Windowed,
            // The effects overlay page content, so the surface must composite
            // over whatever the page renders underneath.
            transparent: true,
            // Tells wasm not to override default event handling, like F5, Ctrl+R etc.
            prevent_default_event_handling: false,
            ..default()
        }),
        ..default()
    };

    let render_plugin = RenderPlugin {
        render_creation: bevy::render::settings::RenderCreation::Automatic(WgpuSettings {
            backends: Some(
                bevy::render::settings::Backends::BROWSER_WEBGPU
                    | bevy::render::settings::Backends::GL,
            ),
            power_preference: bevy::render::settings::PowerPreference::HighPerformance,
            priority: WgpuSettingsPriority::Functionality,
            ..Default::default()
        }),
        ..Default::default()
    };

    app.add_plugins(DefaultPlugins.set(window_plugin).set(render_plugin));

    // This plugin is useful to preserve battery life on mobile.
    // https://github.com/aevyrie/bevy_framepace
    app.add_plugins(bevy_framepace::FramepacePlugin);

    // Fully transparent clear color so only the painted cells are visible.
    app.insert_resource(ClearColor(Color::NONE));

    #[cfg(target_arch = "wasm32")]
    {
        app.add_plugins(HostCommunicationPlugin::<T>::default());
        app.add_systems(PreUpdate, fit_window_to_browser);
    }

    app
}

/// Reads a string parameter supplied by the host: a query-string entry in the
/// browser, an upper-snake-case environment variable in native dev runs.
#[cfg(target_arch = "wasm32")]
pub fn host_param(name: &str) -> Option<String> {
    let window = web_sys::window()?;
    let search = window.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get(name)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn host_param(name: &str) -> Option<String> {
    std::env::var(name.to_uppercase()).ok()
}
