use bevy::prelude::*;

/// Current pointer position in window (viewport) coordinates: the mouse
/// cursor when it is over the window, otherwise the first active touch.
pub fn pointer_screen_position(
    windows: &Query<&Window>,
    touch_input: &Res<Touches>,
) -> Option<Vec2> {
    if let Some(cursor_position) = windows.single().cursor_position() {
        Some(cursor_position)
    } else {
        touch_input.iter().next().map(bevy::input::touch::Touch::position)
    }
}

pub fn pointer_world_position(
    windows: &Query<&Window>,
    touch_input: &Res<Touches>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let position = pointer_screen_position(windows, touch_input)?;

    let (camera, camera_transform) = camera.single();

    camera
        .viewport_to_world(camera_transform, position)
        .map(|ray| ray.origin.truncate())
        .ok()
}

/// Whether the host is touch-capable. In the browser this probes
/// `navigator.maxTouchPoints`; native builds report false and rely on the
/// first real touch event to flip the flag.
#[cfg(target_arch = "wasm32")]
pub fn host_touch_capable() -> bool {
    web_sys::window().is_some_and(|window| window.navigator().max_touch_points() > 0)
}

#[cfg(not(target_arch = "wasm32"))]
pub const fn host_touch_capable() -> bool {
    false
}
