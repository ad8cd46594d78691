#[cfg(target_arch = "wasm32")]
pub fn browser_viewport_size() -> Option<bevy::math::Vec2> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(bevy::math::Vec2::new(width as f32, height as f32))
}

#[cfg(target_arch = "wasm32")]
pub fn fit_window_to_browser(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some(viewport) = browser_viewport_size() else {
        return;
    };

    // Some mobile GPUs reject surfaces above this extent, so the window is
    // clamped rather than matched one-to-one with oversized viewports.
    const MAX_WIDTH: f32 = 2048.0;
    const MAX_HEIGHT: f32 = 2048.0;

    for mut window in &mut primary_query {
        if (window.resolution.width() - viewport.x).abs() > f32::EPSILON
            || (window.resolution.height() - viewport.y).abs() > f32::EPSILON
        {
            window
                .resolution
                .set(viewport.x.min(MAX_WIDTH), viewport.y.min(MAX_HEIGHT));
        }
    }
}
