use core::str::FromStr;

use bevy::prelude::*;
use bevy::utils::Duration;
use bevy::window::{CursorLeft, CursorMoved, WindowResized};
use effect_helpers::theme::ThemePlugin;
use strum::{Display, EnumString};

mod cells;
mod engine;
mod host;
mod raster;

pub use engine::{AmbientCell, CELL_SIZE, TRAIL_LENGTH, TrailEngine};
use host::PixelTrail;

/// Minimum interval between trail updates from pointer-move events; events
/// arriving faster than this are dropped to bound redraw cost.
const MOVE_THROTTLE: Duration = Duration::from_millis(16);

/// How the trail is painted: respawned sprites every frame, or a fixed pool
/// of one sprite per grid cell with discrete intensity buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Raster,
    CellPool,
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TrailSet {
    Input,
    Tick,
    Render,
}

#[derive(Resource)]
struct MoveThrottle(Timer);

/// Sent whenever the grid dimensions changed and cell pools must be rebuilt.
#[derive(Event)]
struct GridRebuilt;

pub fn run() {
    run_with_mode(requested_render_mode());
}

pub fn run_with_mode(mode: RenderMode) {
    let mut app = effect_helpers::get_default_app::<PixelTrail>(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );
    app.add_plugins(ThemePlugin)
        .add_event::<GridRebuilt>()
        .insert_resource(TrailEngine::new(
            effect_helpers::WINDOW_WIDTH,
            effect_helpers::WINDOW_HEIGHT,
        ))
        .insert_resource(MoveThrottle(Timer::new(MOVE_THROTTLE, TimerMode::Repeating)))
        .configure_sets(
            Update,
            (TrailSet::Input, TrailSet::Tick, TrailSet::Render).chain(),
        )
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                handle_resize,
                handle_pointer_moves,
                handle_pointer_left,
                handle_touch_lifecycle,
            )
                .in_set(TrailSet::Input),
        )
        .add_systems(Update, tick_engine.in_set(TrailSet::Tick));

    match mode {
        RenderMode::Raster => app.add_plugins(raster::RasterTrailPlugin),
        RenderMode::CellPool => app.add_plugins(cells::CellPoolTrailPlugin),
    };

    app.run();
}

/// The host page picks the render mode via `?trail_mode=`; native dev runs
/// use the `TRAIL_MODE` environment variable. Unknown values fall back to
/// raster.
fn requested_render_mode() -> RenderMode {
    effect_helpers::host_param("trail_mode")
        .and_then(|value| RenderMode::from_str(&value).ok())
        .unwrap_or_default()
}

fn setup(
    mut commands: Commands,
    mut engine: ResMut<TrailEngine>,
    window_query: Query<&Window>,
    mut rebuilt: EventWriter<GridRebuilt>,
) {
    commands.spawn(Camera2d);
    let window = window_query.single();
    engine.configure(window.width(), window.height());
    engine.set_touch_capable(effect_helpers::input::host_touch_capable());
    rebuilt.send(GridRebuilt);
}

fn handle_resize(
    mut engine: ResMut<TrailEngine>,
    mut resize_events: EventReader<WindowResized>,
    mut rebuilt: EventWriter<GridRebuilt>,
) {
    let Some(event) = resize_events.read().last() else {
        return;
    };
    engine.configure(event.width, event.height);
    rebuilt.send(GridRebuilt);
}

fn handle_pointer_moves(
    time: Res<Time>,
    mut throttle: ResMut<MoveThrottle>,
    mut engine: ResMut<TrailEngine>,
    mut cursor_moves: EventReader<CursorMoved>,
    touch_input: Res<Touches>,
) {
    throttle.0.tick(time.delta());

    let position = cursor_moves
        .read()
        .last()
        .map(|event| event.position)
        .or_else(|| {
            touch_input
                .iter()
                .next()
                .map(bevy::input::touch::Touch::position)
        });

    let Some(position) = position else {
        return;
    };
    // Positions inside the throttle window are dropped, not deferred.
    if !throttle.0.finished() {
        return;
    }
    engine.update(position.x, position.y);
}

fn handle_pointer_left(
    mut engine: ResMut<TrailEngine>,
    mut cursor_left: EventReader<CursorLeft>,
) {
    if !cursor_left.is_empty() {
        cursor_left.clear();
        engine.begin_fade();
    }
}

fn handle_touch_lifecycle(mut engine: ResMut<TrailEngine>, touch_input: Res<Touches>) {
    if touch_input.any_just_pressed() {
        // A real touch is better evidence than the startup probe.
        engine.set_touch_capable(true);
        engine.set_interacting(true);
        if let Some(touch) = touch_input.iter_just_pressed().next() {
            let position = touch.position();
            engine.update(position.x, position.y);
        }
    }

    let released = touch_input.any_just_released() || touch_input.any_just_canceled();
    if released && touch_input.iter().next().is_none() {
        engine.set_interacting(false);
        engine.begin_fade();
    }
}

fn tick_engine(time: Res<Time>, mut engine: ResMut<TrailEngine>) {
    engine.tick(time.delta());
}

/// World-space center of a cell, converting from viewport coordinates
/// (top-left origin, y down) to Bevy's centered, y-up space.
pub(crate) fn cell_world_position(col: usize, row: usize, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        (col as f32).mul_add(CELL_SIZE, CELL_SIZE * 0.5 - width * 0.5),
        (row as f32).mul_add(-CELL_SIZE, height * 0.5 - CELL_SIZE * 0.5),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_world_position_centers_the_grid() {
        // 120x120 window: cell (0,0) sits at the top-left, half a cell in.
        let top_left = cell_world_position(0, 0, 120.0, 120.0);
        assert_eq!(top_left, Vec2::new(-54.0, 54.0), "top-left cell center");

        let below = cell_world_position(0, 1, 120.0, 120.0);
        assert_eq!(below, Vec2::new(-54.0, 42.0), "next row is one cell lower");

        let right = cell_world_position(1, 0, 120.0, 120.0);
        assert_eq!(right, Vec2::new(-42.0, 54.0), "next column is one cell right");
    }
}
