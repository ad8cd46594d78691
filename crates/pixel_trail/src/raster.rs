use bevy::prelude::*;
use effect_helpers::theme::CurrentTheme;

use crate::engine::{CELL_SIZE, TRAIL_LENGTH, TrailEngine};
use crate::TrailSet;

// Trail cells fill at 80% of the computed alpha, matching the glow halo
// drawn underneath the first few entries.
const FILL_ALPHA: f32 = 0.8;
const AMBIENT_MAX_ALPHA: f32 = 0.5;
/// Leading trail entries that get a halo behind them.
const HALO_COUNT: usize = 3;
const HALO_SIZE: f32 = CELL_SIZE * 2.0;
const HALO_ALPHA: f32 = 0.35;

/// Clear-and-redraw rendering: every frame the previous sprites are dropped
/// and the engine state is painted from scratch.
pub struct RasterTrailPlugin;

impl Plugin for RasterTrailPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, draw_frame.in_set(TrailSet::Render));
    }
}

#[derive(Component)]
struct FramePixel;

fn draw_frame(
    mut commands: Commands,
    engine: Res<TrailEngine>,
    theme: Res<CurrentTheme>,
    window_query: Query<&Window>,
    previous: Query<Entity, With<FramePixel>>,
) {
    for entity in &previous {
        commands.entity(entity).despawn();
    }

    let window = window_query.single();
    let (width, height) = (window.width(), window.height());
    let color = theme.0.glow_color();

    // Ambient pulses sit under the trail and shrink as they burn out.
    for cell in engine.ambient() {
        let (col, row) = engine.cell_col_row(cell.index());
        let fraction = cell.life_fraction();
        commands.spawn((
            FramePixel,
            Sprite {
                color: color.with_alpha(fraction * AMBIENT_MAX_ALPHA),
                custom_size: Some(Vec2::splat((CELL_SIZE - 1.0) * fraction)),
                ..default()
            },
            Transform::from_translation(
                crate::cell_world_position(col, row, width, height).extend(0.0),
            ),
        ));
    }

    for (position, &index) in engine.trail().iter().enumerate() {
        let (col, row) = engine.cell_col_row(index);
        let center = crate::cell_world_position(col, row, width, height);
        let alpha = 1.0 - position as f32 / TRAIL_LENGTH as f32;

        if position < HALO_COUNT {
            commands.spawn((
                FramePixel,
                Sprite {
                    color: color.with_alpha(alpha * HALO_ALPHA),
                    custom_size: Some(Vec2::splat(HALO_SIZE)),
                    ..default()
                },
                Transform::from_translation(center.extend(0.5)),
            ));
        }

        commands.spawn((
            FramePixel,
            Sprite {
                color: color.with_alpha(alpha * FILL_ALPHA),
                custom_size: Some(Vec2::splat(CELL_SIZE - 1.0)),
                ..default()
            },
            Transform::from_translation(center.extend(1.0)),
        ));
    }
}
