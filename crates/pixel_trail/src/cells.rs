use bevy::prelude::*;
use effect_helpers::theme::CurrentTheme;

use crate::engine::{CELL_SIZE, TrailEngine};
use crate::{GridRebuilt, TrailSet};

// Discrete intensity tiers by trail position: head, 1-2, 3-4, 5-6, 7+.
const BUCKET_ALPHAS: [f32; 5] = [1.0, 0.8, 0.6, 0.4, 0.2];
const BUCKET_SCALES: [f32; 5] = [1.0, 0.95, 0.85, 0.7, 0.55];
const AMBIENT_ALPHA: f32 = 0.35;
const AMBIENT_SCALE: f32 = 0.8;

/// Visual assignment of one pooled cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
enum CellVisual {
    #[default]
    Clear,
    Ambient,
    Bucket(usize),
}

/// Fixed-pool rendering: one sprite per grid cell, created once per grid
/// configuration, with only changed assignments touched on an update.
pub struct CellPoolTrailPlugin;

impl Plugin for CellPoolTrailPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CellPool>().add_systems(
            Update,
            (rebuild_pool, apply_assignments).chain().in_set(TrailSet::Render),
        );
    }
}

#[derive(Resource, Default)]
struct CellPool {
    entities: Vec<Entity>,
    visuals: Vec<CellVisual>,
    last_revision: Option<u64>,
}

/// Maps a trail position to its intensity bucket, strongest first.
const fn bucket_for(position: usize) -> usize {
    match position {
        0 => 0,
        1..=2 => 1,
        3..=4 => 2,
        5..=6 => 3,
        _ => 4,
    }
}

fn rebuild_pool(
    mut commands: Commands,
    mut pool: ResMut<CellPool>,
    engine: Res<TrailEngine>,
    window_query: Query<&Window>,
    mut rebuilt: EventReader<GridRebuilt>,
) {
    if rebuilt.is_empty() {
        return;
    }
    rebuilt.clear();

    // Stale pool entities reference a dead grid; drop them all.
    for entity in pool.entities.drain(..) {
        commands.entity(entity).despawn();
    }
    pool.visuals.clear();
    pool.last_revision = None;

    let window = window_query.single();
    let (width, height) = (window.width(), window.height());

    for index in 0..engine.cell_count() {
        let (col, row) = engine.cell_col_row(index);
        let entity = commands
            .spawn((
                Sprite {
                    color: Color::NONE,
                    custom_size: Some(Vec2::splat(CELL_SIZE - 1.0)),
                    ..default()
                },
                Transform::from_translation(
                    crate::cell_world_position(col, row, width, height).extend(0.0),
                ),
            ))
            .id();
        pool.entities.push(entity);
    }
    pool.visuals = vec![CellVisual::Clear; engine.cell_count()];
}

/// Computes the full per-cell assignment for the engine's current state.
/// Trail membership overrides an ambient pulse on the same cell.
fn desired_assignments(engine: &TrailEngine, cell_count: usize) -> Vec<CellVisual> {
    let mut desired = vec![CellVisual::Clear; cell_count];
    for cell in engine.ambient() {
        if let Some(slot) = desired.get_mut(cell.index()) {
            *slot = CellVisual::Ambient;
        }
    }
    for (position, &index) in engine.trail().iter().enumerate() {
        if let Some(slot) = desired.get_mut(index) {
            *slot = CellVisual::Bucket(bucket_for(position));
        }
    }
    desired
}

fn apply_assignments(
    mut pool: ResMut<CellPool>,
    engine: Res<TrailEngine>,
    theme: Res<CurrentTheme>,
    mut sprites: Query<(&mut Sprite, &mut Transform)>,
) {
    // Re-rendering unchanged state must not touch anything; a theme change
    // invalidates every painted cell instead.
    if pool.last_revision == Some(engine.revision()) && !theme.is_changed() {
        return;
    }
    pool.last_revision = Some(engine.revision());
    let repaint_all = theme.is_changed();

    let desired = desired_assignments(&engine, pool.visuals.len());

    let color = theme.0.glow_color();
    for (index, want) in desired.iter().enumerate() {
        let Some(current) = pool.visuals.get(index) else {
            continue;
        };
        if current == want && !repaint_all {
            continue;
        }
        let Some(&entity) = pool.entities.get(index) else {
            continue;
        };
        let Ok((mut sprite, mut transform)) = sprites.get_mut(entity) else {
            continue;
        };
        match *want {
            CellVisual::Clear => {
                sprite.color = Color::NONE;
                transform.scale = Vec3::ONE;
            }
            CellVisual::Ambient => {
                sprite.color = color.with_alpha(AMBIENT_ALPHA);
                transform.scale = Vec3::new(AMBIENT_SCALE, AMBIENT_SCALE, 1.0);
            }
            CellVisual::Bucket(bucket) => {
                let alpha = BUCKET_ALPHAS.get(bucket).copied().unwrap_or(0.0);
                let scale = BUCKET_SCALES.get(bucket).copied().unwrap_or(1.0);
                sprite.color = color.with_alpha(alpha);
                transform.scale = Vec3::new(scale, scale, 1.0);
            }
        }
    }
    pool.visuals = desired;
}
