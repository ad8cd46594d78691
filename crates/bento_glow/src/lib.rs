use bevy::prelude::*;
use effect_helpers::input::pointer_world_position;
use effect_helpers::theme::{CurrentTheme, ThemePlugin};

mod host;

use host::BentoGlow;

const CARD_COLUMNS: usize = 2;
const CARD_ROWS: usize = 2;
const CARD_SIZE: Vec2 = Vec2::new(300.0, 200.0);
const CARD_GAP: f32 = 24.0;

const GLOW_RADIUS: f32 = 110.0;
const GLOW_ALPHA: f32 = 0.22;
/// Exponential smoothing rate for the glow chasing its target, per second.
const EASE_RATE: f32 = 12.0;

#[derive(Component)]
struct Card {
    half_extent: Vec2,
}

#[derive(Component, Default)]
struct Glow {
    /// Card-local position the glow is easing toward; zero is the card
    /// center, where it rests when the pointer is elsewhere.
    target: Vec2,
}

pub fn run() {
    effect_helpers::get_default_app::<BentoGlow>(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
    .add_plugins(ThemePlugin)
    .add_systems(Startup, setup)
    .add_systems(Update, (track_pointer, ease_glows).chain())
    .add_systems(Update, apply_theme)
    .run();
}

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    theme: Res<CurrentTheme>,
) {
    commands.spawn(Camera2d);

    let glow_mesh = meshes.add(Circle::new(GLOW_RADIUS));
    let step = CARD_SIZE + Vec2::splat(CARD_GAP);
    let origin = Vec2::new(
        -step.x * (CARD_COLUMNS as f32 - 1.0) * 0.5,
        step.y * (CARD_ROWS as f32 - 1.0) * 0.5,
    );

    for row in 0..CARD_ROWS {
        for col in 0..CARD_COLUMNS {
            let center = origin + Vec2::new(col as f32 * step.x, -(row as f32) * step.y);
            commands
                .spawn((
                    Card {
                        half_extent: CARD_SIZE * 0.5,
                    },
                    Sprite {
                        color: theme.0.panel_color(),
                        custom_size: Some(CARD_SIZE),
                        ..default()
                    },
                    Transform::from_translation(center.extend(0.0)),
                ))
                .with_children(|parent| {
                    parent.spawn((
                        Glow::default(),
                        Mesh2d(glow_mesh.clone()),
                        MeshMaterial2d(
                            materials.add(theme.0.glow_color().with_alpha(GLOW_ALPHA)),
                        ),
                        Transform::from_xyz(0.0, 0.0, 1.0),
                    ));
                });
        }
    }
}

/// Whether a card-local point falls inside the card's rectangle.
fn point_in_card(local: Vec2, half_extent: Vec2) -> bool {
    local.x.abs() <= half_extent.x && local.y.abs() <= half_extent.y
}

/// Fraction of the remaining distance covered after `dt` seconds of chasing.
fn ease_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt.max(0.0)).exp()
}

fn track_pointer(
    windows: Query<&Window>,
    touch_input: Res<Touches>,
    camera: Query<(&Camera, &GlobalTransform)>,
    cards: Query<(&GlobalTransform, &Card, &Children)>,
    mut glows: Query<&mut Glow>,
) {
    let pointer = pointer_world_position(&windows, &touch_input, &camera);

    for (card_transform, card, children) in &cards {
        let center = card_transform.translation().truncate();
        // Pointer gone or outside this card: the glow drifts back to center.
        let target = pointer
            .map(|position| position - center)
            .filter(|local| point_in_card(*local, card.half_extent))
            .unwrap_or(Vec2::ZERO);

        for child in children {
            if let Ok(mut glow) = glows.get_mut(*child) {
                glow.target = target;
            }
        }
    }
}

fn ease_glows(time: Res<Time>, mut glows: Query<(&mut Transform, &Glow)>) {
    let factor = ease_factor(EASE_RATE, time.delta_secs());
    for (mut transform, glow) in &mut glows {
        let current = transform.translation.truncate();
        let next = current.lerp(glow.target, factor);
        transform.translation = next.extend(transform.translation.z);
    }
}

fn apply_theme(
    theme: Res<CurrentTheme>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut cards: Query<&mut Sprite, With<Card>>,
    glows: Query<&MeshMaterial2d<ColorMaterial>, With<Glow>>,
) {
    if !theme.is_changed() {
        return;
    }
    for mut sprite in &mut cards {
        sprite.color = theme.0.panel_color();
    }
    for material_handle in &glows {
        if let Some(material) = materials.get_mut(&material_handle.0) {
            material.color = theme.0.glow_color().with_alpha(GLOW_ALPHA);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_hit_test_includes_edges_and_rejects_outside() {
        let half = Vec2::new(150.0, 100.0);
        assert!(point_in_card(Vec2::ZERO, half), "center is inside");
        assert!(point_in_card(Vec2::new(150.0, 100.0), half), "corner is inside");
        assert!(point_in_card(Vec2::new(-150.0, 99.0), half), "left edge is inside");
        assert!(!point_in_card(Vec2::new(151.0, 0.0), half), "past the right edge");
        assert!(!point_in_card(Vec2::new(0.0, -100.1), half), "below the bottom edge");
    }

    #[test]
    fn ease_factor_stays_in_range_and_grows_with_dt() {
        let slow = ease_factor(EASE_RATE, 1.0 / 144.0);
        let fast = ease_factor(EASE_RATE, 1.0 / 30.0);
        assert!(slow > 0.0 && slow < 1.0, "short frames cover part of the distance");
        assert!(fast > slow, "longer frames cover more of the distance");
        assert!(ease_factor(EASE_RATE, 10.0) <= 1.0, "never overshoots the target");
        assert_eq!(ease_factor(EASE_RATE, 0.0), 0.0, "zero time moves nothing");
    }
}
