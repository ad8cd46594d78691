use bevy::prelude::*;
use effect_helpers::HostMessageHandler;
use effect_helpers::theme::{CurrentTheme, Theme};

use crate::Glow;

#[derive(Default, Clone, Copy)]
pub struct BentoGlow;

impl HostMessageHandler for BentoGlow {
    fn set_theme(world: &mut World, theme: Theme) {
        world.resource_mut::<CurrentTheme>().0 = theme;
    }

    fn restart(world: &mut World) {
        // Glows ease back to their resting centers on their own.
        let mut glows = world.query::<&mut Glow>();
        for mut glow in glows.iter_mut(world) {
            glow.target = Vec2::ZERO;
        }
    }
}
