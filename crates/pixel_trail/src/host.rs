use bevy::prelude::*;
use effect_helpers::HostMessageHandler;
use effect_helpers::theme::{CurrentTheme, Theme};

use crate::{GridRebuilt, TrailEngine};

#[derive(Default, Clone, Copy)]
pub struct PixelTrail;

impl HostMessageHandler for PixelTrail {
    fn set_theme(world: &mut World, theme: Theme) {
        world.resource_mut::<CurrentTheme>().0 = theme;
    }

    fn restart(world: &mut World) {
        let mut windows = world.query::<&Window>();
        let Ok(window) = windows.get_single(world) else {
            return;
        };
        let (width, height) = (window.width(), window.height());
        world
            .resource_mut::<TrailEngine>()
            .configure(width, height);
        world.send_event(GridRebuilt);
    }

    fn set_interacting(world: &mut World, interacting: bool) {
        world
            .resource_mut::<TrailEngine>()
            .set_interacting(interacting);
    }
}

#[cfg(test)]
mod tests {
    use bevy::utils::Duration;
    use effect_helpers::HostMessageHandler;

    use super::*;

    #[test]
    fn host_interaction_takes_priority_over_ambient_pulses() {
        let mut world = World::new();
        let mut engine = TrailEngine::new(120.0, 120.0);
        engine.set_touch_capable(true);
        engine.tick(Duration::from_millis(800));
        assert!(!engine.ambient().is_empty(), "idle spawner produced pulses");
        world.insert_resource(engine);

        PixelTrail::set_interacting(&mut world, true);
        let engine = world.resource::<TrailEngine>();
        assert!(engine.is_interacting(), "host message flipped the flag");
        assert!(engine.ambient().is_empty(), "pulses cleared immediately");

        PixelTrail::set_interacting(&mut world, false);
        assert!(
            !world.resource::<TrailEngine>().is_interacting(),
            "host message releases the flag"
        );
    }
}
