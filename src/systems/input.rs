//! Input apply system - turns latched intents into per-step `Input`.

use crate::components::*;
use crate::input::InputLatch;
use bevy_ecs::prelude::*;

/// Writes each live player's `Input` from the latch, deriving rising edges.
///
/// Absent (dead) players still consume their intent so a button held
/// through death does not register as a fresh press on respawn.
pub fn input_apply_system(mut latch: ResMut<InputLatch>, mut query: Query<(&Player, &mut Input)>) {
    let inputs = PlayerId::ALL.map(|id| latch.consume(id));
    for (player, mut input) in query.iter_mut() {
        *input = match player.id {
            PlayerId::One => inputs[0],
            PlayerId::Two => inputs[1],
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Intent;

    #[test]
    fn test_input_apply_derives_edges() {
        let mut world = World::new();
        let mut latch = InputLatch::default();
        latch.set(
            PlayerId::Two,
            Intent {
                move_axis: -1,
                attack: true,
                ..Intent::default()
            },
        );
        world.insert_resource(latch);
        let p2 = world.spawn((Player { id: PlayerId::Two }, Input::default())).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(input_apply_system);

        schedule.run(&mut world);
        let input = *world.get::<Input>(p2).unwrap();
        assert_eq!(input.move_axis, -1);
        assert!(input.attack_pressed);

        schedule.run(&mut world);
        let input = *world.get::<Input>(p2).unwrap();
        assert!(input.attack);
        assert!(!input.attack_pressed);
    }
}
