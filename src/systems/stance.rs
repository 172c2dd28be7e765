//! Stance system - guard changes gated by cooldown and button edges.

use crate::components::*;
use crate::config::DuelConfig;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;

/// Moves each player's guard at most one step per frame.
///
/// Frozen entirely while the player's attack is retracting. Up wins when
/// both edges arrive on the same step. Changes only happen on a rising edge
/// once the cooldown has run out.
pub fn stance_system(
    dt: Res<DeltaTime>,
    config: Res<DuelConfig>,
    mut query: Query<(&Input, &mut Stance, Option<&Attack>), With<Player>>,
) {
    let delta = dt.0;
    for (input, mut stance, attack) in query.iter_mut() {
        if attack.is_some_and(|a| a.is_retracting) {
            continue;
        }

        if stance.cooldown_remaining > 0.0 {
            stance.cooldown_remaining -= delta;
        }
        if stance.cooldown_remaining > 0.0 {
            continue;
        }

        let next = if input.stance_up_pressed {
            stance.current.raised()
        } else if input.stance_down_pressed {
            stance.current.lowered()
        } else {
            continue;
        };
        stance.current = next;
        stance.cooldown_remaining = config.stance.change_cooldown;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn world_with(stance: Stance, input: Input, attack: Attack) -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0 / 60.0));
        world.insert_resource(DuelConfig::default());
        let e = world
            .spawn((Player { id: PlayerId::One }, stance, input, attack))
            .id();
        (world, e)
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(stance_system);
        schedule.run(world);
    }

    fn up() -> Input {
        Input {
            stance_up: true,
            stance_up_pressed: true,
            ..Input::default()
        }
    }

    fn down() -> Input {
        Input {
            stance_down: true,
            stance_down_pressed: true,
            ..Input::default()
        }
    }

    #[rstest]
    #[case(StanceLevel::Low, up(), StanceLevel::Mid)]
    #[case(StanceLevel::Mid, up(), StanceLevel::High)]
    #[case(StanceLevel::High, up(), StanceLevel::High)]
    #[case(StanceLevel::High, down(), StanceLevel::Mid)]
    #[case(StanceLevel::Mid, down(), StanceLevel::Low)]
    #[case(StanceLevel::Low, down(), StanceLevel::Low)]
    fn test_single_step_per_edge(#[case] start: StanceLevel, #[case] input: Input, #[case] expected: StanceLevel) {
        let (mut world, e) = world_with(Stance::new(start), input, Attack::default());
        run(&mut world);
        assert_eq!(world.get::<Stance>(e).unwrap().current, expected);
    }

    #[test]
    fn test_up_wins_over_down() {
        let input = Input {
            stance_up_pressed: true,
            stance_down_pressed: true,
            ..Input::default()
        };
        let (mut world, e) = world_with(Stance::new(StanceLevel::Mid), input, Attack::default());
        run(&mut world);
        assert_eq!(world.get::<Stance>(e).unwrap().current, StanceLevel::High);
    }

    #[test]
    fn test_cooldown_blocks_then_expires() {
        let stance = Stance {
            current: StanceLevel::Mid,
            cooldown_remaining: 0.03,
        };
        let (mut world, e) = world_with(stance, up(), Attack::default());

        // 0.03 - 1/60 is still positive.
        run(&mut world);
        assert_eq!(world.get::<Stance>(e).unwrap().current, StanceLevel::Mid);

        run(&mut world);
        let stance = *world.get::<Stance>(e).unwrap();
        assert_eq!(stance.current, StanceLevel::High);
        assert!((stance.cooldown_remaining - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_held_button_without_edge_does_nothing() {
        let input = Input {
            stance_up: true,
            ..Input::default()
        };
        let (mut world, e) = world_with(Stance::new(StanceLevel::Low), input, Attack::default());
        for _ in 0..10 {
            run(&mut world);
        }
        assert_eq!(world.get::<Stance>(e).unwrap().current, StanceLevel::Low);
    }

    #[test]
    fn test_frozen_while_retracting() {
        let attack = Attack {
            is_attacking: false,
            extension: 30.0,
            is_retracting: true,
        };
        let stance = Stance {
            current: StanceLevel::Mid,
            cooldown_remaining: 0.01,
        };
        let (mut world, e) = world_with(stance, down(), attack);
        run(&mut world);
        let stance = *world.get::<Stance>(e).unwrap();
        assert_eq!(stance.current, StanceLevel::Mid);
        assert!((stance.cooldown_remaining - 0.01).abs() < 1e-6);
    }
}
