//! Movement system - player bodies: walking, gravity, jumping, ground.

use crate::components::*;
use crate::config::DuelConfig;
use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Which bodies ended the last step standing on the ground.
///
/// Derived every step by the movement system and never set from outside,
/// so it lives here instead of on the entities.
#[derive(Resource, Debug, Clone, Default)]
pub struct GroundedState {
    grounded: HashMap<Entity, bool>,
}

impl GroundedState {
    pub fn is_grounded(&self, entity: Entity) -> bool {
        self.grounded.get(&entity).copied().unwrap_or(false)
    }

    pub fn set(&mut self, entity: Entity, grounded: bool) {
        self.grounded.insert(entity, grounded);
    }

    /// Drop entries for entities that no longer exist.
    pub fn retain(&mut self, mut alive: impl FnMut(Entity) -> bool) {
        self.grounded.retain(|entity, _| alive(*entity));
    }
}

/// Integrates player bodies.
///
/// Horizontal velocity comes straight from the move axis and is pinned to 0
/// while retracting. Gravity is applied before the position update, a jump
/// edge only works from the ground, and landing snaps the body onto the
/// ground line. Players are kept inside the arena horizontally.
pub fn movement_system(
    dt: Res<DeltaTime>,
    config: Res<DuelConfig>,
    mut grounded: ResMut<GroundedState>,
    mut query: Query<
        (
            Entity,
            &mut Position,
            &mut Velocity,
            &Collider,
            &Input,
            Option<&mut Facing>,
            Option<&Attack>,
        ),
        With<Player>,
    >,
) {
    let delta = dt.0;
    let physics = &config.physics;
    let ground_top = config.arena.ground_y;

    grounded.retain(|entity| query.contains(entity));

    for (entity, mut pos, mut vel, collider, input, facing, attack) in query.iter_mut() {
        let blocked = attack.is_some_and(|a| a.is_retracting);

        vel.x = if blocked {
            0.0
        } else {
            f32::from(input.move_axis) * physics.move_speed
        };

        if !blocked && input.move_axis != 0 {
            if let Some(mut facing) = facing {
                *facing = Facing::from_sign(f32::from(input.move_axis));
            }
        }

        vel.y = (vel.y + physics.gravity * delta).min(physics.max_fall_speed);

        if input.jump_pressed && grounded.is_grounded(entity) && !blocked {
            vel.y = physics.jump_force;
        }

        pos.x += vel.x * delta;
        pos.y += vel.y * delta;

        pos.x = pos.x.clamp(0.0, (config.arena.width - collider.w).max(0.0));

        let on_ground = pos.y + collider.h >= ground_top && vel.y >= 0.0;
        if on_ground {
            pos.y = ground_top - collider.h;
            vel.y = 0.0;
        }
        grounded.set(entity, on_ground);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::spawn_duelist_in_world;

    const DT: f32 = 1.0 / 60.0;

    fn setup(x: f32, y: f32) -> (World, Entity) {
        let config = DuelConfig::default();
        let mut world = World::new();
        world.insert_resource(DeltaTime(DT));
        world.insert_resource(GroundedState::default());
        let p = spawn_duelist_in_world(&mut world, &config, PlayerId::One, x, y, Facing::Right, true);
        world.insert_resource(config);
        (world, p)
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        schedule.run(world);
    }

    fn set_input(world: &mut World, p: Entity, input: Input) {
        *world.get_mut::<Input>(p).unwrap() = input;
    }

    #[test]
    fn test_movement_applies_velocity() {
        let (mut world, p) = setup(100.0, 100.0);
        set_input(&mut world, p, Input {
            move_axis: -1,
            ..Input::default()
        });
        run(&mut world);

        let pos = *world.get::<Position>(p).unwrap();
        let vel = *world.get::<Velocity>(p).unwrap();
        assert!((vel.x + 300.0).abs() < 1e-3);
        assert!((pos.x - (100.0 - 5.0)).abs() < 1e-3);
        // Gravity went in before integration.
        assert!((vel.y - 30.0).abs() < 1e-3);
        assert!((pos.y - (100.0 + 0.5)).abs() < 1e-3);
        assert_eq!(*world.get::<Facing>(p).unwrap(), Facing::Left);
    }

    #[test]
    fn test_fall_speed_is_capped_and_lands() {
        let (mut world, p) = setup(100.0, -2000.0);
        let ground = DuelConfig::default().arena.ground_y;
        for _ in 0..600 {
            run(&mut world);
            let vel = world.get::<Velocity>(p).unwrap();
            assert!(vel.y <= 900.0 + 1e-3);
        }
        let pos = world.get::<Position>(p).unwrap();
        assert!((pos.y + 120.0 - ground).abs() < 1e-3);
        assert!(world.resource::<GroundedState>().is_grounded(p));
    }

    #[test]
    fn test_jump_only_from_ground() {
        let config = DuelConfig::default();
        let standing = config.standing_y();
        let (mut world, p) = setup(100.0, standing);
        run(&mut world);
        assert!(world.resource::<GroundedState>().is_grounded(p));

        set_input(&mut world, p, Input {
            jump: true,
            jump_pressed: true,
            ..Input::default()
        });
        run(&mut world);
        let vel = *world.get::<Velocity>(p).unwrap();
        assert!((vel.y + 720.0).abs() < 1e-3);
        assert!(!world.resource::<GroundedState>().is_grounded(p));

        // A second press mid-air does nothing.
        run(&mut world);
        let vel = *world.get::<Velocity>(p).unwrap();
        assert!(vel.y > -720.0);
    }

    #[test]
    fn test_retracting_blocks_movement_and_jump() {
        let config = DuelConfig::default();
        let (mut world, p) = setup(100.0, config.standing_y());
        run(&mut world);

        *world.get_mut::<Attack>(p).unwrap() = Attack {
            is_attacking: false,
            extension: 20.0,
            is_retracting: true,
        };
        set_input(&mut world, p, Input {
            move_axis: -1,
            jump: true,
            jump_pressed: true,
            ..Input::default()
        });
        run(&mut world);

        let vel = *world.get::<Velocity>(p).unwrap();
        assert_eq!(vel.x, 0.0);
        assert_eq!(vel.y, 0.0);
        assert_eq!(*world.get::<Facing>(p).unwrap(), Facing::Right);
        assert!((world.get::<Position>(p).unwrap().x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_kept_inside_arena() {
        let config = DuelConfig::default();
        let (mut world, p) = setup(2.0, config.standing_y());
        set_input(&mut world, p, Input {
            move_axis: -1,
            ..Input::default()
        });
        run(&mut world);
        assert_eq!(world.get::<Position>(p).unwrap().x, 0.0);
    }
}
