//! Sword system - places held blades and flies loose ones.

use crate::components::*;
use crate::config::DuelConfig;
use crate::events::{DuelEvent, StepLog};
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use log::debug;

/// Owner data a held sword is positioned from.
type OwnerData = (
    &'static Position,
    &'static Collider,
    &'static Stance,
    Option<&'static Facing>,
    Option<&'static Attack>,
);
type OwnerView<'a> = (&'a Position, &'a Collider, &'a Stance, Option<&'a Facing>, Option<&'a Attack>);

/// Held swords are recomputed from their owner every step, never integrated.
/// Flying swords fall, bounce off the arena sides and land. Grounded swords
/// stay put at base width.
pub fn sword_system(
    dt: Res<DeltaTime>,
    config: Res<DuelConfig>,
    mut log: ResMut<StepLog>,
    mut swords: Query<(&mut Sword, &mut Position, &mut Velocity, &mut Collider), Without<Player>>,
    owners: Query<OwnerData, With<Player>>,
) {
    let delta = dt.0;

    for (mut sword, mut pos, mut vel, mut collider) in swords.iter_mut() {
        match sword.state {
            SwordState::Held => {
                // A dangling owner leaves the blade inert for this step.
                let Some(owner) = sword.owner.and_then(|owner| owners.get(owner).ok()) else {
                    continue;
                };
                place_held_sword(&config, &sword, owner, &mut pos, &mut collider);
            }
            SwordState::Flying => {
                collider.w = config.sword.width;
                if fly(&config, delta, &mut pos, &mut vel, &collider) {
                    sword.state = SwordState::Grounded;
                    debug!("{} sword landed at x={:.0}", sword.origin, pos.x);
                    log.push(DuelEvent::SwordLanded {
                        origin: sword.origin,
                        x: pos.x,
                    });
                }
            }
            SwordState::Grounded => {
                collider.w = config.sword.width;
            }
        }
    }
}

/// Put a held blade in front of its owner. The gap from the owner's leading
/// edge and the blade width both grow with the current thrust extension.
fn place_held_sword(config: &DuelConfig, sword: &Sword, owner: OwnerView<'_>, pos: &mut Position, collider: &mut Collider) {
    let (owner_pos, owner_collider, stance, facing, attack) = owner;
    let facing = facing.copied().unwrap_or(Facing::Right);
    let extension = attack.map_or(0.0, |a| a.extension);

    let gap = sword.offset.x + extension;
    let width = config.sword.width + extension;

    pos.x = match facing {
        Facing::Right => owner_pos.x + owner_collider.w + gap,
        Facing::Left => owner_pos.x - gap - width,
    };
    pos.y = owner_pos.y + sword.offset.y + stance.current.sword_y_shift(config.sword.stance_y_delta);
    collider.w = width;
}

/// One step of loose-blade flight. Returns true when the blade lands.
fn fly(config: &DuelConfig, delta: f32, pos: &mut Position, vel: &mut Velocity, collider: &Collider) -> bool {
    let physics = &config.physics;
    vel.y = (vel.y + physics.gravity * delta).min(physics.max_fall_speed);

    pos.x += vel.x * delta;
    pos.y += vel.y * delta;

    let right_wall = config.arena.width;
    if pos.x <= 0.0 {
        pos.x = 0.0;
        vel.x = -vel.x * config.sword.bounce_damping;
    } else if pos.x + collider.w >= right_wall {
        pos.x = right_wall - collider.w;
        vel.x = -vel.x * config.sword.bounce_damping;
    }

    let ground_top = config.arena.ground_y;
    if pos.y + collider.h >= ground_top && vel.y >= 0.0 {
        pos.y = ground_top - collider.h;
        vel.zero();
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{held_sword_of, spawn_duelist_in_world};

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(DT));
        world.insert_resource(DuelConfig::default());
        world.insert_resource(StepLog::default());
        world
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(sword_system);
        schedule.run(world);
    }

    fn sword_box(world: &World, sword: Entity) -> (Position, Collider) {
        (*world.get::<Position>(sword).unwrap(), *world.get::<Collider>(sword).unwrap())
    }

    #[test]
    fn test_held_sword_follows_facing_stance_and_extension() {
        let mut world = setup();
        let config = DuelConfig::default();
        let p = spawn_duelist_in_world(&mut world, &config, PlayerId::One, 100.0, 200.0, Facing::Right, true);
        let sword = held_sword_of(&mut world, p).unwrap();

        run(&mut world);
        let (pos, col) = sword_box(&world, sword);
        assert!((pos.x - 160.0).abs() < 1e-4);
        assert!((pos.y - 250.0).abs() < 1e-4);
        assert!((col.w - 90.0).abs() < 1e-4);

        world.get_mut::<Stance>(p).unwrap().current = StanceLevel::High;
        world.get_mut::<Attack>(p).unwrap().extension = 60.0;
        run(&mut world);
        let (pos, col) = sword_box(&world, sword);
        assert!((pos.x - 220.0).abs() < 1e-4);
        assert!((pos.y - 235.0).abs() < 1e-4);
        assert!((col.w - 150.0).abs() < 1e-4);

        *world.get_mut::<Facing>(p).unwrap() = Facing::Left;
        world.get_mut::<Stance>(p).unwrap().current = StanceLevel::Low;
        world.get_mut::<Attack>(p).unwrap().extension = 0.0;
        run(&mut world);
        let (pos, col) = sword_box(&world, sword);
        assert!((pos.x - 10.0).abs() < 1e-4);
        assert!((pos.y - 265.0).abs() < 1e-4);
        assert!((pos.x + col.w - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_dangling_owner_is_inert() {
        let mut world = setup();
        let config = DuelConfig::default();
        let p = spawn_duelist_in_world(&mut world, &config, PlayerId::Two, 300.0, 200.0, Facing::Left, true);
        let sword = held_sword_of(&mut world, p).unwrap();
        let before = sword_box(&world, sword);
        world.despawn(p);

        run(&mut world);
        assert_eq!(sword_box(&world, sword), before);
        assert_eq!(world.get::<Sword>(sword).unwrap().state, SwordState::Held);
    }

    #[test]
    fn test_flying_sword_bounces_and_lands() {
        let mut world = setup();
        let config = DuelConfig::default();
        let sword = world
            .spawn((
                Sword {
                    owner: None,
                    origin: PlayerId::One,
                    offset: SwordOffset::default(),
                    state: SwordState::Flying,
                },
                Position::new(5.0, 300.0),
                Velocity::new(-600.0, -300.0),
                Collider::new(150.0, 15.0, ColliderTag::Sword),
            ))
            .id();

        run(&mut world);
        let vel = *world.get::<Velocity>(sword).unwrap();
        assert_eq!(world.get::<Position>(sword).unwrap().x, 0.0);
        assert!((vel.x - 360.0).abs() < 1e-3);
        assert!((world.get::<Collider>(sword).unwrap().w - 90.0).abs() < 1e-4);

        for _ in 0..300 {
            run(&mut world);
        }
        let sword_state = world.get::<Sword>(sword).unwrap().state;
        assert_eq!(sword_state, SwordState::Grounded);
        let pos = *world.get::<Position>(sword).unwrap();
        assert!((pos.y + 15.0 - config.arena.ground_y).abs() < 1e-3);
        assert_eq!(*world.get::<Velocity>(sword).unwrap(), Velocity::default());
        assert_eq!(world.resource::<StepLog>().events.len(), 1);
    }
}
