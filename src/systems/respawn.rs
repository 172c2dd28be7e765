//! Respawn system - brings dead players back once their timer expires.

use crate::components::*;
use crate::config::DuelConfig;
use crate::events::{DuelEvent, StepLog};
use crate::respawn::{compute_spawn, RespawnQueue};
use crate::store::spawn_duelist;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use log::{info, warn};

/// Ticks every respawn timer and re-creates the players whose time is up.
///
/// A returning player comes back unarmed when a loose sword issued to them is
/// still lying around, so the blade count per player never grows.
pub fn respawn_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    config: Res<DuelConfig>,
    mut queue: ResMut<RespawnQueue>,
    mut log: ResMut<StepLog>,
    players: Query<(&Player, &Position, Option<&Facing>)>,
    swords: Query<&Sword>,
) {
    for entry in queue.tick(dt.0) {
        if players.iter().any(|(player, ..)| player.id == entry.player) {
            warn!("{} is already in the arena, dropping their respawn", entry.player);
            continue;
        }

        let other = players
            .iter()
            .find(|(player, ..)| player.id == entry.player.other())
            .map(|(player, pos, facing)| (*pos, facing.copied().unwrap_or_else(|| player.id.default_facing())));
        let placement = compute_spawn(&config, &entry, other);

        let armed = !swords.iter().any(|sword| sword.is_loose() && sword.origin == entry.player);
        spawn_duelist(
            &mut commands,
            &config,
            entry.player,
            placement.x,
            placement.y,
            placement.facing,
            armed,
        );

        info!(
            "{} respawned at x={:.0} facing {:?}{}",
            entry.player,
            placement.x,
            placement.facing,
            if armed { "" } else { " (unarmed)" }
        );
        log.push(DuelEvent::Respawn {
            player: entry.player,
            x: placement.x,
            armed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{find_player, held_sword_of, spawn_duelist_in_world};

    const DT: f32 = 1.0 / 60.0;

    fn setup() -> World {
        let mut world = World::new();
        world.insert_resource(DeltaTime(DT));
        world.insert_resource(DuelConfig::default());
        world.insert_resource(RespawnQueue::default());
        world.insert_resource(StepLog::default());
        world
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(respawn_system);
        schedule.run(world);
    }

    #[test]
    fn test_respawns_armed_after_delay() {
        let mut world = setup();
        let config = DuelConfig::default();
        let killer = spawn_duelist_in_world(&mut world, &config, PlayerId::One, 400.0, config.standing_y(), Facing::Right, true);
        let killer_pos = *world.get::<Position>(killer).unwrap();
        world
            .resource_mut::<RespawnQueue>()
            .register(PlayerId::Two, config.respawn.delay, Some(killer_pos), Some(Facing::Right));

        // 3 s at 60 Hz is 180 steps; allow one extra for float drift.
        for _ in 0..179 {
            run(&mut world);
        }
        let mut steps = 179;
        while find_player(&mut world, PlayerId::Two).is_none() && steps < 181 {
            run(&mut world);
            steps += 1;
        }

        let p2 = find_player(&mut world, PlayerId::Two).unwrap();
        assert!(held_sword_of(&mut world, p2).is_some());
        let pos = *world.get::<Position>(p2).unwrap();
        assert!((pos.x - 600.0).abs() < 1e-3);
        assert_eq!(*world.get::<Facing>(p2).unwrap(), Facing::Left);
        assert!(!world.resource::<RespawnQueue>().is_respawning(PlayerId::Two));
    }

    #[test]
    fn test_respawns_unarmed_when_own_sword_is_loose() {
        let mut world = setup();
        let config = DuelConfig::default();
        world.spawn((
            Sword {
                owner: None,
                origin: PlayerId::Two,
                offset: SwordOffset::default(),
                state: SwordState::Grounded,
            },
            Position::new(700.0, 500.0),
            Velocity::default(),
            Collider::new(90.0, 15.0, ColliderTag::Sword),
        ));
        world.resource_mut::<RespawnQueue>().register(PlayerId::Two, DT / 2.0, None, None);

        run(&mut world);

        let p2 = find_player(&mut world, PlayerId::Two).unwrap();
        assert_eq!(held_sword_of(&mut world, p2), None);
        // Nobody else around: default spawn point.
        assert!((world.get::<Position>(p2).unwrap().x - config.player.spawn_p2_x).abs() < 1e-4);
        assert_eq!(
            world.resource::<StepLog>().events,
            vec![DuelEvent::Respawn {
                player: PlayerId::Two,
                x: config.player.spawn_p2_x,
                armed: false,
            }]
        );
    }

    #[test]
    fn test_live_player_is_not_duplicated() {
        let mut world = setup();
        let config = DuelConfig::default();
        spawn_duelist_in_world(&mut world, &config, PlayerId::One, 100.0, 400.0, Facing::Right, true);
        world.resource_mut::<RespawnQueue>().register(PlayerId::One, 0.0, None, None);

        run(&mut world);
        let mut query = world.query::<&Player>();
        assert_eq!(query.iter(&world).count(), 1);
    }
}
