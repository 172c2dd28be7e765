//! World Store helpers.
//!
//! The `bevy_ecs` `World` owns every entity. These helpers build the three
//! entity shapes and answer the lookups the façade and tests need. Anything
//! that mutates the store while looking at a query result first collects the
//! result into an ordered `Vec<Entity>`.

use crate::components::*;
use crate::config::DuelConfig;
use bevy_ecs::prelude::*;

/// Components of a freshly spawned duelist.
pub fn duelist_bundle(config: &DuelConfig, id: PlayerId, x: f32, y: f32, facing: Facing) -> PlayerBundle {
    PlayerBundle {
        player: Player { id },
        position: Position::new(x, y),
        velocity: Velocity::default(),
        collider: Collider::new(config.player.width, config.player.height, ColliderTag::Player),
        stance: Stance::new(StanceLevel::Mid),
        input: Input::default(),
        health: Health::new(config.player.starting_health),
        facing,
        attack: Attack::default(),
        sprite: SpriteKey(format!("player{}", id.number())),
    }
}

/// Components of a sword held by `owner`. The position is provisional; the
/// sword system places held blades every step.
pub fn held_sword_bundle(config: &DuelConfig, owner: Entity, origin: PlayerId, x: f32, y: f32) -> SwordBundle {
    let offset = SwordOffset {
        x: config.sword.offset_x,
        y: config.sword.offset_y,
    };
    SwordBundle {
        sword: Sword::held_by(owner, origin, offset),
        position: Position::new(x + offset.x, y + offset.y),
        velocity: Velocity::default(),
        collider: Collider::new(config.sword.width, config.sword.height, ColliderTag::Sword),
        sprite: SpriteKey(format!("sword{}", origin.number())),
    }
}

/// Spawn a duelist (and, if `armed`, their sword) through `Commands`.
/// Returns the player entity.
pub fn spawn_duelist(
    commands: &mut Commands,
    config: &DuelConfig,
    id: PlayerId,
    x: f32,
    y: f32,
    facing: Facing,
    armed: bool,
) -> Entity {
    let player = commands.spawn(duelist_bundle(config, id, x, y, facing)).id();
    if armed {
        commands.spawn(held_sword_bundle(config, player, id, x, y));
    }
    player
}

/// Same as [`spawn_duelist`] but directly on a `World`.
pub fn spawn_duelist_in_world(
    world: &mut World,
    config: &DuelConfig,
    id: PlayerId,
    x: f32,
    y: f32,
    facing: Facing,
    armed: bool,
) -> Entity {
    let player = world.spawn(duelist_bundle(config, id, x, y, facing)).id();
    if armed {
        world.spawn(held_sword_bundle(config, player, id, x, y));
    }
    player
}

/// Ground plus the two side walls.
pub fn spawn_level(world: &mut World, config: &DuelConfig) {
    let arena = &config.arena;
    world.spawn(WallBundle::new("ground", 0.0, arena.ground_y, arena.width, arena.ground_height));
    world.spawn(WallBundle::new("wall-left", -50.0, 0.0, 50.0, arena.height));
    world.spawn(WallBundle::new("wall-right", arena.width, 0.0, 50.0, arena.height));
}

/// Entities carrying `C` whose component satisfies `predicate`, in entity
/// order. The result is a frozen list, safe to use while mutating the world.
pub fn select<C: Component>(world: &mut World, predicate: impl Fn(&C) -> bool) -> Vec<Entity> {
    let mut query = world.query::<(Entity, &C)>();
    let mut found: Vec<Entity> = query
        .iter(world)
        .filter(|(_, component)| predicate(component))
        .map(|(entity, _)| entity)
        .collect();
    found.sort();
    found
}

/// The live entity for `id`, if that player is currently in the world.
pub fn find_player(world: &mut World, id: PlayerId) -> Option<Entity> {
    select::<Player>(world, |player| player.id == id).into_iter().next()
}

/// The sword currently held by `player`, if any.
pub fn held_sword_of(world: &mut World, player: Entity) -> Option<Entity> {
    select::<Sword>(world, |sword| sword.is_held_by(player)).into_iter().next()
}

/// Resolve a sword's owner link. A link to a despawned or non-player entity
/// resolves to `None`.
pub fn resolve_owner(world: &World, sword: &Sword) -> Option<Entity> {
    let owner = sword.owner?;
    world.get::<Player>(owner).map(|_| owner)
}

/// Number of swords claiming `Held` by each entity. Any count above one is
/// an ownership bug.
pub fn held_sword_counts(world: &mut World) -> Vec<(Entity, usize)> {
    let mut query = world.query::<&Sword>();
    let mut owners: Vec<Entity> = query
        .iter(world)
        .filter(|sword| sword.state == SwordState::Held)
        .filter_map(|sword| sword.owner)
        .collect();
    owners.sort();
    let mut counts: Vec<(Entity, usize)> = Vec::new();
    for owner in owners {
        match counts.last_mut() {
            Some((last, count)) if *last == owner => *count += 1,
            _ => counts.push((owner, 1)),
        }
    }
    counts
}
