//! Read-only snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the duel that a
//! renderer, HUD or replay recorder can consume without touching the ECS.

use crate::components::*;
use crate::events::{DuelEvent, StepLog};
use crate::respawn::RespawnQueue;
use crate::stage::StageState;
use crate::systems::movement::GroundedState;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a single duelist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub w: f32,
    pub h: f32,
    pub facing: Facing,
    pub stance: StanceLevel,
    pub stance_cooldown: f32,
    pub attack: AttackPhase,
    pub extension: f32,
    pub armed: bool,
    pub grounded: bool,
    pub sprite: String,
}

/// Snapshot of a sword, held or loose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwordSnapshot {
    /// Player the sword was issued to.
    pub origin: PlayerId,
    /// Player holding it right now, if any.
    pub holder: Option<PlayerId>,
    pub state: SwordState,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub sprite: String,
}

/// Snapshot of static level geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSnapshot {
    pub sprite: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// A dead player waiting to re-enter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnSnapshot {
    pub player: PlayerId,
    pub remaining: f32,
}

/// Complete duel state after the last fixed step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Fixed steps run since the world was created.
    pub tick: u64,
    /// Simulated seconds.
    pub time: f32,
    /// Interpolation factor between the last two steps, 0 to 1.
    pub alpha: f32,
    /// Players in id order. A dead player is absent.
    pub players: Vec<PlayerSnapshot>,
    pub swords: Vec<SwordSnapshot>,
    pub walls: Vec<WallSnapshot>,
    pub stage: StageState,
    /// Fade darkness for the HUD, 0 to 1.
    pub fade: f32,
    pub respawning: Vec<RespawnSnapshot>,
    /// Events produced by the fixed steps of the last frame.
    pub events: Vec<DuelEvent>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32, alpha: f32) -> Self {
        let grounded = world.get_resource::<GroundedState>().cloned().unwrap_or_default();

        let mut held: Vec<(Entity, PlayerId)> = Vec::new();
        let mut player_query = world.query::<(
            Entity,
            &Player,
            &Position,
            &Velocity,
            &Collider,
            &Stance,
            Option<&Facing>,
            Option<&Attack>,
            Option<&SpriteKey>,
        )>();
        let mut players: Vec<PlayerSnapshot> = Vec::new();
        for (entity, player, pos, vel, collider, stance, facing, attack, sprite) in player_query.iter(world) {
            held.push((entity, player.id));
            let attack = attack.copied().unwrap_or_default();
            players.push(PlayerSnapshot {
                id: player.id,
                x: pos.x,
                y: pos.y,
                vx: vel.x,
                vy: vel.y,
                w: collider.w,
                h: collider.h,
                facing: facing.copied().unwrap_or_else(|| player.id.default_facing()),
                stance: stance.current,
                stance_cooldown: stance.cooldown_remaining.max(0.0),
                attack: attack.phase(),
                extension: attack.extension,
                armed: false,
                grounded: grounded.is_grounded(entity),
                sprite: sprite.map(|s| s.0.clone()).unwrap_or_default(),
            });
        }
        players.sort_by_key(|p| p.id);

        let mut sword_query = world.query::<(Entity, &Sword, &Position, &Velocity, &Collider, Option<&SpriteKey>)>();
        let mut swords: Vec<(Entity, SwordSnapshot)> = sword_query
            .iter(world)
            .map(|(entity, sword, pos, vel, collider, sprite)| {
                let holder = match sword.state {
                    SwordState::Held => sword
                        .owner
                        .and_then(|owner| held.iter().find(|(e, _)| *e == owner).map(|(_, id)| *id)),
                    SwordState::Flying | SwordState::Grounded => None,
                };
                let snapshot = SwordSnapshot {
                    origin: sword.origin,
                    holder,
                    state: sword.state,
                    x: pos.x,
                    y: pos.y,
                    w: collider.w,
                    h: collider.h,
                    vx: vel.x,
                    vy: vel.y,
                    sprite: sprite.map(|s| s.0.clone()).unwrap_or_default(),
                };
                (entity, snapshot)
            })
            .collect();
        swords.sort_by_key(|(entity, _)| *entity);
        let swords: Vec<SwordSnapshot> = swords.into_iter().map(|(_, s)| s).collect();

        for player in &mut players {
            player.armed = swords.iter().any(|s| s.holder == Some(player.id));
        }

        let mut wall_query = world.query_filtered::<(Entity, &Position, &Collider, &SpriteKey), With<Wall>>();
        let mut walls: Vec<(Entity, WallSnapshot)> = wall_query
            .iter(world)
            .map(|(entity, pos, collider, sprite)| {
                (
                    entity,
                    WallSnapshot {
                        sprite: sprite.0.clone(),
                        x: pos.x,
                        y: pos.y,
                        w: collider.w,
                        h: collider.h,
                    },
                )
            })
            .collect();
        walls.sort_by_key(|(entity, _)| *entity);

        let stage = world.get_resource::<StageState>().cloned().unwrap_or_default();
        let respawning = world
            .get_resource::<RespawnQueue>()
            .map(|queue| {
                queue
                    .entries()
                    .map(|entry| RespawnSnapshot {
                        player: entry.player,
                        remaining: entry.timer.max(0.0),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let events = world
            .get_resource::<StepLog>()
            .map(|log| log.events.clone())
            .unwrap_or_default();

        Self {
            tick,
            time,
            alpha,
            players,
            swords,
            walls: walls.into_iter().map(|(_, w)| w).collect(),
            fade: stage.opacity(),
            stage,
            respawning,
            events,
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}
