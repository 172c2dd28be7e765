//! Respawn bookkeeping.
//!
//! Dead players are removed from the world entirely; their pending return
//! lives here, keyed by player id, until the timer runs out.

use crate::components::{Facing, PlayerId, Position};
use crate::config::DuelConfig;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pending respawn, with what was known about the killer at kill time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RespawnEntry {
    pub player: PlayerId,
    pub timer: f32,
    pub killer_position: Option<Position>,
    pub killer_facing: Option<Facing>,
}

/// Countdown timers for every dead player.
#[derive(Resource, Debug, Clone, Default)]
pub struct RespawnQueue {
    entries: BTreeMap<PlayerId, RespawnEntry>,
}

impl RespawnQueue {
    /// Start (or restart) the countdown for `player`.
    pub fn register(
        &mut self,
        player: PlayerId,
        delay: f32,
        killer_position: Option<Position>,
        killer_facing: Option<Facing>,
    ) {
        self.entries.insert(
            player,
            RespawnEntry {
                player,
                timer: delay,
                killer_position,
                killer_facing,
            },
        );
    }

    /// Advance every timer by `dt` and hand back the entries that expired,
    /// in player-id order. Expired entries leave the queue.
    pub fn tick(&mut self, dt: f32) -> Vec<RespawnEntry> {
        for entry in self.entries.values_mut() {
            entry.timer -= dt;
        }
        let ready: Vec<PlayerId> = self
            .entries
            .values()
            .filter(|entry| entry.timer <= 0.0)
            .map(|entry| entry.player)
            .collect();
        ready
            .into_iter()
            .filter_map(|player| self.entries.remove(&player))
            .collect()
    }

    pub fn is_respawning(&self, player: PlayerId) -> bool {
        self.entries.contains_key(&player)
    }

    /// Seconds left for `player`, or 0 if they are not waiting.
    pub fn remaining(&self, player: PlayerId) -> f32 {
        self.entries.get(&player).map_or(0.0, |entry| entry.timer)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RespawnEntry> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Where a returning player enters, and which way they face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPlacement {
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
}

/// Compute the re-entry point for `entry.player`.
///
/// With the other player present, the preferred spot is `distance` ahead of
/// the killer along the killer's facing; if that leaves the respawn band
/// `[player_width, arena_width - 2 * player_width]`, the opposite side is
/// used, clamped into the band. The newcomer faces the other player. With
/// nobody else in the arena, the configured spawn point is used.
pub fn compute_spawn(config: &DuelConfig, entry: &RespawnEntry, other: Option<(Position, Facing)>) -> SpawnPlacement {
    let y = config.standing_y();
    let player = entry.player;

    let Some((other_pos, other_facing)) = other else {
        let x = match player {
            PlayerId::One => config.player.spawn_p1_x,
            PlayerId::Two => config.player.spawn_p2_x,
        };
        return SpawnPlacement {
            x,
            y,
            facing: player.default_facing(),
        };
    };

    let (min_x, max_x) = config.respawn_x_bounds();
    let direction = entry.killer_facing.unwrap_or(other_facing).sign();
    let distance = config.respawn.distance;

    let preferred = other_pos.x + direction * distance;
    let x = if (min_x..=max_x).contains(&preferred) {
        preferred
    } else {
        (other_pos.x - direction * distance).clamp(min_x, max_x)
    };

    let facing = if other_pos.x < x {
        Facing::Left
    } else if other_pos.x > x {
        Facing::Right
    } else {
        player.default_facing()
    };

    SpawnPlacement { x, y, facing }
}
