//! Intent snapshots from the input collaborator and rising-edge derivation.
//!
//! The collaborator only reports which buttons are held. Edges are derived
//! here, once per fixed step, against the previous step's snapshot, so a
//! press is an edge on exactly one step even when several steps run in one
//! rendered frame.

use crate::components::{Input, PlayerId};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Held-button state for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub move_axis: i8,
    pub jump: bool,
    pub attack: bool,
    pub stance_up: bool,
    pub stance_down: bool,
    pub pickup: bool,
}

impl Intent {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(axis: i8) -> Self {
        Self {
            move_axis: axis,
            ..Self::default()
        }
    }

    /// Build the per-step `Input` for this snapshot given the last one seen.
    pub fn to_input(self, previous: Intent) -> Input {
        Input {
            move_axis: self.move_axis.signum(),
            jump: self.jump,
            attack: self.attack,
            stance_up: self.stance_up,
            stance_down: self.stance_down,
            pickup: self.pickup,
            jump_pressed: self.jump && !previous.jump,
            attack_pressed: self.attack && !previous.attack,
            stance_up_pressed: self.stance_up && !previous.stance_up,
            stance_down_pressed: self.stance_down && !previous.stance_down,
            pickup_pressed: self.pickup && !previous.pickup,
        }
    }
}

/// Latest intents plus the snapshot consumed on the previous step.
///
/// Keyed by player id rather than entity so edge history survives a player
/// being removed and respawned.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputLatch {
    current: BTreeMap<PlayerId, Intent>,
    previous: BTreeMap<PlayerId, Intent>,
}

impl InputLatch {
    pub fn set(&mut self, player: PlayerId, intent: Intent) {
        self.current.insert(player, intent);
    }

    pub fn current(&self, player: PlayerId) -> Intent {
        self.current.get(&player).copied().unwrap_or_default()
    }

    /// Produce this step's `Input` for `player` and remember the snapshot.
    pub fn consume(&mut self, player: PlayerId) -> Input {
        let current = self.current(player);
        let previous = self.previous.insert(player, current).unwrap_or_default();
        current.to_input(previous)
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_fires_once_per_press() {
        let mut latch = InputLatch::default();
        latch.set(
            PlayerId::One,
            Intent {
                attack: true,
                ..Intent::default()
            },
        );

        let first = latch.consume(PlayerId::One);
        assert!(first.attack);
        assert!(first.attack_pressed);

        let second = latch.consume(PlayerId::One);
        assert!(second.attack);
        assert!(!second.attack_pressed);

        latch.set(PlayerId::One, Intent::idle());
        assert!(!latch.consume(PlayerId::One).attack);

        latch.set(
            PlayerId::One,
            Intent {
                attack: true,
                ..Intent::default()
            },
        );
        assert!(latch.consume(PlayerId::One).attack_pressed);
    }

    #[test]
    fn test_move_axis_is_clamped() {
        let input = Intent::moving(5).to_input(Intent::idle());
        assert_eq!(input.move_axis, 1);
        let input = Intent::moving(-3).to_input(Intent::idle());
        assert_eq!(input.move_axis, -1);
    }

    #[test]
    fn test_players_are_independent() {
        let mut latch = InputLatch::default();
        latch.set(
            PlayerId::Two,
            Intent {
                jump: true,
                ..Intent::default()
            },
        );
        assert!(!latch.consume(PlayerId::One).jump_pressed);
        assert!(latch.consume(PlayerId::Two).jump_pressed);
    }
}
