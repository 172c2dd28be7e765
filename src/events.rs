//! Typed gameplay events produced during one fixed step.
//!
//! Systems append to [`StepLog`]; the façade clears it at the start of each
//! frame, so a snapshot shows what the fixed steps of the last frame did.

use crate::components::PlayerId;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// How a kill happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillKind {
    /// Held blade struck the defender's rear.
    Backstab,
    /// Held blade struck a defender with no sword.
    Unarmed,
    /// Held blade got past an armed defender's guard.
    Frontal,
    /// Defender ran into a loose, airborne blade.
    FlyingSword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DuelEvent {
    Kill {
        killer: PlayerId,
        victim: PlayerId,
        kind: KillKind,
    },
    Parry {
        stance_push: f32,
    },
    Disarm {
        player: PlayerId,
    },
    SwordLanded {
        origin: PlayerId,
        x: f32,
    },
    Pickup {
        player: PlayerId,
        origin: PlayerId,
    },
    Respawn {
        player: PlayerId,
        x: f32,
        armed: bool,
    },
    StageAdvanced {
        player: PlayerId,
        stage: i32,
    },
    MatchWon {
        winner: PlayerId,
    },
    StageReset,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct StepLog {
    pub events: Vec<DuelEvent>,
}

impl StepLog {
    pub fn push(&mut self, event: DuelEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn kills(&self) -> impl Iterator<Item = (PlayerId, PlayerId, KillKind)> + '_ {
        self.events.iter().filter_map(|event| match event {
            DuelEvent::Kill { killer, victim, kind } => Some((*killer, *victim, *kind)),
            _ => None,
        })
    }
}
