//! ECS Systems for the Stance Duel simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Step Order
//!
//! Every fixed step runs the systems below once, strictly in this order.
//! Nothing runs in parallel; each system sees the finished work of the ones
//! before it, including entities spawned or despawned through `Commands`.
//!
//! 1. `input_apply_system` - latched intents become `Input` with edges
//! 2. `stance_system` - guard changes
//! 3. `attack_system` - thrust/retract
//! 4. `movement_system` - player bodies, gravity, ground
//! 5. `sword_system` - held blade placement, loose blade flight
//! 6. `pickup_system` - unarmed players reclaim grounded blades
//! 7. `collision_system` - parries, hits, kills
//! 8. `respawn_system` - dead players re-enter
//! 9. `stage_system` - territory, win, fade and stage reset

pub mod attack;
pub mod collision;
pub mod input;
pub mod movement;
pub mod pickup;
pub mod respawn;
pub mod stage;
pub mod stance;
pub mod sword;

pub use attack::*;
pub use collision::*;
pub use input::*;
pub use movement::*;
pub use pickup::*;
pub use respawn::*;
pub use stage::*;
pub use stance::*;
pub use sword::*;

use bevy_ecs::prelude::*;

/// Labels for each phase of a step, in execution order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuelSet {
    Input,
    Stance,
    Attack,
    Movement,
    Sword,
    Pickup,
    Collision,
    Respawn,
    Stage,
}

/// Simulation tick counter, bumped once per fixed step.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Register every gameplay system on `schedule` in step order.
pub fn add_duel_systems(schedule: &mut Schedule) {
    schedule.configure_sets(
        (
            DuelSet::Input,
            DuelSet::Stance,
            DuelSet::Attack,
            DuelSet::Movement,
            DuelSet::Sword,
            DuelSet::Pickup,
            DuelSet::Collision,
            DuelSet::Respawn,
            DuelSet::Stage,
        )
            .chain(),
    );
    schedule.add_systems(
        (
            input_apply_system.in_set(DuelSet::Input),
            stance_system.in_set(DuelSet::Stance),
            attack_system.in_set(DuelSet::Attack),
            movement_system.in_set(DuelSet::Movement),
            sword_system.in_set(DuelSet::Sword),
            pickup_system.in_set(DuelSet::Pickup),
            collision_system.in_set(DuelSet::Collision),
            respawn_system.in_set(DuelSet::Respawn),
            stage_system.in_set(DuelSet::Stage),
        )
            .chain(),
    );
}
