//! Stance Duel - Simulation Core
//!
//! A deterministic, fixed-timestep ECS simulation of a two-player,
//! stance-based sword duel. Uses `bevy_ecs` for the entity-component-system
//! architecture. Rendering, hardware input and assets live outside this
//! crate; they feed `Intent`s in and read `Snapshot`s out.

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod input;
pub mod respawn;
pub mod stage;
pub mod store;
pub mod systems;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use config::DuelConfig;
pub use error::{DuelError, DuelResult};
pub use events::{DuelEvent, KillKind, StepLog};
pub use geometry::Aabb;
pub use input::{InputLatch, Intent};
pub use respawn::{compute_spawn, RespawnEntry, RespawnQueue, SpawnPlacement};
pub use stage::{StageState, TransitionEvent, TransitionPhase};
pub use systems::{add_duel_systems, DeltaTime, DuelSet, GroundedState, SimTick};
pub use world::{PlayerSnapshot, Snapshot, SwordSnapshot, WallSnapshot};
