//! Public API for the simulation.
//!
//! This module provides the main interface for a renderer, input layer or
//! test harness to drive the duel.
//!
//! ## Fixed Timestep
//!
//! The simulation uses a fixed timestep internally (default 60 Hz). When
//! `step(dt)` is called, the elapsed frame time is clamped to
//! `max_frame_time`, accumulated, and as many fixed updates as fit are run.
//! The leftover fraction is exposed as `alpha()` for render interpolation and
//! never feeds back into the simulation.

use crate::components::PlayerId;
use crate::config::DuelConfig;
use crate::error::DuelResult;
use crate::events::{DuelEvent, StepLog};
use crate::input::{InputLatch, Intent};
use crate::respawn::RespawnQueue;
use crate::stage::StageState;
use crate::store::{find_player, spawn_duelist_in_world, spawn_level};
use crate::systems::*;
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use log::{debug, info, trace};

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Starting a match
/// - Feeding per-player intents
/// - Stepping the simulation forward
/// - Extracting state snapshots
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    fixed_dt: f32,
    max_frame_time: f32,
    /// Accumulated time for fixed timestep.
    time_accumulator: f32,
}

impl SimWorld {
    /// Create a world with the default tuning and a match ready to play.
    pub fn new() -> Self {
        Self::build(DuelConfig::default())
    }

    /// Create a world with custom tuning. The config is validated first.
    pub fn with_config(config: DuelConfig) -> DuelResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: DuelConfig) -> Self {
        let mut world = World::new();
        let fixed_dt = config.fixed_timestep;
        let max_frame_time = config.max_frame_time;

        world.insert_resource(DeltaTime(fixed_dt));
        world.insert_resource(SimTick(0));
        world.insert_resource(config);
        world.insert_resource(GroundedState::default());
        world.insert_resource(InputLatch::default());
        world.insert_resource(RespawnQueue::default());
        world.insert_resource(StageState::default());
        world.insert_resource(StepLog::default());

        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        add_duel_systems(&mut schedule);

        let mut sim = Self {
            world,
            schedule,
            tick: 0,
            time: 0.0,
            fixed_dt,
            max_frame_time,
            time_accumulator: 0.0,
        };
        sim.start_match();
        sim
    }

    /// Wipe the arena and start a fresh match: stage 0, nobody waiting to
    /// respawn, both players armed at their spawn points.
    pub fn start_match(&mut self) {
        self.world.clear_entities();
        self.world.resource_mut::<StageState>().reset();
        self.world.resource_mut::<RespawnQueue>().clear();
        self.world.resource_mut::<InputLatch>().clear();
        self.world.resource_mut::<StepLog>().clear();
        self.world.insert_resource(GroundedState::default());

        let config = self.world.resource::<DuelConfig>().clone();
        spawn_level(&mut self.world, &config);
        for id in PlayerId::ALL {
            let spawn = config.spawn_point(id);
            spawn_duelist_in_world(&mut self.world, &config, id, spawn.x, spawn.y, id.default_facing(), true);
        }
        self.time_accumulator = 0.0;
        info!("match started, first to {} stages", config.stage.total_stages);
    }

    /// Advance by one rendered frame of `frame_dt` seconds and return how
    /// many fixed steps ran.
    ///
    /// Events from all of those steps are kept until the next call.
    pub fn step(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.max_frame_time)
        } else {
            0.0
        };
        self.world.resource_mut::<StepLog>().clear();

        self.time_accumulator += frame_dt;
        let mut steps = 0;
        while self.time_accumulator >= self.fixed_dt {
            self.fixed_update();
            self.time_accumulator -= self.fixed_dt;
            steps += 1;
        }
        if steps > 1 {
            debug!("caught up {steps} fixed steps in one frame");
        }
        steps
    }

    /// Run exactly one fixed step, bypassing the accumulator.
    pub fn step_fixed(&mut self) {
        self.world.resource_mut::<StepLog>().clear();
        self.fixed_update();
    }

    /// Run a single fixed timestep update.
    fn fixed_update(&mut self) {
        self.world.resource_mut::<DeltaTime>().0 = self.fixed_dt;
        self.world.resource_mut::<SimTick>().increment();

        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += self.fixed_dt;
        trace!("tick {} done at t={:.3}", self.tick, self.time);
    }

    /// Fraction of a fixed step left in the accumulator, for interpolation.
    pub fn alpha(&self) -> f32 {
        (self.time_accumulator / self.fixed_dt).clamp(0.0, 1.0)
    }

    /// Latch the held buttons for `player`. Rising edges are derived when the
    /// next fixed step consumes them.
    pub fn set_intent(&mut self, player: PlayerId, intent: Intent) {
        self.world.resource_mut::<InputLatch>().set(player, intent);
    }

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&mut self) -> Snapshot {
        let alpha = self.alpha();
        Snapshot::from_world(&mut self.world, self.tick, self.time, alpha)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> DuelResult<String> {
        Ok(self.snapshot().to_json()?)
    }

    pub fn stage(&self) -> &StageState {
        self.world.resource::<StageState>()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.stage().winner
    }

    pub fn respawn_queue(&self) -> &RespawnQueue {
        self.world.resource::<RespawnQueue>()
    }

    pub fn config(&self) -> &DuelConfig {
        self.world.resource::<DuelConfig>()
    }

    /// Events produced by the fixed steps of the last `step` call.
    pub fn last_events(&self) -> &[DuelEvent] {
        &self.world.resource::<StepLog>().events
    }

    /// The live entity for `player`, if they are in the arena.
    pub fn player_entity(&mut self, player: PlayerId) -> Option<Entity> {
        find_player(&mut self.world, player)
    }

    pub fn is_alive(&mut self, player: PlayerId) -> bool {
        self.player_entity(player).is_some()
    }

    /// Get current tick count.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get current simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}
