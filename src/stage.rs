//! Match progression state.
//!
//! `current_stage` runs from `-total_stages` to `+total_stages`. Positive
//! values are ground taken by player 1 (advancing right), negative values
//! ground taken by player 2 (advancing left). Only the last player to score a
//! kill may advance, and doing so spends that right.

use crate::components::PlayerId;
use crate::config::StageConfig;
use crate::error::DuelResult;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Phase of the between-stage fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionPhase {
    #[default]
    None,
    FadeOut,
    FadeIn,
}

/// What a call to [`StageState::advance_transition`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// Still fading, or no transition running.
    Continue,
    /// Screen is fully black: reposition the stage now.
    ResetStage,
    /// Fade-in done, play resumes.
    Finished,
}

#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StageState {
    pub current_stage: i32,
    pub last_kill_by: Option<PlayerId>,
    pub transition: TransitionPhase,
    /// Progress through the current fade half, 0 to 1.
    pub transition_progress: f32,
    pub winner: Option<PlayerId>,
}

impl StageState {
    /// Back to a fresh match. Only match start calls this.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition != TransitionPhase::None
    }

    /// The killer becomes the only player allowed to advance.
    pub fn record_kill(&mut self, killer: PlayerId) {
        self.last_kill_by = Some(killer);
    }

    /// Whether `player`, whose leading edge is at `leading_x`, may advance.
    pub fn can_progress(&self, player: PlayerId, leading_x: f32, arena_width: f32, config: &StageConfig) -> bool {
        if self.is_transitioning() || self.winner.is_some() {
            return false;
        }
        if self.last_kill_by != Some(player) {
            return false;
        }
        match player {
            PlayerId::One => {
                leading_x >= arena_width - config.edge_threshold && self.current_stage < config.total_stages
            }
            PlayerId::Two => leading_x <= config.edge_threshold && self.current_stage > -config.total_stages,
        }
    }

    /// Move the stage counter one step toward `player`, spend the kill right
    /// and start fading out. Sets the winner when the counter reaches a limit.
    pub fn begin_advance(&mut self, player: PlayerId, config: &StageConfig) {
        match player {
            PlayerId::One => self.current_stage += 1,
            PlayerId::Two => self.current_stage -= 1,
        }
        self.last_kill_by = None;
        self.transition = TransitionPhase::FadeOut;
        self.transition_progress = 0.0;

        if self.current_stage >= config.total_stages {
            self.winner = Some(PlayerId::One);
        } else if self.current_stage <= -config.total_stages {
            self.winner = Some(PlayerId::Two);
        }
    }

    /// Move the fade forward by `dt`. Each half lasts half of
    /// `transition_duration`.
    pub fn advance_transition(&mut self, dt: f32, config: &StageConfig) -> TransitionEvent {
        if !self.is_transitioning() {
            return TransitionEvent::Continue;
        }

        let speed = 1.0 / (config.transition_duration / 2.0);
        self.transition_progress += speed * dt;
        if self.transition_progress < 1.0 {
            return TransitionEvent::Continue;
        }

        self.transition_progress = 0.0;
        match self.transition {
            TransitionPhase::FadeOut => {
                self.transition = TransitionPhase::FadeIn;
                TransitionEvent::ResetStage
            }
            TransitionPhase::FadeIn | TransitionPhase::None => {
                self.transition = TransitionPhase::None;
                TransitionEvent::Finished
            }
        }
    }

    /// Screen darkness for the HUD: 0 is fully visible, 1 fully black.
    pub fn opacity(&self) -> f32 {
        match self.transition {
            TransitionPhase::None => 0.0,
            TransitionPhase::FadeOut => self.transition_progress,
            TransitionPhase::FadeIn => 1.0 - self.transition_progress,
        }
    }

    pub fn to_json(&self) -> DuelResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(data: &str) -> DuelResult<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
