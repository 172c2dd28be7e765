//! Simulation constants.
//!
//! Everything here is read-only once a `SimWorld` is built. Rates are per
//! second and distances in pixels; the defaults reproduce the 60 Hz feel of
//! the arcade tuning (e.g. 0.5 px/step² gravity becomes 1800 px/s²).

use crate::components::{PlayerId, Position};
use crate::error::{DuelError, DuelResult};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Body physics for players and loose swords.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (px/s²).
    pub gravity: f32,
    /// Unused by the core; carried for the render collaborator's slide effects.
    pub friction: f32,
    /// Vertical velocity set on jump (negative is up).
    pub jump_force: f32,
    pub move_speed: f32,
    pub max_fall_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            friction: 0.85,
            jump_force: -720.0,
            move_speed: 300.0,
            max_fall_speed: 900.0,
        }
    }
}

/// Arena bounds and the ground line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Y of the top of the ground.
    pub ground_y: f32,
    pub ground_height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        let height = 720.0;
        Self {
            width: 1280.0,
            height,
            ground_y: height * 0.83,
            ground_height: height * 0.17,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    pub spawn_p1_x: f32,
    pub spawn_p2_x: f32,
    pub spawn_y: f32,
    pub starting_health: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        let arena = ArenaConfig::default();
        Self {
            width: 60.0,
            height: 120.0,
            spawn_p1_x: arena.width * 0.25,
            spawn_p2_x: arena.width * 0.75,
            spawn_y: arena.height * 0.5,
            starting_health: 1.0,
        }
    }
}

/// Sword geometry, thrust and loose-sword physics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwordConfig {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Vertical shift of a held blade for Low (+) and High (-) guards.
    pub stance_y_delta: f32,
    pub thrust_extension: f32,
    /// Extension withdrawn per second while retracting.
    pub retract_speed: f32,
    pub launch_velocity_x: f32,
    pub launch_velocity_y: f32,
    /// Horizontal speed given to a disarmed player, away from their facing.
    pub knockback_speed: f32,
    pub bounce_damping: f32,
    pub pickup_range: f32,
}

impl Default for SwordConfig {
    fn default() -> Self {
        Self {
            width: 90.0,
            height: 15.0,
            offset_x: 0.0,
            offset_y: 50.0,
            stance_y_delta: 15.0,
            thrust_extension: 60.0,
            retract_speed: 300.0,
            launch_velocity_x: 480.0,
            launch_velocity_y: -720.0,
            knockback_speed: 480.0,
            bounce_damping: 0.6,
            pickup_range: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceConfig {
    /// Seconds before another guard change is accepted.
    pub change_cooldown: f32,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            change_cooldown: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RespawnConfig {
    /// Seconds a dead player stays out of the world.
    pub delay: f32,
    /// Stand-off distance from the other player on re-entry.
    pub distance: f32,
}

impl Default for RespawnConfig {
    fn default() -> Self {
        Self {
            delay: 3.0,
            distance: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Stages a player must take to win the match.
    pub total_stages: i32,
    /// How close to the goal edge a player must get to advance.
    pub edge_threshold: f32,
    /// Seconds for fade out plus fade in.
    pub transition_duration: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            total_stages: 5,
            edge_threshold: 20.0,
            transition_duration: 0.8,
        }
    }
}

/// Full configuration surface of the duel.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Fixed timestep in seconds (1/60 for 60 Hz).
    pub fixed_timestep: f32,
    /// Longest frame the scheduler will catch up on after a stall.
    pub max_frame_time: f32,
    pub physics: PhysicsConfig,
    pub arena: ArenaConfig,
    pub player: PlayerConfig,
    pub sword: SwordConfig,
    pub stance: StanceConfig,
    pub respawn: RespawnConfig,
    pub stage: StageConfig,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0,
            max_frame_time: 0.25,
            physics: PhysicsConfig::default(),
            arena: ArenaConfig::default(),
            player: PlayerConfig::default(),
            sword: SwordConfig::default(),
            stance: StanceConfig::default(),
            respawn: RespawnConfig::default(),
            stage: StageConfig::default(),
        }
    }
}

fn require_positive(field: &'static str, value: f32) -> DuelResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DuelError::InvalidConfig {
            field,
            reason: format!("must be positive and finite, got {value}"),
        })
    }
}

fn require_non_negative(field: &'static str, value: f32) -> DuelResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DuelError::InvalidConfig {
            field,
            reason: format!("must be non-negative and finite, got {value}"),
        })
    }
}

impl DuelConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(data: &str) -> DuelResult<Self> {
        let config: DuelConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DuelResult<()> {
        require_positive("fixed_timestep", self.fixed_timestep)?;
        require_positive("max_frame_time", self.max_frame_time)?;
        if self.max_frame_time < self.fixed_timestep {
            return Err(DuelError::InvalidConfig {
                field: "max_frame_time",
                reason: "must be at least one fixed timestep".to_string(),
            });
        }
        require_non_negative("physics.gravity", self.physics.gravity)?;
        require_non_negative("physics.move_speed", self.physics.move_speed)?;
        require_positive("physics.max_fall_speed", self.physics.max_fall_speed)?;
        require_positive("arena.width", self.arena.width)?;
        require_positive("arena.height", self.arena.height)?;
        require_positive("arena.ground_y", self.arena.ground_y)?;
        require_positive("player.width", self.player.width)?;
        require_positive("player.height", self.player.height)?;
        if self.arena.width <= self.player.width * 3.0 {
            return Err(DuelError::InvalidConfig {
                field: "arena.width",
                reason: "must exceed three player widths".to_string(),
            });
        }
        require_positive("sword.width", self.sword.width)?;
        require_positive("sword.height", self.sword.height)?;
        require_non_negative("sword.thrust_extension", self.sword.thrust_extension)?;
        require_positive("sword.retract_speed", self.sword.retract_speed)?;
        require_non_negative("sword.bounce_damping", self.sword.bounce_damping)?;
        require_non_negative("sword.pickup_range", self.sword.pickup_range)?;
        require_non_negative("stance.change_cooldown", self.stance.change_cooldown)?;
        require_non_negative("respawn.delay", self.respawn.delay)?;
        require_non_negative("respawn.distance", self.respawn.distance)?;
        require_non_negative("stage.edge_threshold", self.stage.edge_threshold)?;
        require_positive("stage.transition_duration", self.stage.transition_duration)?;
        if self.stage.total_stages <= 0 {
            return Err(DuelError::InvalidConfig {
                field: "stage.total_stages",
                reason: format!("must be at least 1, got {}", self.stage.total_stages),
            });
        }
        Ok(())
    }

    /// Top of a player standing on the ground.
    pub fn standing_y(&self) -> f32 {
        self.arena.ground_y - self.player.height
    }

    /// Where `id` enters at match start and after a stage reset. Players
    /// start mid-air and drop onto the ground.
    pub fn spawn_point(&self, id: PlayerId) -> Position {
        let x = match id {
            PlayerId::One => self.player.spawn_p1_x,
            PlayerId::Two => self.player.spawn_p2_x,
        };
        Position::new(x, self.player.spawn_y)
    }

    /// Horizontal range a respawned player may occupy.
    pub fn respawn_x_bounds(&self) -> (f32, f32) {
        (self.player.width, self.arena.width - self.player.width * 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DuelConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = DuelConfig::from_json(r#"{"stage": {"total_stages": 3}}"#).unwrap();
        assert_eq!(config.stage.total_stages, 3);
        assert!((config.stage.edge_threshold - 20.0).abs() < 1e-6);
        assert!((config.fixed_timestep - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = DuelConfig::default();
        config.fixed_timestep = 0.0;
        assert!(matches!(
            config.validate(),
            Err(DuelError::InvalidConfig { field: "fixed_timestep", .. })
        ));

        let mut config = DuelConfig::default();
        config.stage.total_stages = 0;
        assert!(config.validate().is_err());

        assert!(matches!(DuelConfig::from_json("{not json"), Err(DuelError::Json(_))));
    }
}
