//! Attack system - the thrust/retract state machine.
//!
//! Idle -> Thrusting on an attack edge while holding a sword. The thrust is a
//! single-frame impulse: extension jumps to the maximum and the same step
//! flips to Retracting, which then winds the blade back at `retract_speed`.

use crate::components::*;
use crate::config::DuelConfig;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;

pub fn attack_system(
    dt: Res<DeltaTime>,
    config: Res<DuelConfig>,
    mut players: Query<(Entity, &Input, &mut Attack), With<Player>>,
    swords: Query<&Sword>,
) {
    let delta = dt.0;
    let max_extension = config.sword.thrust_extension;

    for (entity, input, mut attack) in players.iter_mut() {
        if attack.phase() == AttackPhase::Idle && input.attack_pressed {
            let armed = swords.iter().any(|sword| sword.is_held_by(entity));
            if armed {
                attack.is_attacking = true;
                attack.extension = max_extension;
                attack.is_retracting = false;
            }
        }

        if attack.is_attacking && attack.extension >= max_extension {
            attack.is_attacking = false;
            attack.is_retracting = true;
        }

        if attack.is_retracting {
            attack.extension -= config.sword.retract_speed * delta;
            if attack.extension <= 0.0 {
                attack.extension = 0.0;
                attack.is_retracting = false;
            }
        }
    }
}

/// Force a player out of any attack and knock them back, away from where
/// they face. Only collision resolution calls this.
pub fn disarm_player(attack: Option<&mut Attack>, velocity: &mut Velocity, facing: Facing, config: &DuelConfig) {
    if let Some(attack) = attack {
        attack.reset();
    }
    velocity.x = -facing.sign() * config.sword.knockback_speed;
}

/// Throw a sword out of its holder's hand: it loses its owner and starts
/// flying up and backwards relative to the holder's facing.
pub fn launch_sword(sword: &mut Sword, velocity: &mut Velocity, holder_facing: Facing, config: &DuelConfig) {
    sword.release();
    velocity.x = -holder_facing.sign() * config.sword.launch_velocity_x;
    velocity.y = config.sword.launch_velocity_y;
}
