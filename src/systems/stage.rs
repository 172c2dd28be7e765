//! Stage system - territorial advance, the win, and the between-stage reset.

use crate::components::*;
use crate::config::DuelConfig;
use crate::events::{DuelEvent, StepLog};
use crate::respawn::RespawnQueue;
use crate::stage::{StageState, TransitionEvent};
use crate::store::{held_sword_bundle, spawn_duelist};
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use log::{debug, info};

type StagePlayerData = (
    Entity,
    &'static Player,
    &'static mut Position,
    &'static mut Velocity,
    &'static Collider,
    &'static mut Stance,
    Option<&'static mut Facing>,
    Option<&'static mut Attack>,
);

/// Leading edge of a player's box along their advance direction: the right
/// edge for player 1, the left edge for player 2.
pub fn leading_edge(id: PlayerId, pos: &Position, collider: &Collider) -> f32 {
    match id {
        PlayerId::One => pos.x + collider.w,
        PlayerId::Two => pos.x,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn stage_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    config: Res<DuelConfig>,
    mut stage: ResMut<StageState>,
    mut respawns: ResMut<RespawnQueue>,
    mut log: ResMut<StepLog>,
    mut players: Query<StagePlayerData, With<Player>>,
    swords: Query<(Entity, &Sword), Without<Player>>,
) {
    match stage.advance_transition(dt.0, &config.stage) {
        TransitionEvent::ResetStage => {
            reset_stage(&mut commands, &config, &mut respawns, &mut players, &swords);
            info!("stage {} begins", stage.current_stage);
            log.push(DuelEvent::StageReset);
            return;
        }
        TransitionEvent::Finished => {
            debug!("stage transition finished");
            return;
        }
        TransitionEvent::Continue => {}
    }

    if stage.is_transitioning() || stage.winner.is_some() {
        return;
    }

    let mut edges: Vec<(PlayerId, f32)> = players
        .iter()
        .map(|(_, player, pos, _, collider, ..)| (player.id, leading_edge(player.id, pos, collider)))
        .collect();
    edges.sort_by_key(|(id, _)| *id);

    for (id, edge) in edges {
        if !stage.can_progress(id, edge, config.arena.width, &config.stage) {
            continue;
        }
        stage.begin_advance(id, &config.stage);
        info!("{id} advanced, stage is now {}", stage.current_stage);
        log.push(DuelEvent::StageAdvanced {
            player: id,
            stage: stage.current_stage,
        });
        if let Some(winner) = stage.winner {
            info!("{winner} wins the match");
            log.push(DuelEvent::MatchWon { winner });
        }
        break;
    }
}

/// Put the arena back to its opening layout while the screen is dark.
///
/// Pending respawns are cancelled and everyone is placed at their spawn point
/// with a fresh guard. Loose swords are cleared and every player ends up with
/// exactly one held sword.
fn reset_stage(
    commands: &mut Commands,
    config: &DuelConfig,
    respawns: &mut RespawnQueue,
    players: &mut Query<StagePlayerData, With<Player>>,
    swords: &Query<(Entity, &Sword), Without<Player>>,
) {
    respawns.clear();

    let mut present: Vec<PlayerId> = Vec::new();
    for (entity, player, mut pos, mut vel, _, mut stance, facing, attack) in players.iter_mut() {
        let id = player.id;
        present.push(id);

        *pos = config.spawn_point(id);
        vel.zero();
        *stance = Stance::new(StanceLevel::Mid);
        if let Some(mut facing) = facing {
            *facing = id.default_facing();
        }
        if let Some(mut attack) = attack {
            attack.reset();
        }

        if !swords.iter().any(|(_, sword)| sword.is_held_by(entity)) {
            commands.spawn(held_sword_bundle(config, entity, id, pos.x, pos.y));
        }
    }

    for (entity, sword) in swords.iter() {
        let live_owner = sword.owner.is_some_and(|owner| players.contains(owner));
        if sword.is_loose() || !live_owner {
            commands.entity(entity).despawn();
        }
    }

    for id in PlayerId::ALL {
        if present.contains(&id) {
            continue;
        }
        let spawn = config.spawn_point(id);
        spawn_duelist(commands, config, id, spawn.x, spawn.y, id.default_facing(), true);
    }
}
