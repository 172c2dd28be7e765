//! Collision system - parries, sword hits and kills.
//!
//! Runs three passes per step, only when both duelists are in the arena:
//!
//! 1. Matched-stance blade contact pushes the bodies apart and disarms
//!    whoever had their blade out.
//! 2. A held blade touching the other body kills it (backstab, unarmed or
//!    frontal, all lethal).
//! 3. A flying blade touching a body kills it, credited to the other player.
//!
//! Kills are applied once all passes are done. A player dies at most once per
//! step, and blades knocked loose this step cannot kill until the next one.

use crate::components::*;
use crate::config::DuelConfig;
use crate::events::{DuelEvent, KillKind, StepLog};
use crate::geometry::Aabb;
use crate::respawn::RespawnQueue;
use crate::stage::StageState;
use crate::systems::attack::{disarm_player, launch_sword};
use bevy_ecs::prelude::*;
use log::{debug, info};

type PlayerData = (
    Entity,
    &'static Player,
    &'static mut Position,
    &'static mut Velocity,
    &'static Collider,
    &'static Stance,
    Option<&'static Facing>,
    Option<&'static mut Attack>,
);

type SwordData = (
    Entity,
    &'static mut Sword,
    &'static Position,
    &'static Collider,
    &'static mut Velocity,
);

/// What collision needs to know about a duelist at one point in the step.
#[derive(Debug, Clone, Copy)]
struct Body {
    entity: Entity,
    id: PlayerId,
    bounds: Aabb,
    position: Position,
    stance: StanceLevel,
    facing: Facing,
    attacking: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingKill {
    killer: Body,
    victim: Body,
    kind: KillKind,
}

/// Classify a held-blade hit from where the blade sits relative to the
/// defender and whether the defender is armed.
pub fn classify_hit(blade: &Aabb, defender: &Aabb, defender_facing: Facing, defender_armed: bool) -> KillKind {
    let from_behind = match defender_facing {
        Facing::Right => blade.center_x() < defender.center_x(),
        Facing::Left => blade.center_x() > defender.center_x(),
    };
    if from_behind {
        KillKind::Backstab
    } else if !defender_armed {
        KillKind::Unarmed
    } else {
        KillKind::Frontal
    }
}

pub fn collision_system(
    mut commands: Commands,
    config: Res<DuelConfig>,
    mut respawns: ResMut<RespawnQueue>,
    mut stage: ResMut<StageState>,
    mut log: ResMut<StepLog>,
    mut players: Query<PlayerData, With<Player>>,
    mut swords: Query<SwordData, Without<Player>>,
) {
    let mut roster: Vec<(PlayerId, Entity)> = players.iter().map(|(entity, player, ..)| (player.id, entity)).collect();
    if roster.len() != 2 {
        return;
    }
    roster.sort_by_key(|(id, _)| *id);
    let (first, second) = (roster[0].1, roster[1].1);

    let mut released: Vec<Entity> = Vec::new();

    // Pass 1: parry.
    if let (Some(a), Some(b)) = (body_of(&players, first), body_of(&players, second)) {
        if a.stance == b.stance {
            if let (Some((_, blade_a)), Some((_, blade_b))) = (held_blade(&swords, a.entity), held_blade(&swords, b.entity)) {
                if blade_a.overlaps(&blade_b) {
                    let push = blade_a.horizontal_overlap(&blade_b) / 2.0 + 1.0;
                    let (left, right) = if a.bounds.center_x() <= b.bounds.center_x() { (a, b) } else { (b, a) };
                    shove(&mut players, left.entity, -push);
                    shove(&mut players, right.entity, push);
                    debug!("parry at {:?}, bodies pushed {push:.1} apart each", a.stance);
                    log.push(DuelEvent::Parry { stance_push: push });

                    for body in [a, b].into_iter().filter(|body| body.attacking) {
                        if let Ok((.., mut velocity, _, _, facing, attack)) = players.get_mut(body.entity) {
                            let facing = facing.copied().unwrap_or(body.facing);
                            disarm_player(attack.map(Mut::into_inner), &mut velocity, facing, &config);
                        }
                        if let Some((sword_entity, _)) = held_blade(&swords, body.entity) {
                            if let Ok((_, mut sword, _, _, mut velocity)) = swords.get_mut(sword_entity) {
                                launch_sword(&mut sword, &mut velocity, body.facing, &config);
                                released.push(sword_entity);
                            }
                        }
                        info!("{} disarmed by a parry", body.id);
                        log.push(DuelEvent::Disarm { player: body.id });
                    }
                }
            }
        }
    }

    let mut kills: Vec<PendingKill> = Vec::new();

    // Pass 2: held blades against the other body, attackers in id order.
    for (attacker_entity, defender_entity) in [(first, second), (second, first)] {
        let (Some(attacker), Some(defender)) = (body_of(&players, attacker_entity), body_of(&players, defender_entity))
        else {
            continue;
        };
        if is_dead(&kills, attacker.id) || is_dead(&kills, defender.id) {
            continue;
        }
        let Some((_, blade)) = held_blade(&swords, attacker.entity) else {
            continue;
        };
        if !blade.overlaps(&defender.bounds) {
            continue;
        }
        let defender_armed = held_blade(&swords, defender.entity).is_some();
        let kind = classify_hit(&blade, &defender.bounds, defender.facing, defender_armed);
        kills.push(PendingKill {
            killer: attacker,
            victim: defender,
            kind,
        });
    }

    // Pass 3: flying blades, skipping the ones knocked loose above.
    let flying: Vec<Aabb> = swords
        .iter()
        .filter(|(entity, sword, ..)| sword.state == SwordState::Flying && !released.contains(entity))
        .map(|(_, _, pos, collider, _)| Aabb::from_parts(pos, collider))
        .collect();
    for (victim_entity, killer_entity) in [(first, second), (second, first)] {
        let (Some(victim), Some(killer)) = (body_of(&players, victim_entity), body_of(&players, killer_entity)) else {
            continue;
        };
        if is_dead(&kills, victim.id) || is_dead(&kills, killer.id) {
            continue;
        }
        if flying.iter().any(|blade| blade.overlaps(&victim.bounds)) {
            kills.push(PendingKill {
                killer,
                victim,
                kind: KillKind::FlyingSword,
            });
        }
    }

    for kill in kills {
        let PendingKill { killer, victim, kind } = kill;
        if let Some((sword_entity, _)) = held_blade(&swords, victim.entity) {
            if let Ok((_, mut sword, _, _, mut velocity)) = swords.get_mut(sword_entity) {
                launch_sword(&mut sword, &mut velocity, victim.facing, &config);
            }
        }
        commands.entity(victim.entity).despawn();
        respawns.register(victim.id, config.respawn.delay, Some(killer.position), Some(killer.facing));
        stage.record_kill(killer.id);

        info!("{} killed {} ({kind:?})", killer.id, victim.id);
        log.push(DuelEvent::Kill {
            killer: killer.id,
            victim: victim.id,
            kind,
        });
    }
}

fn is_dead(kills: &[PendingKill], id: PlayerId) -> bool {
    kills.iter().any(|kill| kill.victim.id == id)
}

fn body_of(players: &Query<PlayerData, With<Player>>, entity: Entity) -> Option<Body> {
    let (entity, player, position, _, collider, stance, facing, attack) = players.get(entity).ok()?;
    Some(Body {
        entity,
        id: player.id,
        bounds: Aabb::from_parts(position, collider),
        position: *position,
        stance: stance.current,
        facing: facing.copied().unwrap_or_else(|| player.id.default_facing()),
        attacking: attack.is_some_and(Attack::is_active),
    })
}

/// The blade `owner` holds right now, with its box.
fn held_blade(swords: &Query<SwordData, Without<Player>>, owner: Entity) -> Option<(Entity, Aabb)> {
    swords
        .iter()
        .filter(|(_, sword, ..)| sword.is_held_by(owner))
        .map(|(entity, _, pos, collider, _)| (entity, Aabb::from_parts(pos, collider)))
        .min_by_key(|(entity, _)| *entity)
}

fn shove(players: &mut Query<PlayerData, With<Player>>, entity: Entity, dx: f32) {
    if let Ok((_, _, mut position, ..)) = players.get_mut(entity) {
        position.x += dx;
    }
}
