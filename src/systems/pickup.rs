//! Pickup system - unarmed players reclaim grounded swords.

use crate::components::*;
use crate::config::DuelConfig;
use crate::events::{DuelEvent, StepLog};
use crate::geometry::Aabb;
use bevy_ecs::prelude::*;
use log::info;

/// An unarmed player pressing pickup grabs the nearest grounded sword whose
/// box touches their own box grown by `pickup_range`.
///
/// Players are served in id order, so when both reach for the same blade on
/// the same step player 1 gets it. Candidates at exactly equal distance go to
/// the lowest entity.
pub fn pickup_system(
    config: Res<DuelConfig>,
    mut log: ResMut<StepLog>,
    players: Query<(Entity, &Player, &Position, &Collider, &Input), With<Player>>,
    mut swords: Query<(Entity, &mut Sword, &Position, &Collider, &mut Velocity), Without<Player>>,
) {
    let mut reaching: Vec<(PlayerId, Entity, Aabb)> = players
        .iter()
        .filter(|(_, _, _, _, input)| input.pickup_pressed)
        .map(|(entity, player, pos, collider, _)| (player.id, entity, Aabb::from_parts(pos, collider)))
        .collect();
    reaching.sort_by_key(|(id, _, _)| *id);

    for (id, entity, body) in reaching {
        if swords.iter().any(|(_, sword, ..)| sword.is_held_by(entity)) {
            continue;
        }

        let reach = body.expanded(config.sword.pickup_range);
        let mut candidates: Vec<(Entity, f32)> = swords
            .iter()
            .filter(|(_, sword, ..)| sword.state == SwordState::Grounded)
            .filter_map(|(sword_entity, _, pos, collider, _)| {
                let blade = Aabb::from_parts(pos, collider);
                reach
                    .overlaps(&blade)
                    .then(|| (sword_entity, body.center_distance(&blade)))
            })
            .collect();
        candidates.sort_by_key(|(sword_entity, _)| *sword_entity);

        let mut nearest: Option<(Entity, f32)> = None;
        for (sword_entity, distance) in candidates {
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((sword_entity, distance));
            }
        }

        let Some((chosen, _)) = nearest else {
            continue;
        };
        if let Ok((_, mut sword, _, _, mut velocity)) = swords.get_mut(chosen) {
            sword.claim(entity);
            velocity.zero();
            info!("{id} picked up the {} sword", sword.origin);
            log.push(DuelEvent::Pickup {
                player: id,
                origin: sword.origin,
            });
        }
    }
}
