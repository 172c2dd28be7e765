//! Basic demonstration of the Stance Duel simulation.
//!
//! Two scripted duelists fight until one wins the match or a minute of
//! simulated time passes.
//!
//! Run with: RUST_LOG=info cargo run --example basic_demo

use duel_sim::{DuelEvent, Intent, PlayerId, SimWorld, Snapshot, SwordState};
use env_logger::{Builder, Env};

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u64 = 60 * 60;

fn main() {
    Builder::from_env(Env::default().default_filter_or("info")).init();

    println!("=== Stance Duel - Simulation Demo ===\n");
    let mut sim = SimWorld::new();

    for frame in 0..MAX_FRAMES {
        let snapshot = sim.snapshot();
        for id in PlayerId::ALL {
            sim.set_intent(id, scripted_intent(&snapshot, id, frame));
        }

        sim.step(FRAME_DT);

        for event in sim.last_events() {
            match event {
                DuelEvent::Kill { killer, victim, kind } => {
                    println!("[t={:5.2}s] {killer} kills {victim} ({kind:?})", sim.current_time());
                }
                DuelEvent::StageAdvanced { player, stage } => {
                    println!("[t={:5.2}s] {player} pushes the front to stage {stage}", sim.current_time());
                }
                _ => {}
            }
        }

        if let Some(winner) = sim.winner() {
            println!("\n{winner} wins after {:.1}s", sim.current_time());
            break;
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    match sim.snapshot().to_json_pretty() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("failed to serialize snapshot: {err}"),
    }
}

/// A crude bot: grab a sword if unarmed, run for the goal edge after a kill,
/// otherwise close in and thrust. Buttons are toggled so every press is a
/// fresh edge.
fn scripted_intent(snapshot: &Snapshot, id: PlayerId, frame: u64) -> Intent {
    let Some(me) = snapshot.player(id) else {
        return Intent::idle();
    };
    let tap = frame % 2 == 0;
    let toward = |target_x: f32| if target_x > me.x { 1 } else { -1 };

    if !me.armed {
        let nearest = snapshot
            .swords
            .iter()
            .filter(|s| s.state == SwordState::Grounded)
            .min_by(|a, b| (a.x - me.x).abs().total_cmp(&(b.x - me.x).abs()));
        return match nearest {
            Some(sword) if (sword.x - me.x).abs() < 40.0 => Intent {
                pickup: tap,
                ..Intent::idle()
            },
            Some(sword) => Intent::moving(toward(sword.x)),
            None => Intent::idle(),
        };
    }

    let Some(other) = snapshot.player(id.other()) else {
        return match snapshot.stage.last_kill_by {
            Some(killer) if killer == id => Intent::moving(id.advance_direction() as i8),
            _ => Intent::idle(),
        };
    };

    let gap = (other.x - me.x).abs();
    Intent {
        move_axis: if gap > 130.0 { toward(other.x) } else { 0 },
        attack: gap <= 160.0 && tap,
        stance_up: frame % 90 == 0 && id == PlayerId::One,
        stance_down: frame % 75 == 0 && id == PlayerId::Two,
        ..Intent::idle()
    }
}
