use crate::state::{SharedSim, SimState};
use gel_control::CommandSource;
use gel_core::{Event, EventEnvelope};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Drive the game in real time.
///
/// Each tick regenerates sill for the wall-clock seconds since the previous
/// tick. With `ticks_per_sec <= 0` the loop runs flat out and every tick
/// counts as the content's nominal `tick_secs`. Paused time does not count.
pub async fn run_tick_loop(
    sim: SharedSim,
    paused: Arc<AtomicBool>,
    ticks_per_sec: f64,
    max_ticks: Option<u64>,
) {
    let mut interval = if ticks_per_sec > 0.0 {
        let mut iv = tokio::time::interval(Duration::from_secs_f64(1.0 / ticks_per_sec));
        iv.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Burst);
        Some(iv)
    } else {
        None
    };
    let mut last = Instant::now();

    loop {
        let is_paused = paused.load(Ordering::Relaxed);
        if is_paused {
            last = Instant::now();
        } else {
            let now = Instant::now();
            let wall_secs = now.duration_since(last).as_secs_f32();
            last = now;

            let done = {
                let mut guard = sim.lock();
                let SimState {
                    game,
                    autopilot,
                    next_command_id,
                } = &mut *guard;
                let elapsed_secs = if interval.is_some() {
                    wall_secs
                } else {
                    game.content().constants.tick_secs
                };
                let commands = match autopilot {
                    Some(pilot) => {
                        pilot.generate_commands(game.state(), game.content(), next_command_id)
                    }
                    None => Vec::new(),
                };
                let events = game.tick(&commands, elapsed_secs);
                log_notable(&events);
                max_ticks.is_some_and(|max| game.state().meta.tick >= max)
            };

            if done {
                tracing::info!("reached max ticks, stopping tick loop");
                break;
            }
        }

        if let Some(ref mut iv) = interval {
            iv.tick().await;
        } else if is_paused {
            tokio::time::sleep(Duration::from_millis(50)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

fn log_notable(events: &[EventEnvelope]) {
    for envelope in events {
        match &envelope.event {
            Event::BossDefeated { boss } => {
                tracing::info!(tick = envelope.tick, %boss, "boss defeated");
            }
            Event::TraitUnlocked { name } => {
                tracing::info!(tick = envelope.tick, %name, "trait unlocked");
            }
            Event::CommandRejected { command_id, reason } => {
                tracing::warn!(tick = envelope.tick, %command_id, %reason, "command rejected");
            }
            _ => {}
        }
    }
}
