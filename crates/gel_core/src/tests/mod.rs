use super::*;
use crate::test_fixtures::{base_content, base_state, task_id, HUNT_TASK};

mod game;
mod regen;

// --- Shared test helpers ------------------------------------------------

const EPS: f32 = 1e-4;

fn assert_sill(state: &GameState, expected: f32) {
    assert!(
        (state.resources.sill - expected).abs() < EPS,
        "sill was {}, expected {expected}",
        state.resources.sill
    );
}

/// Tick without regeneration so resource assertions stay exact.
fn run_ticks(state: &mut GameState, content: &GameContent, n: u64) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    for _ in 0..n {
        events.extend(tick(state, &[], content, 0.0, EventLevel::Normal));
    }
    events
}

fn start(state: &mut GameState, content: &GameContent, id: &str) -> Result<(), Rejection> {
    let mut events = Vec::new();
    crate::tasks::start_task(state, content, &task_id(id), &mut events)
}

fn command(state: &GameState, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId("cmd_000001".to_string()),
        issued_tick: state.meta.tick,
        execute_at_tick: state.meta.tick,
        command,
    }
}

fn count_events(events: &[EventEnvelope], pred: impl Fn(&Event) -> bool) -> usize {
    events.iter().filter(|e| pred(&e.event)).count()
}

/// Run one monster hunt to completion, topping sill up first.
fn complete_hunt(state: &mut GameState, content: &GameContent) -> Vec<EventEnvelope> {
    state.resources.sill = content.constants.sill_cap;
    start(state, content, HUNT_TASK).expect("hunt should start");
    let duration = content.task(&task_id(HUNT_TASK)).unwrap().duration_ticks;
    run_ticks(state, content, duration)
}
