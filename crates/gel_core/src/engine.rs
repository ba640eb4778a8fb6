use crate::milestone::{advance_boss, advance_loop, attempt_boss, complete_chapter};
use crate::progression::accrue_passive_gel;
use crate::resources::regenerate_sill;
use crate::tasks::{advance_task_runner, start_task};
use crate::{
    Command, CommandEnvelope, Event, EventEnvelope, EventLevel, GameContent, GameState, Rejection,
};

/// Advance the game by one tick.
///
/// Order of operations:
/// 1. Regenerate sill from `elapsed_secs` of wall-clock time.
/// 2. Count the active task down; resolve it if it hits zero.
/// 3. Count a pending boss fight down; resolve it if it hits zero.
/// 4. Passive gel accrual.
/// 5. Apply commands scheduled for this tick.
/// 6. Increment tick counter.
///
/// Commands land after the countdowns, so a task started on tick N first
/// counts down on tick N+1 and a duration-`d` task completes `d` ticks later.
///
/// Returns all events produced this tick.
pub fn tick(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    elapsed_secs: f32,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();

    regenerate_sill(state, content, elapsed_secs, event_level, &mut events);
    advance_task_runner(state, content, &mut events);
    advance_boss(state, content, &mut events);
    accrue_passive_gel(state, content, &mut events);
    apply_commands(state, commands, content, &mut events);

    state.meta.tick += 1;
    events
}

fn apply_commands(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;

    for envelope in commands {
        if envelope.execute_at_tick != current_tick {
            continue;
        }
        if let Err(reason) = apply_command(state, &envelope.command, content, events) {
            events.push(crate::emit(
                &mut state.counters,
                current_tick,
                Event::CommandRejected {
                    command_id: envelope.id.clone(),
                    reason,
                },
            ));
        }
    }
}

pub(crate) fn apply_command(
    state: &mut GameState,
    command: &Command,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    match command {
        Command::StartTask { task_id } => start_task(state, content, task_id, events),
        Command::AttemptBoss => attempt_boss(state, content, events),
        Command::CompleteChapter { chapter } => {
            complete_chapter(state, *chapter, events);
            Ok(())
        }
        Command::NextLoop => {
            advance_loop(state, events);
            Ok(())
        }
    }
}
