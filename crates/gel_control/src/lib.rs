use gel_core::{
    check_boss_requirements, BossRequirement, Command, CommandEnvelope, CommandId, GameContent,
    GameState, Rejection, Stat, TaskDef, TaskReward,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Plays the game automatically:
/// 1. Advance the story loop as stats grow; complete the gate chapter once the loop reaches it.
/// 2. Attempt the boss as soon as its requirements hold.
/// 3. Wait for sill when only sill stands between us and the boss.
/// 4. Hunt monsters while gel is short; otherwise train the weakest stat.
pub struct AutopilotController;

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(tick: u64, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let cmd_id = CommandId::nth(*next_id);
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

fn story_commands(state: &GameState, content: &GameContent) -> Vec<Command> {
    let gate = content.boss.gate_chapter;
    let loop_count = state.story.loop_count;
    let per_loop = content.constants.autopilot_stats_per_loop;
    let mut commands = Vec::new();

    if loop_count < gate && state.stats.total() >= (loop_count + 1).saturating_mul(per_loop) {
        commands.push(Command::NextLoop);
    }
    if loop_count >= gate && !state.chapter_complete(gate) {
        commands.push(Command::CompleteChapter { chapter: gate });
    }
    commands
}

fn gel_short(state: &GameState, content: &GameContent) -> bool {
    match &content.boss.requirement {
        BossRequirement::Resources { gel, .. } => state.resources.gel < *gel,
        BossRequirement::Stats { .. } => false,
    }
}

fn trains(task: &TaskDef, stat: Stat) -> bool {
    match &task.reward {
        TaskReward::Training { gains } => gains.iter().any(|g| g.stat == stat),
        TaskReward::Monster { stat: s, .. } => *s == stat,
    }
}

/// Best affordable hunt by gel reward; `None` means wait for sill.
fn pick_hunt<'a>(state: &GameState, content: &'a GameContent) -> Option<&'a TaskDef> {
    content
        .tasks
        .iter()
        .filter(|t| t.cost <= state.resources.sill)
        .filter_map(|t| match t.reward {
            TaskReward::Monster { gel, .. } => Some((t, gel)),
            TaskReward::Training { .. } => None,
        })
        .max_by_key(|(_, gel)| *gel)
        .map(|(t, _)| t)
}

/// Cheapest affordable task that raises `stat`; `None` means wait for sill.
fn pick_training<'a>(
    state: &GameState,
    content: &'a GameContent,
    stat: Stat,
) -> Option<&'a TaskDef> {
    let cheapest = content
        .tasks
        .iter()
        .filter(|t| trains(t, stat))
        .min_by(|a, b| a.cost.total_cmp(&b.cost))?;
    (cheapest.cost <= state.resources.sill).then_some(cheapest)
}

/// Lowest stat that some task can raise, ties broken by `Stat::ALL` order.
fn weakest_stat(state: &GameState, content: &GameContent) -> Option<Stat> {
    Stat::ALL
        .into_iter()
        .filter(|stat| content.tasks.iter().any(|t| trains(t, *stat)))
        .min_by_key(|stat| state.stats.get(*stat))
}

fn next_task<'a>(
    state: &GameState,
    content: &'a GameContent,
    boss_check: &Result<(), Rejection>,
) -> Option<&'a TaskDef> {
    match boss_check {
        Err(Rejection::InsufficientSill { .. }) => None,
        Err(Rejection::InsufficientGel { .. }) => pick_hunt(state, content),
        Err(Rejection::StatTooLow { stat, .. }) => pick_training(state, content, *stat),
        Err(Rejection::ChapterLocked { .. }) if gel_short(state, content) => {
            pick_hunt(state, content)
        }
        _ => pick_training(state, content, weakest_stat(state, content)?),
    }
}

// ---------------------------------------------------------------------------
// CommandSource impl
// ---------------------------------------------------------------------------

impl CommandSource for AutopilotController {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let tick = state.meta.tick;
        let mut commands: Vec<CommandEnvelope> = story_commands(state, content)
            .into_iter()
            .map(|command| make_cmd(tick, next_command_id, command))
            .collect();

        let boss_check = check_boss_requirements(state, content);
        if boss_check.is_ok() {
            commands.push(make_cmd(tick, next_command_id, Command::AttemptBoss));
            return commands;
        }

        if state.runner.is_idle() {
            if let Some(task) = next_task(state, content, &boss_check) {
                commands.push(make_cmd(
                    tick,
                    next_command_id,
                    Command::StartTask {
                        task_id: task.id.clone(),
                    },
                ));
            }
        }
        commands
    }
}
