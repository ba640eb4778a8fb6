use crate::progression::{increase_stat, refresh_title};
use crate::resources::{credit_gel, unlock_trait};
use crate::{
    ActiveTaskRun, Event, EventEnvelope, GameContent, GameState, GelSource, Rejection, TaskDef,
    TaskId, TaskReward, TaskRunner,
};

impl GameContent {
    pub fn task(&self, task_id: &TaskId) -> Option<&TaskDef> {
        self.tasks.iter().find(|task| task.id == *task_id)
    }
}

impl TaskRunner {
    pub fn is_idle(&self) -> bool {
        matches!(self, TaskRunner::Idle)
    }

    pub fn active(&self) -> Option<&ActiveTaskRun> {
        match self {
            TaskRunner::Idle => None,
            TaskRunner::Running(run) => Some(run),
        }
    }
}

/// `Idle -> Running`. Deducts the task's sill cost.
pub(crate) fn start_task(
    state: &mut GameState,
    content: &GameContent,
    task_id: &TaskId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    let task = content.task(task_id).ok_or_else(|| Rejection::UnknownTask {
        task_id: task_id.clone(),
    })?;
    if let TaskRunner::Running(run) = &state.runner {
        return Err(Rejection::TaskAlreadyRunning {
            active: run.task_id.clone(),
        });
    }
    state.resources.spend_sill(task.cost)?;

    let current_tick = state.meta.tick;
    state.runner = TaskRunner::Running(ActiveTaskRun {
        task_id: task.id.clone(),
        remaining: task.duration_ticks,
        started_tick: current_tick,
    });

    events.push(crate::emit(
        &mut state.counters,
        current_tick,
        Event::TaskStarted {
            task_id: task.id.clone(),
            name: task.name.clone(),
            cost: task.cost,
            duration_ticks: task.duration_ticks,
        },
    ));
    Ok(())
}

/// Count the active run down by one tick and resolve it when it hits zero.
pub(crate) fn advance_task_runner(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let TaskRunner::Running(run) = &mut state.runner else {
        return;
    };
    run.remaining = run.remaining.saturating_sub(1);
    if run.remaining > 0 {
        return;
    }
    let task_id = run.task_id.clone();
    state.runner = TaskRunner::Idle;

    // A saved state can outlive a task removed from content; drop the run.
    let Some(task) = content.task(&task_id) else {
        return;
    };

    apply_reward(state, content, task, events);

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::TaskCompleted {
            task_id,
            name: task.name.clone(),
        },
    ));

    refresh_title(state, content, events);
}

fn apply_reward(
    state: &mut GameState,
    content: &GameContent,
    task: &TaskDef,
    events: &mut Vec<EventEnvelope>,
) {
    match &task.reward {
        TaskReward::Training { gains } => {
            for gain in gains {
                increase_stat(state, content, gain.stat, gain.amount, events);
            }
        }
        TaskReward::Monster { stat, gel } => {
            increase_stat(state, content, *stat, 1, events);
            credit_gel(state, *gel, GelSource::Monster, events);
            record_monster_kill(state, content, &task.id, events);
        }
    }
}

fn record_monster_kill(
    state: &mut GameState,
    content: &GameContent,
    task_id: &TaskId,
    events: &mut Vec<EventEnvelope>,
) {
    let progression = &mut state.progression;
    progression.monsters_defeated = progression.monsters_defeated.saturating_add(1);
    let total_defeated = progression.monsters_defeated;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::MonsterDefeated {
            task_id: task_id.clone(),
            total_defeated,
        },
    ));

    let c = &content.constants;
    if total_defeated >= c.monster_trait_threshold {
        unlock_trait(state, &c.monster_trait, events);
    }
}
