use serde::{Deserialize, Serialize};

use crate::progression::{compute_level, LevelInfo};
use crate::{BossStatus, GameContent, GameState, StatSet, TaskId};

/// Read-only projection handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub sill: f32,
    pub sill_cap: f32,
    pub gel: u32,
    pub traits: Vec<String>,
    pub stats: StatSet,
    pub active_task: Option<ActiveTaskView>,
    pub chapters_completed: Vec<u32>,
    /// True once the boss gate chapter is complete.
    pub boss_unlocked: bool,
    pub boss_engaged: bool,
    pub boss_defeated: bool,
    pub loop_count: u32,
    pub monsters_defeated: u32,
    pub level: LevelInfo,
    pub title_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTaskView {
    pub task_id: TaskId,
    pub name: String,
    pub remaining: u64,
    pub duration_ticks: u64,
}

pub fn snapshot(state: &GameState, content: &GameContent) -> Snapshot {
    let active_task = state.runner.active().map(|run| {
        let def = content.task(&run.task_id);
        ActiveTaskView {
            task_id: run.task_id.clone(),
            name: def.map_or_else(|| run.task_id.0.clone(), |d| d.name.clone()),
            remaining: run.remaining,
            duration_ticks: def.map_or(run.remaining, |d| d.duration_ticks),
        }
    });

    Snapshot {
        tick: state.meta.tick,
        sill: state.resources.sill,
        sill_cap: content.constants.sill_cap,
        gel: state.resources.gel,
        traits: state.resources.traits.iter().cloned().collect(),
        stats: state.stats.clone(),
        active_task,
        chapters_completed: state.milestones.chapters_completed.iter().copied().collect(),
        boss_unlocked: state.chapter_complete(content.boss.gate_chapter),
        boss_engaged: matches!(state.milestones.boss, BossStatus::Engaged { .. }),
        boss_defeated: state.milestones.boss.is_defeated(),
        loop_count: state.story.loop_count,
        monsters_defeated: state.progression.monsters_defeated,
        level: compute_level(&state.stats, &content.level_tiers),
        title_tokens: state.progression.title_tokens.clone(),
    }
}
