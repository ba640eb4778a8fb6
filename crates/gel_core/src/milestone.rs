//! Chapter gate, boss encounter, and the narrative loop counter.

use crate::resources::unlock_trait;
use crate::{
    BossRequirement, BossStatus, Event, EventEnvelope, GameContent, GameState, Rejection,
};

impl BossStatus {
    pub fn is_defeated(self) -> bool {
        matches!(self, BossStatus::Defeated { .. })
    }
}

impl GameState {
    pub fn chapter_complete(&self, chapter: u32) -> bool {
        self.milestones.chapters_completed.contains(&chapter)
    }
}

/// Mark a chapter complete. Repeats change nothing and only emit a notice.
pub(crate) fn complete_chapter(
    state: &mut GameState,
    chapter: u32,
    events: &mut Vec<EventEnvelope>,
) {
    let event = if state.milestones.chapters_completed.insert(chapter) {
        Event::ChapterCompleted { chapter }
    } else {
        Event::ChapterAlreadyCompleted { chapter }
    };
    events.push(crate::emit(&mut state.counters, state.meta.tick, event));
}

/// Check whether `attempt_boss` would be accepted right now.
pub fn check_boss_requirements(state: &GameState, content: &GameContent) -> Result<(), Rejection> {
    let boss = &content.boss;
    match state.milestones.boss {
        BossStatus::Defeated { .. } => return Err(Rejection::BossAlreadyDefeated),
        BossStatus::Engaged { .. } => return Err(Rejection::BossEngaged),
        BossStatus::Undefeated => {}
    }
    if !state.chapter_complete(boss.gate_chapter) {
        return Err(Rejection::ChapterLocked {
            chapter: boss.gate_chapter,
        });
    }

    match &boss.requirement {
        BossRequirement::Resources { sill, gel } => {
            let resources = &state.resources;
            if resources.sill < *sill {
                return Err(Rejection::InsufficientSill {
                    required: *sill,
                    available: resources.sill,
                });
            }
            if resources.gel < *gel {
                return Err(Rejection::InsufficientGel {
                    required: *gel,
                    available: resources.gel,
                });
            }
        }
        BossRequirement::Stats { minimums } => {
            for (&stat, &required) in minimums {
                let current = state.stats.get(stat);
                if current < required {
                    return Err(Rejection::StatTooLow {
                        stat,
                        required,
                        current,
                    });
                }
            }
        }
    }

    if state.resources.sill < boss.sill_cost {
        return Err(Rejection::InsufficientSill {
            required: boss.sill_cost,
            available: state.resources.sill,
        });
    }
    Ok(())
}

/// Pay the sill cost and engage the boss; resolution lands `resolution_ticks` later.
pub(crate) fn attempt_boss(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    check_boss_requirements(state, content)?;
    let boss = &content.boss;
    state.resources.spend_sill(boss.sill_cost)?;
    state.milestones.boss = BossStatus::Engaged {
        remaining: boss.resolution_ticks,
    };
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::BossEngaged {
            boss: boss.name.clone(),
            resolves_in_ticks: boss.resolution_ticks,
        },
    ));
    Ok(())
}

pub(crate) fn advance_boss(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let BossStatus::Engaged { remaining } = &mut state.milestones.boss else {
        return;
    };
    *remaining = remaining.saturating_sub(1);
    if *remaining > 0 {
        return;
    }

    let current_tick = state.meta.tick;
    state.milestones.boss = BossStatus::Defeated { tick: current_tick };
    events.push(crate::emit(
        &mut state.counters,
        current_tick,
        Event::BossDefeated {
            boss: content.boss.name.clone(),
        },
    ));
    unlock_trait(state, &content.boss.reward_trait, events);
}

pub(crate) fn advance_loop(state: &mut GameState, events: &mut Vec<EventEnvelope>) {
    state.story.loop_count = state.story.loop_count.saturating_add(1);
    let loop_count = state.story.loop_count;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::LoopAdvanced { loop_count },
    ));
}
