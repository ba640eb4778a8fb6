use serde::{Deserialize, Serialize};

use crate::resources::credit_gel;
use crate::{Event, EventEnvelope, GameContent, GameState, GelSource, LevelTier, Stat, StatSet};

impl StatSet {
    pub fn get(&self, stat: Stat) -> u32 {
        self.0.get(&stat).copied().unwrap_or(0)
    }

    /// Returns the new value.
    pub fn add(&mut self, stat: Stat, amount: u32) -> u32 {
        let value = self.0.entry(stat).or_insert(0);
        *value = value.saturating_add(amount);
        *value
    }

    pub fn total(&self) -> u32 {
        self.0.values().fold(0u32, |acc, v| acc.saturating_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, u32)> + '_ {
        self.0.iter().map(|(stat, value)| (*stat, *value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub total: u32,
    pub title: String,
    /// `min_total` of the reached tier.
    pub floor: u32,
    /// `min_total` of the next tier, `None` at the top.
    pub next_cap: Option<u32>,
}

/// Map total stat points onto the tier ladder.
pub fn compute_level(stats: &StatSet, tiers: &[LevelTier]) -> LevelInfo {
    let total = stats.total();
    let mut level = LevelInfo {
        total,
        title: tiers.first().map(|t| t.title.clone()).unwrap_or_default(),
        floor: 0,
        next_cap: None,
    };
    for tier in tiers {
        if total >= tier.min_total {
            level.floor = tier.min_total;
            level.title.clone_from(&tier.title);
        } else {
            level.next_cap = Some(tier.min_total);
            break;
        }
    }
    level
}

/// Raise `stat` by `amount`, clamped to `stat_cap`. Emits only what actually landed.
pub(crate) fn increase_stat(
    state: &mut GameState,
    content: &GameContent,
    stat: Stat,
    amount: u32,
    events: &mut Vec<EventEnvelope>,
) {
    let headroom = content
        .constants
        .stat_cap
        .saturating_sub(state.stats.get(stat));
    let amount = amount.min(headroom);
    if amount == 0 {
        return;
    }
    let total = state.stats.add(stat, amount);
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::StatIncreased {
            stat,
            amount,
            total,
        },
    ));
}

/// Announce a new title once the stat total crosses into a new tier and award its token.
pub(crate) fn refresh_title(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let level = compute_level(&state.stats, &content.level_tiers);
    if level.title == state.progression.title {
        return;
    }
    let token = format!("{} Token", level.title);
    state.progression.title.clone_from(&level.title);
    state.progression.title_tokens.push(token.clone());
    events.push(crate::emit(
        &mut state.counters,
        state.meta.tick,
        Event::TitleEarned {
            title: level.title,
            total_stats: level.total,
            token,
        },
    ));
}

/// Every `passive_gel_interval_ticks`, trickle gel in once Focus is trained enough.
pub(crate) fn accrue_passive_gel(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let c = &content.constants;
    if c.passive_gel_interval_ticks == 0 {
        return;
    }
    let ticks_elapsed = state.meta.tick + 1;
    if ticks_elapsed % c.passive_gel_interval_ticks != 0 {
        return;
    }
    if state.stats.get(Stat::Focus) < c.passive_gel_focus_threshold {
        return;
    }
    credit_gel(state, c.passive_gel_amount, GelSource::Passive, events);
}
