//! Type definitions for `gel_core`.
//!
//! All public state, content, command, and event types used by the game loop.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use crate::Rejection;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(TaskId);
string_id!(CommandId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    Strength,
    Defense,
    Endurance,
    Focus,
    Attack,
}

impl Stat {
    pub const ALL: [Stat; 5] = [
        Stat::Strength,
        Stat::Defense,
        Stat::Endurance,
        Stat::Focus,
        Stat::Attack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stat::Strength => "Strength",
            Stat::Defense => "Defense",
            Stat::Endurance => "Endurance",
            Stat::Focus => "Focus",
            Stat::Attack => "Attack",
        }
    }
}

impl std::fmt::Display for Stat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GelSource {
    Monster,
    Passive,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub resources: ResourceState,
    pub stats: StatSet,
    pub runner: TaskRunner,
    pub milestones: MilestoneState,
    pub story: StoryState,
    pub progression: ProgressionState,
    pub counters: Counters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    pub seed: u64,
    pub session_id: Uuid,
    pub schema_version: u32,
    pub content_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Always within `[0, constants.sill_cap]`.
    pub sill: f32,
    pub gel: u32,
    /// Append-only.
    pub traits: BTreeSet<String>,
}

/// Stat accumulators. Only task rewards write here, and only upward.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatSet(pub(crate) BTreeMap<Stat, u32>);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum TaskRunner {
    #[default]
    Idle,
    Running(ActiveTaskRun),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTaskRun {
    pub task_id: TaskId,
    /// Ticks left before the reward is applied.
    pub remaining: u64,
    pub started_tick: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneState {
    pub chapters_completed: BTreeSet<u32>,
    pub boss: BossStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossStatus {
    #[default]
    Undefeated,
    /// Attempt accepted, resolution pending.
    Engaged { remaining: u64 },
    Defeated { tick: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryState {
    pub loop_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub monsters_defeated: u32,
    /// Last title announced via `Event::TitleEarned`.
    pub title: String,
    /// One "<title> Token" per title change, in award order.
    #[serde(default)]
    pub title_tokens: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_tick: u64,
    pub execute_at_tick: u64,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    StartTask { task_id: TaskId },
    CompleteChapter { chapter: u32 },
    AttemptBoss,
    NextLoop,
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    TaskStarted {
        task_id: TaskId,
        name: String,
        cost: f32,
        duration_ticks: u64,
    },
    TaskCompleted {
        task_id: TaskId,
        name: String,
    },
    StatIncreased {
        stat: Stat,
        amount: u32,
        total: u32,
    },
    GelGained {
        amount: u32,
        total: u32,
        source: GelSource,
    },
    MonsterDefeated {
        task_id: TaskId,
        total_defeated: u32,
    },
    TraitUnlocked {
        name: String,
    },
    /// Only emitted at `EventLevel::Debug`.
    SillRegenerated {
        amount: f32,
        sill: f32,
    },
    ChapterCompleted {
        chapter: u32,
    },
    ChapterAlreadyCompleted {
        chapter: u32,
    },
    BossEngaged {
        boss: String,
        resolves_in_ticks: u64,
    },
    BossDefeated {
        boss: String,
    },
    LoopAdvanced {
        loop_count: u32,
    },
    TitleEarned {
        title: String,
        total_stats: u32,
        token: String,
    },
    CommandRejected {
        command_id: CommandId,
        reason: Rejection,
    },
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub tasks: Vec<TaskDef>,
    pub boss: BossDef,
    /// Sorted ascending by `min_total`; the first tier must start at 0.
    pub level_tiers: Vec<LevelTier>,
    pub constants: Constants,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDef {
    pub id: TaskId,
    pub name: String,
    /// Sill deducted on start.
    pub cost: f32,
    pub duration_ticks: u64,
    pub reward: TaskReward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskReward {
    Training { gains: SmallVec<[StatGain; 2]> },
    /// +1 to `stat`, `gel` added to the pool, counts toward the monster trait.
    Monster { stat: Stat, gel: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatGain {
    pub stat: Stat,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub name: String,
    /// Chapter whose completion unlocks the encounter.
    pub gate_chapter: u32,
    pub requirement: BossRequirement,
    pub sill_cost: f32,
    pub resolution_ticks: u64,
    pub reward_trait: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BossRequirement {
    Resources { sill: f32, gel: u32 },
    Stats { minimums: BTreeMap<Stat, u32> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTier {
    pub min_total: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constants {
    pub sill_cap: f32,
    pub sill_start: f32,
    pub sill_regen_per_sec: f32,
    /// Ceiling for every individual stat.
    pub stat_cap: u32,
    /// Nominal seconds per tick for fixed-rate drivers.
    pub tick_secs: f32,
    pub monster_trait_threshold: u32,
    pub monster_trait: String,
    /// 0 disables passive gel.
    pub passive_gel_interval_ticks: u64,
    pub passive_gel_focus_threshold: u32,
    pub passive_gel_amount: u32,
    pub autopilot_stats_per_loop: u32,
}
