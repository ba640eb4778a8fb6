//! Shared test fixtures for `gel_core` and downstream crates.
//!
//! `base_content()` mirrors the shipped catalog with short durations so tests
//! reach milestones in a few dozen ticks.

use crate::{
    BossDef, BossRequirement, Constants, Counters, GameContent, GameState, LevelTier, MetaState,
    MilestoneState, ProgressionState, ResourceState, Stat, StatGain, StatSet, StoryState, TaskDef,
    TaskId, TaskReward, TaskRunner,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::smallvec;

pub const HUNT_TASK: &str = "hunt_gel_crawler";

pub fn task_id(id: &str) -> TaskId {
    TaskId(id.to_string())
}

fn training(id: &str, name: &str, stat: Stat) -> TaskDef {
    TaskDef {
        id: task_id(id),
        name: name.to_string(),
        cost: 5.0,
        duration_ticks: 3,
        reward: TaskReward::Training {
            gains: smallvec![StatGain { stat, amount: 1 }],
        },
    }
}

/// Five training tasks (cost 5, 3 ticks, +1 stat), one monster hunt
/// (cost 10, 5 ticks, +1 Attack, 5 gel), resource-gated boss behind chapter 7.
pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        tasks: vec![
            training("train_cart", "Haul Ore Carts", Stat::Strength),
            training("train_tunnel", "Shore the Tunnel", Stat::Defense),
            training("train_shift", "Work a Double Shift", Stat::Endurance),
            training("train_focus", "Gel Meditation", Stat::Focus),
            training("train_rock", "Break Rock", Stat::Attack),
            TaskDef {
                id: task_id(HUNT_TASK),
                name: "Hunt a Gel Crawler".to_string(),
                cost: 10.0,
                duration_ticks: 5,
                reward: TaskReward::Monster {
                    stat: Stat::Attack,
                    gel: 5,
                },
            },
        ],
        boss: BossDef {
            name: "Valking Captain".to_string(),
            gate_chapter: 7,
            requirement: BossRequirement::Resources {
                sill: 30.0,
                gel: 50,
            },
            sill_cost: 30.0,
            resolution_ticks: 2,
            reward_trait: "Captain's Bane".to_string(),
        },
        level_tiers: vec![
            LevelTier {
                min_total: 0,
                title: "Novice of the Gel".to_string(),
            },
            LevelTier {
                min_total: 20,
                title: "Initiate".to_string(),
            },
            LevelTier {
                min_total: 40,
                title: "Wayfarer".to_string(),
            },
        ],
        constants: Constants {
            sill_cap: 100.0,
            sill_start: 100.0,
            sill_regen_per_sec: 0.5,
            stat_cap: 50,
            tick_secs: 1.0,
            monster_trait_threshold: 10,
            monster_trait: "Iron Pulse".to_string(),
            // Disabled by default so resource assertions stay exact.
            passive_gel_interval_ticks: 0,
            passive_gel_focus_threshold: 5,
            passive_gel_amount: 1,
            autopilot_stats_per_loop: 3,
        },
    }
}

pub fn base_state(content: &GameContent) -> GameState {
    GameState {
        meta: MetaState {
            tick: 0,
            seed: 42,
            session_id: uuid::Uuid::nil(),
            schema_version: 1,
            content_version: content.content_version.clone(),
        },
        resources: ResourceState::new(content.constants.sill_start),
        stats: StatSet::default(),
        runner: TaskRunner::Idle,
        milestones: MilestoneState::default(),
        story: StoryState::default(),
        progression: ProgressionState {
            monsters_defeated: 0,
            title: content
                .level_tiers
                .first()
                .map(|t| t.title.clone())
                .unwrap_or_default(),
            title_tokens: Vec::new(),
        },
        counters: Counters::default(),
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
