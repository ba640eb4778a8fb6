//! Content loading, validation and initial state, shared between gel_cli and gel_daemon.

use anyhow::{ensure, Context, Result};
use gel_core::{
    BossDef, BossRequirement, Constants, Counters, GameContent, GameState, LevelTier, MetaState,
    MilestoneState, ProgressionState, ResourceState, StatSet, StoryState, TaskDef, TaskReward,
    TaskRunner,
};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Deserialize)]
struct TasksFile {
    content_version: String,
    tasks: Vec<TaskDef>,
}

#[derive(Deserialize)]
struct LevelTiersFile {
    tiers: Vec<LevelTier>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let raw = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {file}"))
}

/// Validates loaded content, naming the offending entry on the first authoring error.
///
/// Catches mistakes like: duplicate task ids, zero-length tasks, a task that
/// costs more sill than the pool can ever hold, or a tier ladder out of order.
pub fn validate_content(content: &GameContent) -> Result<()> {
    validate_constants(&content.constants)?;

    ensure!(!content.tasks.is_empty(), "task catalog is empty");
    let mut seen = HashSet::new();
    for task in &content.tasks {
        validate_task(task, &content.constants)?;
        ensure!(seen.insert(&task.id), "duplicate task id '{}'", task.id);
    }

    validate_boss(&content.boss, &content.constants)?;
    validate_tiers(&content.level_tiers)
}

fn validate_constants(c: &Constants) -> Result<()> {
    ensure!(
        c.sill_cap.is_finite() && c.sill_cap > 0.0,
        "sill_cap must be positive, got {}",
        c.sill_cap
    );
    ensure!(
        (0.0..=c.sill_cap).contains(&c.sill_start),
        "sill_start {} outside [0, {}]",
        c.sill_start,
        c.sill_cap
    );
    ensure!(
        c.sill_regen_per_sec.is_finite() && c.sill_regen_per_sec >= 0.0,
        "sill_regen_per_sec must be non-negative, got {}",
        c.sill_regen_per_sec
    );
    ensure!(
        c.tick_secs.is_finite() && c.tick_secs > 0.0,
        "tick_secs must be positive, got {}",
        c.tick_secs
    );
    ensure!(!c.monster_trait.is_empty(), "monster_trait is empty");
    ensure!(c.stat_cap > 0, "stat_cap must be positive");
    Ok(())
}

fn validate_task(task: &TaskDef, c: &Constants) -> Result<()> {
    ensure!(!task.id.0.is_empty(), "task with name '{}' has empty id", task.name);
    ensure!(
        task.duration_ticks >= 1,
        "task '{}' duration_ticks must be at least 1",
        task.id
    );
    ensure!(
        task.cost.is_finite() && task.cost >= 0.0,
        "task '{}' cost must be non-negative, got {}",
        task.id,
        task.cost
    );
    ensure!(
        task.cost <= c.sill_cap,
        "task '{}' cost {} exceeds sill_cap {}",
        task.id,
        task.cost,
        c.sill_cap
    );
    match &task.reward {
        TaskReward::Training { gains } => {
            ensure!(!gains.is_empty(), "training task '{}' grants nothing", task.id);
        }
        TaskReward::Monster { .. } => {}
    }
    Ok(())
}

fn validate_boss(boss: &BossDef, c: &Constants) -> Result<()> {
    ensure!(
        boss.resolution_ticks >= 1,
        "boss '{}' resolution_ticks must be at least 1",
        boss.name
    );
    ensure!(
        boss.sill_cost >= 0.0 && boss.sill_cost <= c.sill_cap,
        "boss '{}' sill_cost {} outside [0, {}]",
        boss.name,
        boss.sill_cost,
        c.sill_cap
    );
    match &boss.requirement {
        BossRequirement::Resources { sill, .. } => ensure!(
            *sill <= c.sill_cap,
            "boss '{}' sill requirement {} exceeds sill_cap {}",
            boss.name,
            sill,
            c.sill_cap
        ),
        BossRequirement::Stats { minimums } => {
            for (stat, minimum) in minimums {
                ensure!(
                    *minimum <= c.stat_cap,
                    "boss '{}' needs {stat} {minimum}, above stat_cap {}",
                    boss.name,
                    c.stat_cap
                );
            }
        }
    }
    ensure!(!boss.reward_trait.is_empty(), "boss '{}' has no reward trait", boss.name);
    Ok(())
}

fn validate_tiers(tiers: &[LevelTier]) -> Result<()> {
    let first = tiers.first().context("level tier ladder is empty")?;
    ensure!(
        first.min_total == 0,
        "first level tier '{}' must start at 0, got {}",
        first.title,
        first.min_total
    );
    for pair in tiers.windows(2) {
        ensure!(
            pair[0].min_total < pair[1].min_total,
            "level tier '{}' ({}) must come after '{}' ({})",
            pair[1].title,
            pair[1].min_total,
            pair[0].title,
            pair[0].min_total
        );
    }
    Ok(())
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let tasks_file: TasksFile = read_json(dir, "tasks.json")?;
    let boss: BossDef = read_json(dir, "boss.json")?;
    let tiers_file: LevelTiersFile = read_json(dir, "level_tiers.json")?;
    let content = GameContent {
        content_version: tasks_file.content_version,
        tasks: tasks_file.tasks,
        boss,
        level_tiers: tiers_file.tiers,
        constants,
    };
    validate_content(&content).with_context(|| format!("validating content in {content_dir}"))?;
    Ok(content)
}

pub fn build_initial_state(content: &GameContent, seed: u64, rng: &mut impl Rng) -> GameState {
    GameState {
        meta: MetaState {
            tick: 0,
            seed,
            session_id: gel_core::new_session_id(rng),
            schema_version: SCHEMA_VERSION,
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

/// Read a saved `GameState`, refusing files written for other content or schemas.
pub fn load_state(path: &Path, content: &GameContent) -> Result<GameState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file: {}", path.display()))?;
    let state: GameState = serde_json::from_str(&json)
        .with_context(|| format!("parsing state file: {}", path.display()))?;
    ensure!(
        state.meta.schema_version == SCHEMA_VERSION,
        "state file schema_version {} does not match {SCHEMA_VERSION}",
        state.meta.schema_version
    );
    ensure!(
        state.meta.content_version == content.content_version,
        "state file was saved with content '{}', loaded content is '{}'",
        state.meta.content_version,
        content.content_version
    );
    Ok(state)
}

pub fn save_state(path: &Path, state: &GameState) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("serializing state")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing state file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gel_core::test_fixtures::{base_content, make_rng, task_id};
    use gel_core::Stat;

    #[test]
    fn test_valid_content_passes_validation() {
        validate_content(&base_content()).unwrap();
    }

    #[test]
    fn test_duplicate_task_id_rejected() {
        let mut content = base_content();
        let dup = content.tasks[0].clone();
        content.tasks.push(dup);
        let err = validate_content(&content).unwrap_err();
        assert!(err.to_string().contains("duplicate task id 'train_cart'"));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut content = base_content();
        content.tasks[0].duration_ticks = 0;
        let err = validate_content(&content).unwrap_err();
        assert!(err.to_string().contains("duration_ticks"));
    }

    #[test]
    fn test_cost_above_cap_rejected() {
        let mut content = base_content();
        content.tasks.push(TaskDef {
            id: task_id("train_impossible"),
            name: "Impossible".to_string(),
            cost: 150.0,
            duration_ticks: 1,
            reward: TaskReward::Monster {
                stat: Stat::Attack,
                gel: 1,
            },
        });
        let err = validate_content(&content).unwrap_err();
        assert!(err.to_string().contains("exceeds sill_cap"));
    }

    #[test]
    fn test_stat_gate_above_stat_cap_rejected() {
        let mut content = base_content();
        content.boss.requirement = BossRequirement::Stats {
            minimums: [(Stat::Attack, 51)].into_iter().collect(),
        };
        let err = validate_content(&content).unwrap_err();
        assert!(err.to_string().contains("above stat_cap 50"));

        content.boss.requirement = BossRequirement::Stats {
            minimums: [(Stat::Attack, 50)].into_iter().collect(),
        };
        validate_content(&content).unwrap();
    }

    #[test]
    fn test_unsorted_tiers_rejected() {
        let mut content = base_content();
        content.level_tiers.swap(1, 2);
        let err = validate_content(&content).unwrap_err();
        assert!(err.to_string().contains("must come after"));
    }

    #[test]
    fn test_tiers_must_start_at_zero() {
        let mut content = base_content();
        content.level_tiers.remove(0);
        assert!(validate_content(&content).is_err());
    }

    #[test]
    fn test_initial_state_is_seeded() {
        let content = base_content();
        let a = build_initial_state(&content, 42, &mut make_rng());
        let b = build_initial_state(&content, 42, &mut make_rng());
        assert_eq!(a, b);
        assert_eq!(a.meta.seed, 42);
        assert_eq!(a.progression.title, "Novice of the Gel");
        assert!(a.runner.is_idle());
        assert!(a.resources.traits.is_empty());
    }

    #[test]
    fn test_state_file_roundtrip() {
        let content = base_content();
        let state = build_initial_state(&content, 7, &mut make_rng());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        save_state(&path, &state).unwrap();
        assert_eq!(load_state(&path, &content).unwrap(), state);
    }

    #[test]
    fn test_save_over_longer_file_leaves_no_trailing_bytes() {
        let content = base_content();
        let state = build_initial_state(&content, 7, &mut make_rng());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "x".repeat(64 * 1024)).unwrap();

        save_state(&path, &state).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.trim_end().ends_with('}'));
        assert_eq!(load_state(&path, &content).unwrap(), state);
    }

    #[test]
    fn test_state_file_for_other_content_rejected() {
        let content = base_content();
        let mut state = build_initial_state(&content, 7, &mut make_rng());
        state.meta.content_version = "stale".to_string();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        save_state(&path, &state).unwrap();
        let err = load_state(&path, &content).unwrap_err();
        assert!(err.to_string().contains("stale"));
    }
}
