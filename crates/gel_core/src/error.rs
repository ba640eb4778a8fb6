use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Stat, TaskId};

/// Why an input was refused. A rejected input never changes state.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Rejection {
    #[error("unknown task '{task_id}'")]
    UnknownTask { task_id: TaskId },
    #[error("task '{active}' is already running")]
    TaskAlreadyRunning { active: TaskId },
    #[error("not enough sill: need {required}, have {available}")]
    InsufficientSill { required: f32, available: f32 },
    #[error("not enough gel: need {required}, have {available}")]
    InsufficientGel { required: u32, available: u32 },
    #[error("{stat} too low: need {required}, have {current}")]
    StatTooLow {
        stat: Stat,
        required: u32,
        current: u32,
    },
    #[error("chapter {chapter} is not complete")]
    ChapterLocked { chapter: u32 },
    #[error("boss fight already in progress")]
    BossEngaged,
    #[error("boss already defeated")]
    BossAlreadyDefeated,
}
