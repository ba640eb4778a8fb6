//! `gel_core`: deterministic idle-game tick.
//!
//! No IO, no clocks. The driver hands each tick the wall-clock seconds it covers.

mod engine;
mod error;
mod game;
mod id;
mod milestone;
mod progression;
mod resources;
mod snapshot;
pub(crate) mod tasks;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use engine::tick;
pub use error::Rejection;
pub use game::{Game, StateObserver};
pub use id::new_session_id;
pub use milestone::check_boss_requirements;
pub use progression::{compute_level, LevelInfo};
pub use snapshot::{snapshot, ActiveTaskView, Snapshot};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId::nth(counters.next_event_id);
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

#[cfg(test)]
mod tests;
