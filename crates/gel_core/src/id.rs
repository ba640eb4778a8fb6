//! Session and sequence identifiers.

use rand::RngCore;
use uuid::Uuid;

use crate::{CommandId, EventId};

/// Stamp a fresh save with a v4-shaped id drawn from the game's seeded RNG.
pub fn new_session_id(rng: &mut impl RngCore) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

fn sequence(prefix: &str, n: u64) -> String {
    format!("{prefix}_{n:06}")
}

impl EventId {
    pub(crate) fn nth(n: u64) -> Self {
        EventId(sequence("evt", n))
    }
}

impl CommandId {
    /// `cmd_000042` for `n = 42`; widens past six digits instead of wrapping.
    pub fn nth(n: u64) -> Self {
        CommandId(sequence("cmd", n))
    }
}
