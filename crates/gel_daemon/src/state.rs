use gel_control::AutopilotController;
use gel_core::{EventEnvelope, Game, Snapshot, StateObserver};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::sync::broadcast;

pub struct SimState {
    pub game: Game,
    /// `None` leaves the game to HTTP input alone.
    pub autopilot: Option<AutopilotController>,
    pub next_command_id: u64,
}

/// One state change: the snapshot after it and the events that caused it.
#[derive(Debug, Clone, Serialize)]
pub struct Update {
    pub snapshot: Snapshot,
    pub events: Vec<EventEnvelope>,
}

pub type SharedSim = Arc<Mutex<SimState>>;
pub type UpdateTx = broadcast::Sender<Update>;

#[derive(Clone)]
pub struct AppState {
    pub sim: SharedSim,
    pub update_tx: UpdateTx,
    pub paused: Arc<AtomicBool>,
    pub ticks_per_sec: f64,
    pub save_path: Option<PathBuf>,
}

/// Forwards every state change from the `Game` onto the SSE broadcast channel.
pub struct Broadcaster {
    tx: UpdateTx,
}

impl Broadcaster {
    pub fn new(tx: UpdateTx) -> Self {
        Self { tx }
    }
}

impl StateObserver for Broadcaster {
    fn on_change(&mut self, snapshot: &Snapshot, events: &[EventEnvelope]) {
        // Send only fails when no client is subscribed.
        let _ = self.tx.send(Update {
            snapshot: snapshot.clone(),
            events: events.to_vec(),
        });
    }
}

impl AppState {
    /// Wire a game into shared state, subscribing the broadcaster.
    pub fn new(
        mut game: Game,
        autopilot: Option<AutopilotController>,
        ticks_per_sec: f64,
        save_path: Option<PathBuf>,
    ) -> Self {
        let (update_tx, _) = broadcast::channel(256);
        game.subscribe(Box::new(Broadcaster::new(update_tx.clone())));
        let next_command_id = game.state().counters.next_command_id;
        Self {
            sim: Arc::new(Mutex::new(SimState {
                game,
                autopilot,
                next_command_id,
            })),
            update_tx,
            paused: Arc::new(AtomicBool::new(false)),
            ticks_per_sec,
            save_path,
        }
    }
}
