//! `Game`: single owner of a `GameState` and the content it runs against.
//!
//! Inputs either go straight through the methods here (applied immediately,
//! between ticks) or are queued as `CommandEnvelope`s for `tick`. Every
//! successful mutation is pushed to subscribed `StateObserver`s along with a
//! fresh `Snapshot`.

use crate::engine::apply_command;
use crate::milestone::{advance_loop, complete_chapter};
use crate::snapshot::{snapshot, Snapshot};
use crate::{
    Command, CommandEnvelope, EventEnvelope, EventLevel, GameContent, GameState, Rejection, TaskId,
};

/// Receives a snapshot plus the events that produced it after every state change.
pub trait StateObserver: Send {
    fn on_change(&mut self, snapshot: &Snapshot, events: &[EventEnvelope]);
}

pub struct Game {
    state: GameState,
    content: GameContent,
    event_level: EventLevel,
    observers: Vec<Box<dyn StateObserver>>,
}

impl Game {
    pub fn new(state: GameState, content: GameContent) -> Self {
        Self {
            state,
            content,
            event_level: EventLevel::Normal,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_event_level(mut self, event_level: EventLevel) -> Self {
        self.event_level = event_level;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn content(&self) -> &GameContent {
        &self.content
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        snapshot(&self.state, &self.content)
    }

    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    pub fn start_task(&mut self, task_id: &TaskId) -> Result<Vec<EventEnvelope>, Rejection> {
        self.execute(&Command::StartTask {
            task_id: task_id.clone(),
        })
    }

    pub fn attempt_boss(&mut self) -> Result<Vec<EventEnvelope>, Rejection> {
        self.execute(&Command::AttemptBoss)
    }

    /// Always succeeds; a repeat only yields `ChapterAlreadyCompleted`.
    pub fn complete_chapter(&mut self, chapter: u32) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        complete_chapter(&mut self.state, chapter, &mut events);
        self.publish(&events);
        events
    }

    pub fn next_loop(&mut self) -> Vec<EventEnvelope> {
        let mut events = Vec::new();
        advance_loop(&mut self.state, &mut events);
        self.publish(&events);
        events
    }

    /// Apply one input immediately. Rejections leave state untouched and notify no one.
    pub fn execute(&mut self, command: &Command) -> Result<Vec<EventEnvelope>, Rejection> {
        let mut events = Vec::new();
        apply_command(&mut self.state, command, &self.content, &mut events)?;
        self.publish(&events);
        Ok(events)
    }

    pub fn tick(&mut self, commands: &[CommandEnvelope], elapsed_secs: f32) -> Vec<EventEnvelope> {
        let events = crate::tick(
            &mut self.state,
            commands,
            &self.content,
            elapsed_secs,
            self.event_level,
        );
        self.publish(&events);
        events
    }

    fn publish(&mut self, events: &[EventEnvelope]) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_change(&snapshot, events);
        }
    }
}
