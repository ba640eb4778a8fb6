use std::sync::{Arc, Mutex};

use super::*;

#[derive(Default)]
struct Recorded {
    snapshots: Vec<Snapshot>,
    event_counts: Vec<usize>,
}

struct Recorder(Arc<Mutex<Recorded>>);

impl StateObserver for Recorder {
    fn on_change(&mut self, snapshot: &Snapshot, events: &[EventEnvelope]) {
        let mut recorded = self.0.lock().unwrap();
        recorded.snapshots.push(snapshot.clone());
        recorded.event_counts.push(events.len());
    }
}

fn observed_game() -> (Game, Arc<Mutex<Recorded>>) {
    let content = base_content();
    let state = base_state(&content);
    let mut game = Game::new(state, content);
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    game.subscribe(Box::new(Recorder(Arc::clone(&recorded))));
    (game, recorded)
}

#[test]
fn test_observer_sees_start_and_ticks() {
    let (mut game, recorded) = observed_game();

    game.start_task(&task_id("train_focus")).unwrap();
    game.tick(&[], 0.0);

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.snapshots.len(), 2);
    let first = &recorded.snapshots[0];
    assert!((first.sill - 95.0).abs() < EPS);
    let active = first.active_task.as_ref().unwrap();
    assert_eq!(active.name, "Gel Meditation");
    assert_eq!(active.remaining, 3);
    assert_eq!(active.duration_ticks, 3);
    assert_eq!(recorded.event_counts[0], 1);
    assert_eq!(recorded.snapshots[1].active_task.as_ref().unwrap().remaining, 2);
}

#[test]
fn test_rejection_does_not_notify() {
    let (mut game, recorded) = observed_game();

    let result = game.start_task(&task_id("train_nothing"));

    assert!(matches!(result, Err(Rejection::UnknownTask { .. })));
    assert!(recorded.lock().unwrap().snapshots.is_empty());
}

#[test]
fn test_snapshot_reflects_boss_flags() {
    let (mut game, _recorded) = observed_game();
    assert!(!game.snapshot().boss_unlocked);

    game.complete_chapter(7);
    let snap = game.snapshot();
    assert!(snap.boss_unlocked);
    assert!(!snap.boss_engaged);
    assert!(!snap.boss_defeated);
    assert_eq!(snap.chapters_completed, vec![7]);
    assert_eq!(snap.level.title, "Novice of the Gel");
}

#[test]
fn test_game_tick_regenerates_with_elapsed() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.sill = 50.0;
    let mut game = Game::new(state, content).with_event_level(EventLevel::Debug);

    let events = game.tick(&[], 4.0);

    assert!((game.state().resources.sill - 52.0).abs() < EPS);
    assert!(matches!(events[0].event, Event::SillRegenerated { .. }));
}

#[test]
fn test_execute_routes_commands() {
    let (mut game, _recorded) = observed_game();

    game.execute(&Command::NextLoop).unwrap();
    game.next_loop();

    assert_eq!(game.state().story.loop_count, 2);
    assert_eq!(game.into_state().story.loop_count, 2);
}
