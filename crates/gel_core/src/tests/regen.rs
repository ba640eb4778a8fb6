use super::*;

#[test]
fn test_full_sill_stays_capped() {
    let mut resources = ResourceState::new(100.0);
    let gained = resources.regenerate(10.0, 0.5, 100.0);
    assert!(gained.abs() < EPS);
    assert!((resources.sill - 100.0).abs() < EPS);
}

#[test]
fn test_regen_is_rate_times_elapsed() {
    let mut resources = ResourceState::new(20.0);
    resources.regenerate(10.0, 0.5, 100.0);
    assert!((resources.sill - 25.0).abs() < EPS);
}

#[test]
fn test_regen_clamps_to_cap() {
    let mut resources = ResourceState::new(95.0);
    let gained = resources.regenerate(500.0, 0.5, 100.0);
    assert!((gained - 5.0).abs() < EPS);
    assert!((resources.sill - 100.0).abs() < EPS);
}

#[test]
fn test_bad_elapsed_restores_nothing() {
    let mut resources = ResourceState::new(50.0);
    for elapsed in [0.0, -3.0, f32::NAN, f32::INFINITY] {
        assert!(resources.regenerate(elapsed, 0.5, 100.0).abs() < EPS);
    }
    assert!((resources.sill - 50.0).abs() < EPS);
}

#[test]
fn test_tick_regenerates_from_elapsed_not_tick_count() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.sill = 10.0;

    tick(&mut state, &[], &content, 4.0, EventLevel::Normal);
    assert_sill(&state, 12.0);

    tick(&mut state, &[], &content, 0.5, EventLevel::Normal);
    assert_sill(&state, 12.25);
}

#[test]
fn test_sill_stays_in_bounds_under_load() {
    let content = base_content();
    let mut state = base_state(&content);
    let cap = content.constants.sill_cap;
    let tasks: Vec<TaskId> = content.tasks.iter().map(|t| t.id.clone()).collect();

    for n in 0..600u64 {
        let idx = usize::try_from(n).unwrap() % tasks.len();
        let cmd = command(
            &state,
            Command::StartTask {
                task_id: tasks[idx].clone(),
            },
        );
        tick(&mut state, &[cmd], &content, 1.0, EventLevel::Normal);
        let sill = state.resources.sill;
        assert!((0.0..=cap).contains(&sill), "sill {sill} out of bounds at tick {n}");
    }
}

#[test]
fn test_debug_level_reports_regeneration() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.sill = 50.0;

    let normal = tick(&mut state, &[], &content, 1.0, EventLevel::Normal);
    let debug = tick(&mut state, &[], &content, 1.0, EventLevel::Debug);

    assert_eq!(
        count_events(&normal, |e| matches!(e, Event::SillRegenerated { .. })),
        0
    );
    assert_eq!(
        count_events(&debug, |e| matches!(e, Event::SillRegenerated { .. })),
        1
    );
}

#[test]
fn test_spend_gel_never_goes_negative() {
    let mut resources = ResourceState::new(0.0);
    resources.add_gel(3);

    assert_eq!(
        resources.spend_gel(5),
        Err(Rejection::InsufficientGel {
            required: 5,
            available: 3
        })
    );
    assert_eq!(resources.gel, 3);

    resources.spend_gel(3).unwrap();
    assert_eq!(resources.gel, 0);
}

#[test]
fn test_spend_sill_rejects_overdraw() {
    let mut resources = ResourceState::new(2.0);
    assert!(resources.spend_sill(2.5).is_err());
    assert!((resources.sill - 2.0).abs() < EPS);
}
