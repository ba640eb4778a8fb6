use crate::state::{AppState, Update};
use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use gel_core::{EventEnvelope, Game, GameState, Rejection, Snapshot, TaskDef, TaskId};
use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, HeaderValue::from_static("http://localhost:5173"))
}

pub fn make_router_with_cors(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/state", get(state_handler))
        .route("/api/v1/tasks", get(tasks_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/tasks/:task_id/start", post(start_task_handler))
        .route("/api/v1/chapters/:chapter/complete", post(complete_chapter_handler))
        .route("/api/v1/boss/attempt", post(attempt_boss_handler))
        .route("/api/v1/loop/next", post(next_loop_handler))
        .route("/api/v1/save", post(save_handler))
        .route("/api/v1/pause", post(pause_handler))
        .route("/api/v1/resume", post(resume_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    let meta = &sim.game.state().meta;
    Json(serde_json::json!({
        "tick": meta.tick,
        "seed": meta.seed,
        "session_id": meta.session_id,
        "content_version": meta.content_version,
        "ticks_per_sec": app_state.ticks_per_sec,
        "paused": app_state.paused.load(Ordering::Relaxed),
        "autopilot": sim.autopilot.is_some(),
    }))
}

pub async fn snapshot_handler(State(app_state): State<AppState>) -> Json<Snapshot> {
    Json(app_state.sim.lock().game.snapshot())
}

pub async fn state_handler(State(app_state): State<AppState>) -> Json<GameState> {
    Json(app_state.sim.lock().game.state().clone())
}

pub async fn tasks_handler(State(app_state): State<AppState>) -> Json<Vec<TaskDef>> {
    Json(app_state.sim.lock().game.content().tasks.clone())
}

// ---------------------------------------------------------------------------
// Player actions
// ---------------------------------------------------------------------------

type ActionResponse = (StatusCode, Json<serde_json::Value>);

fn respond(game: &Game, result: &Result<Vec<EventEnvelope>, Rejection>) -> ActionResponse {
    match result {
        Ok(events) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "events": events,
                "snapshot": game.snapshot(),
            })),
        ),
        Err(reason) => {
            tracing::debug!(%reason, "action rejected");
            let status = match reason {
                Rejection::UnknownTask { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::CONFLICT,
            };
            (
                status,
                Json(serde_json::json!({
                    "error": reason.to_string(),
                    "rejection": reason,
                })),
            )
        }
    }
}

pub async fn start_task_handler(
    State(app_state): State<AppState>,
    Path(task_id): Path<String>,
) -> ActionResponse {
    let mut sim = app_state.sim.lock();
    let result = sim.game.start_task(&TaskId(task_id));
    respond(&sim.game, &result)
}

pub async fn complete_chapter_handler(
    State(app_state): State<AppState>,
    Path(chapter): Path<u32>,
) -> ActionResponse {
    let mut sim = app_state.sim.lock();
    let events = sim.game.complete_chapter(chapter);
    respond(&sim.game, &Ok(events))
}

pub async fn attempt_boss_handler(State(app_state): State<AppState>) -> ActionResponse {
    let mut sim = app_state.sim.lock();
    let result = sim.game.attempt_boss();
    respond(&sim.game, &result)
}

pub async fn next_loop_handler(State(app_state): State<AppState>) -> ActionResponse {
    let mut sim = app_state.sim.lock();
    let events = sim.game.next_loop();
    respond(&sim.game, &Ok(events))
}

// ---------------------------------------------------------------------------
// Driver control
// ---------------------------------------------------------------------------

pub async fn save_handler(State(app_state): State<AppState>) -> ActionResponse {
    let Some(path) = app_state.save_path.clone() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": "no save path (start with --save)"})),
        );
    };

    let state = {
        let sim = app_state.sim.lock();
        let mut state = sim.game.state().clone();
        state.counters.next_command_id = sim.next_command_id;
        state
    };
    if let Err(err) = gel_world::save_state(&path, &state) {
        tracing::error!("save failed: {err:#}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("{err:#}")})),
        );
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({"path": path.display().to_string(), "tick": state.meta.tick})),
    )
}

pub async fn pause_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(true, Ordering::Relaxed);
    Json(serde_json::json!({"paused": true}))
}

pub async fn resume_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    app_state.paused.store(false, Ordering::Relaxed);
    Json(serde_json::json!({"paused": false}))
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.update_tx.subscribe();
    let sim = app_state.sim.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(5));
        heartbeat.tick().await; // discard the immediate first tick
        let mut flush = tokio::time::interval(Duration::from_millis(50));
        flush.tick().await; // discard the immediate first tick
        let mut latest: Option<Snapshot> = None;
        let mut pending: Vec<EventEnvelope> = Vec::new();
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(Update { snapshot, events }) => {
                            latest = Some(snapshot);
                            pending.extend(events);
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = flush.tick() => {
                    if let Some(snapshot) = latest.take() {
                        let update = Update { snapshot, events: std::mem::take(&mut pending) };
                        let data = serde_json::to_string(&update).unwrap_or_default();
                        yield Ok(Event::default().event("update").data(data));
                    }
                }
                _ = heartbeat.tick() => {
                    let tick = sim.lock().game.state().meta.tick;
                    let hb = serde_json::json!({"heartbeat": true, "tick": tick});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use gel_core::test_fixtures::{base_content, base_state};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn make_test_state() -> AppState {
        let content = base_content();
        let state = base_state(&content);
        AppState::new(Game::new(state, content), None, 0.0, None)
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_meta_contains_tick() {
        let (status, json) = send(make_router(make_test_state()), "GET", "/api/v1/meta").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tick"], 0);
        assert_eq!(json["autopilot"], false);
    }

    #[tokio::test]
    async fn test_snapshot_reports_resources() {
        let (status, json) = send(make_router(make_test_state()), "GET", "/api/v1/snapshot").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["sill"], 100.0);
        assert_eq!(json["gel"], 0);
        assert_eq!(json["level"]["title"], "Novice of the Gel");
    }

    #[tokio::test]
    async fn test_tasks_lists_catalog() {
        let (_, json) = send(make_router(make_test_state()), "GET", "/api/v1/tasks").await;
        assert_eq!(json.as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_start_task_deducts_sill() {
        let state = make_test_state();
        let (status, json) = send(
            make_router(state.clone()),
            "POST",
            "/api/v1/tasks/train_cart/start",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["snapshot"]["sill"], 95.0);
        assert_eq!(json["snapshot"]["active_task"]["remaining"], 3);

        let (status, json) = send(
            make_router(state),
            "POST",
            "/api/v1/tasks/train_rock/start",
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["rejection"]["kind"], "TaskAlreadyRunning");
    }

    #[tokio::test]
    async fn test_unknown_task_is_404() {
        let (status, json) = send(
            make_router(make_test_state()),
            "POST",
            "/api/v1/tasks/nope/start",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["rejection"]["kind"], "UnknownTask");
    }

    #[tokio::test]
    async fn test_boss_locked_until_chapter() {
        let state = make_test_state();
        let (status, json) = send(make_router(state.clone()), "POST", "/api/v1/boss/attempt").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["rejection"]["kind"], "ChapterLocked");

        let (status, json) = send(
            make_router(state.clone()),
            "POST",
            "/api/v1/chapters/7/complete",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["snapshot"]["boss_unlocked"], true);

        let (status, json) = send(make_router(state), "POST", "/api/v1/boss/attempt").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["rejection"]["kind"], "InsufficientGel");
    }

    #[tokio::test]
    async fn test_next_loop_counts() {
        let state = make_test_state();
        send(make_router(state.clone()), "POST", "/api/v1/loop/next").await;
        let (_, json) = send(make_router(state), "POST", "/api/v1/loop/next").await;
        assert_eq!(json["snapshot"]["loop_count"], 2);
    }

    #[tokio::test]
    async fn test_actions_are_broadcast() {
        let state = make_test_state();
        let mut rx = state.update_tx.subscribe();
        send(make_router(state), "POST", "/api/v1/tasks/train_focus/start").await;

        let update = rx.recv().await.unwrap();
        assert_eq!(update.events.len(), 1);
        assert!(update.snapshot.active_task.is_some());
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let state = make_test_state();
        let (_, json) = send(make_router(state.clone()), "POST", "/api/v1/pause").await;
        assert_eq!(json["paused"], true);
        assert!(state.paused.load(Ordering::Relaxed));

        send(make_router(state.clone()), "POST", "/api/v1/resume").await;
        assert!(!state.paused.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_save_without_path_is_unavailable() {
        let (status, _) = send(make_router(make_test_state()), "POST", "/api/v1/save").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_save_writes_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let content = base_content();
        let state = base_state(&content);
        let app_state = AppState::new(Game::new(state, content), None, 0.0, Some(path.clone()));

        let (status, json) = send(make_router(app_state), "POST", "/api/v1/save").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tick"], 0);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_records_issued_command_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let content = base_content();
        let state = base_state(&content);
        let app_state = AppState::new(
            Game::new(state, content.clone()),
            None,
            0.0,
            Some(path.clone()),
        );
        app_state.sim.lock().next_command_id = 9;

        let (status, _) = send(make_router(app_state), "POST", "/api/v1/save").await;
        assert_eq!(status, StatusCode::OK);
        let saved = gel_world::load_state(&path, &content).unwrap();
        assert_eq!(saved.counters.next_command_id, 9);
    }
}
