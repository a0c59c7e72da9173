//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use worldline_checkpoint::domain::store::{NodeStore, StoreSettings};
use worldline_core::clock::Clock;
use worldline_core::repository::{CheckpointRepository, PersistedStore};
use worldline_test_support::{FixedClock, RecordingCheckpointRepository, SequentialIds};

use worldline_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// App state over an empty store with deterministic clock and ids, flushing
/// to `repository`.
pub fn test_state(repository: Arc<dyn CheckpointRepository>) -> AppState {
    test_state_from(PersistedStore::default(), repository)
}

/// App state over a store rebuilt from `persisted`.
pub fn test_state_from(
    persisted: PersistedStore,
    repository: Arc<dyn CheckpointRepository>,
) -> AppState {
    AppState::new(
        fixed_clock(),
        Arc::new(SequentialIds::new("node")),
        NodeStore::from_persisted(persisted, StoreSettings::default()),
        repository,
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: AppState) -> Router {
    worldline_api::app(state)
}

/// Build the full app router over an empty store and a recording repository.
pub fn build_default_app() -> (Router, Arc<RecordingCheckpointRepository>) {
    let repository = Arc::new(RecordingCheckpointRepository::default());
    let app = build_test_app(test_state(repository.clone()));
    (app, repository)
}

/// Send a request with an optional JSON body and return the response.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

/// Waits until the deferred flush has written at least `count` records.
pub async fn wait_for_flushes(repository: &RecordingCheckpointRepository, count: usize) {
    for _ in 0..100 {
        if repository.persisted().len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {count} flushes, saw {}",
        repository.persisted().len()
    );
}

/// A save request body for `beats` in `session_id`.
pub fn save_body(session_id: &str, beats: &[&str], save_type: &str, summary: &str) -> serde_json::Value {
    serde_json::json!({
        "snapshot": worldline_test_support::snapshot(session_id, beats),
        "type": save_type,
        "summary": summary,
        "choiceLabel": "Go on",
    })
}
