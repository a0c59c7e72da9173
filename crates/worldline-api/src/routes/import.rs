//! Routes for the import context.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use worldline_import::application::command_handlers::{self, ImportOutcome};
use worldline_import::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /
///
/// Accepts any JSON value; shape checking happens in the import context so
/// an unknown shape is reported as `unrecognized_format` rather than a
/// deserialization failure.
#[instrument(skip(state, payload))]
async fn import_payload(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<ImportOutcome>, ApiError> {
    let command = commands::ImportCheckpoints {
        correlation_id: Uuid::new_v4(),
        payload,
    };

    info!(correlation_id = %command.correlation_id, "handling import_checkpoints command");

    let mut store = state.store()?;
    let result = command_handlers::handle_import(
        &command,
        &mut store,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &state.repository,
    )?;
    state.prune_overrides(&store)?;

    Ok(Json(result.value))
}

/// Returns the router for the import context.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(import_payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::StatusCode;
    use serde_json::json;
    use worldline_core::model::SaveType;
    use worldline_layout::domain::overrides::Position;
    use worldline_test_support::node;

    use crate::routes::testing::{send, state_with};

    #[tokio::test]
    async fn test_import_bulk_reports_inserted_count() {
        // Arrange
        let state = state_with(vec![]);
        let backup = json!([
            node("a1", "s1", &["b1"], SaveType::Auto),
            node("a2", "s1", &["b1", "b2"], SaveType::Manual),
        ]);

        // Act
        let (status, json) = send(router().with_state(state.clone()), "POST", "/", Some(&backup)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "bulk");
        assert_eq!(json["inserted"], 2);
        assert_eq!(state.store().unwrap().list().len(), 2);
    }

    #[tokio::test]
    async fn test_import_of_duplicates_is_success_with_zero() {
        let existing = node("a1", "s1", &["b1"], SaveType::Manual);
        let state = state_with(vec![existing.clone()]);

        let (status, json) = send(router().with_state(state), "POST", "/", Some(&json!([existing]))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["inserted"], 0);
        assert_eq!(json["skipped"], 1);
    }

    #[tokio::test]
    async fn test_import_unknown_shape_returns_400_unrecognized_format() {
        let state = state_with(vec![]);

        let (status, json) = send(router().with_state(state), "POST", "/", Some(&json!(42))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "unrecognized_format");
    }

    #[tokio::test]
    async fn test_empty_backup_is_rejected_unlike_duplicate_only_backup() {
        let state = state_with(vec![]);

        let (status, json) = send(router().with_state(state), "POST", "/", Some(&json!([]))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "unrecognized_format");
    }

    #[tokio::test]
    async fn test_import_evictions_drop_their_overrides() {
        // Arrange
        let nodes: Vec<_> = (0..20)
            .rev()
            .map(|i| node(&format!("n{i}"), "s1", &[format!("b{i}").as_str()], SaveType::Auto))
            .collect();
        let state = state_with(nodes);
        state.overrides().unwrap().set("n0", Position { x: 0.0, y: 0.0 });
        let backup = json!([node("imported", "s2", &["b1"], SaveType::Manual)]);

        // Act
        let (status, json) = send(router().with_state(state.clone()), "POST", "/", Some(&backup)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["inserted"], 1);
        assert!(state.store().unwrap().get("n0").is_none());
        assert!(state.overrides().unwrap().is_empty());
    }
}
