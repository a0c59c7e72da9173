//! Routes for the checkpoint context.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use worldline_checkpoint::application::{command_handlers, query_handlers};
use worldline_checkpoint::domain::commands;
use worldline_checkpoint::domain::store::SaveOutcome;
use worldline_core::model::{Node, NodeMetadata, SaveType, Snapshot};

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for listing checkpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Restrict the list to one session.
    pub session_id: Option<String>,
}

/// Query string for exporting a session.
#[derive(Debug, Deserialize)]
pub struct ExportSessionQuery {
    /// Drop portraits and backgrounds from the export.
    #[serde(default)]
    pub strip_assets: bool,
}

/// Request body for POST /save.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    /// Game state to capture.
    pub snapshot: Snapshot,
    /// What triggered the save.
    #[serde(rename = "type")]
    pub save_type: SaveType,
    /// Display metadata.
    #[serde(flatten)]
    pub metadata: NodeMetadata,
}

/// Response body for POST /save.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub node_id: String,
    /// `inserted`, `merged` or `skipped`.
    pub outcome: &'static str,
}

impl From<SaveOutcome> for SaveResponse {
    fn from(outcome: SaveOutcome) -> Self {
        let label = match &outcome {
            SaveOutcome::Inserted(_) => "inserted",
            SaveOutcome::Merged(_) => "merged",
            SaveOutcome::Skipped(_) => "skipped",
        };
        Self {
            node_id: outcome.node_id().to_owned(),
            outcome: label,
        }
    }
}

/// Response body for deletions.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Number of checkpoints removed.
    pub deleted: usize,
}

/// Response body for GET /{id}/background.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundResponse {
    pub node_id: String,
    /// The node's own background or the nearest ancestor's.
    pub background: Option<String>,
}

/// GET /
#[instrument(skip(state))]
async fn list_checkpoints(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<query_handlers::NodeSummaryView>>, ApiError> {
    let store = state.store()?;
    Ok(Json(query_handlers::list_nodes(
        &store,
        query.session_id.as_deref(),
    )))
}

/// POST /save
#[instrument(skip(state, request), fields(session_id = %request.snapshot.session_id, save_type = ?request.save_type))]
async fn save_checkpoint(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let command = commands::SaveCheckpoint {
        correlation_id: Uuid::new_v4(),
        snapshot: request.snapshot,
        save_type: request.save_type,
        metadata: request.metadata,
    };

    info!(correlation_id = %command.correlation_id, "handling save_checkpoint command");

    let mut store = state.store()?;
    let result = command_handlers::handle_save(
        &command,
        &mut store,
        state.clock.as_ref(),
        state.ids.as_ref(),
        &state.repository,
    )?;
    state.prune_overrides(&store)?;

    Ok(Json(result.value.into()))
}

/// POST /{id}/load
#[instrument(skip(state))]
async fn load_checkpoint(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<Node>, ApiError> {
    let command = commands::LoadCheckpoint {
        correlation_id: Uuid::new_v4(),
        node_id,
    };

    info!(correlation_id = %command.correlation_id, "handling load_checkpoint command");

    let mut store = state.store()?;
    let node = command_handlers::handle_load(&command, &mut store)?;
    Ok(Json(node))
}

/// DELETE /{id}
#[instrument(skip(state))]
async fn delete_checkpoint(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let command = commands::DeleteNode {
        correlation_id: Uuid::new_v4(),
        node_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_node command");

    let mut store = state.store()?;
    command_handlers::handle_delete_node(&command, &mut store, &state.repository)?;
    state.prune_overrides(&store)?;

    Ok(Json(DeleteResponse { deleted: 1 }))
}

/// DELETE /sessions/{session_id}
#[instrument(skip(state))]
async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let command = commands::DeleteSession {
        correlation_id: Uuid::new_v4(),
        session_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_session command");

    let mut store = state.store()?;
    let result = command_handlers::handle_delete_session(&command, &mut store, &state.repository);
    state.prune_overrides(&store)?;

    Ok(Json(DeleteResponse {
        deleted: result.value,
    }))
}

/// GET /{id}/background
#[instrument(skip(state))]
async fn get_background(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<BackgroundResponse>, ApiError> {
    let store = state.store()?;
    let background = query_handlers::get_background(&store, &node_id)?;
    Ok(Json(BackgroundResponse {
        node_id,
        background,
    }))
}

/// GET /{id}/export
#[instrument(skip(state))]
async fn export_checkpoint(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<Node>, ApiError> {
    let store = state.store()?;
    Ok(Json(query_handlers::export_node(&store, &node_id)?))
}

/// GET /sessions/{session_id}/export
#[instrument(skip(state))]
async fn export_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ExportSessionQuery>,
) -> Result<Json<Vec<Node>>, ApiError> {
    let store = state.store()?;
    Ok(Json(query_handlers::export_session(
        &store,
        &session_id,
        query.strip_assets,
    )?))
}

/// Returns the router for the checkpoint context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_checkpoints))
        .route("/save", post(save_checkpoint))
        .route("/sessions/{session_id}", delete(delete_session))
        .route("/sessions/{session_id}/export", get(export_session))
        .route("/{id}", delete(delete_checkpoint))
        .route("/{id}/load", post(load_checkpoint))
        .route("/{id}/background", get(get_background))
        .route("/{id}/export", get(export_checkpoint))
}
