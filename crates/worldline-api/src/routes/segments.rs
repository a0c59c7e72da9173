//! Routes for regenerating and switching renderings of a checkpoint's beat.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use worldline_checkpoint::application::command_handlers;
use worldline_checkpoint::domain::commands;
use worldline_core::error::DomainError;
use worldline_core::model::{SegmentVersion, VersionDirection};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{node_id}/regenerate.
#[derive(Debug, Default, Deserialize)]
pub struct RegenerateRequest {
    /// A rendering supplied by the caller. When absent the configured
    /// narrative generator produces one.
    #[serde(default)]
    pub variant: Option<SegmentVersion>,
}

/// Request body for POST /{node_id}/switch-version.
#[derive(Debug, Deserialize)]
pub struct SwitchVersionRequest {
    pub direction: VersionDirection,
}

/// Response body describing a beat's renderings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    pub node_id: String,
    /// Number of stored renderings; zero until the first regeneration.
    pub version_count: usize,
    pub current_version_index: usize,
}

/// POST /{node_id}/regenerate
#[instrument(skip(state, request))]
async fn regenerate(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
    Json(request): Json<RegenerateRequest>,
) -> Result<Json<VersionResponse>, ApiError> {
    let variant = match request.variant {
        Some(variant) => variant,
        None => {
            let generator = state.generator.clone().ok_or_else(|| {
                DomainError::Validation(
                    "no narrative generator configured; supply a variant".into(),
                )
            })?;
            let node = state
                .store()?
                .get(&node_id)
                .cloned()
                .ok_or_else(|| DomainError::NodeNotFound(node_id.clone()))?;
            command_handlers::generate_variant(generator.as_ref(), &node).await?
        }
    };

    let command = commands::RegenerateSegment {
        correlation_id: Uuid::new_v4(),
        node_id,
        variant,
    };

    info!(correlation_id = %command.correlation_id, "handling regenerate_segment command");

    let mut store = state.store()?;
    let result = command_handlers::handle_regenerate(&command, &mut store, &state.repository)?;
    Ok(Json(VersionResponse {
        current_version_index: result.value - 1,
        version_count: result.value,
        node_id: command.node_id,
    }))
}

/// POST /{node_id}/switch-version
#[instrument(skip(state, request), fields(direction = ?request.direction))]
async fn switch_version(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
    Json(request): Json<SwitchVersionRequest>,
) -> Result<Json<VersionResponse>, ApiError> {
    let command = commands::SwitchSegmentVersion {
        correlation_id: Uuid::new_v4(),
        node_id,
        direction: request.direction,
    };

    info!(correlation_id = %command.correlation_id, "handling switch_segment_version command");

    let mut store = state.store()?;
    let result = command_handlers::handle_switch_version(&command, &mut store, &state.repository)?;
    let version_count = store
        .get(&command.node_id)
        .and_then(|node| node.snapshot.current_segment.as_ref())
        .map_or(0, worldline_core::model::Segment::version_count);
    Ok(Json(VersionResponse {
        node_id: command.node_id,
        version_count,
        current_version_index: result.value,
    }))
}

/// Returns the router for the segment context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{node_id}/regenerate", post(regenerate))
        .route("/{node_id}/switch-version", post(switch_version))
}
