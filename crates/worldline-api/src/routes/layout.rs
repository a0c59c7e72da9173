//! Routes for the graph layout context.

use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use worldline_layout::application::{command_handlers, query_handlers};
use worldline_layout::domain::commands;
use worldline_layout::domain::engine::GraphLayout;
use worldline_layout::domain::overrides::Position;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /.
#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    /// Lay out only this session.
    pub session_id: Option<String>,
}

/// Response body for override changes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideResponse {
    pub node_id: String,
    /// The pin in force after the request, if any.
    pub position: Option<Position>,
}

/// GET /
#[instrument(skip(state))]
async fn get_layout(
    State(state): State<AppState>,
    Query(query): Query<LayoutQuery>,
) -> Result<Json<GraphLayout>, ApiError> {
    let store = state.store()?;
    let overrides = state.overrides()?;
    Ok(Json(query_handlers::get_layout(
        store.list(),
        query.session_id.as_deref(),
        &overrides,
        &state.layout,
    )))
}

/// PUT /overrides/{node_id}
#[instrument(skip(state, position))]
async fn pin_position(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
    Json(position): Json<Position>,
) -> Result<Json<OverrideResponse>, ApiError> {
    let command = commands::PinNodePosition {
        correlation_id: Uuid::new_v4(),
        node_id,
        position,
    };

    info!(correlation_id = %command.correlation_id, "handling pin_node_position command");

    let store = state.store()?;
    let mut overrides = state.overrides()?;
    command_handlers::handle_pin(&command, store.list(), &mut overrides)?;
    Ok(Json(OverrideResponse {
        node_id: command.node_id,
        position: Some(command.position),
    }))
}

/// DELETE /overrides/{node_id}
#[instrument(skip(state))]
async fn unpin_position(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Result<Json<OverrideResponse>, ApiError> {
    let command = commands::UnpinNodePosition {
        correlation_id: Uuid::new_v4(),
        node_id,
    };

    info!(correlation_id = %command.correlation_id, "handling unpin_node_position command");

    let mut overrides = state.overrides()?;
    command_handlers::handle_unpin(&command, &mut overrides);
    Ok(Json(OverrideResponse {
        node_id: command.node_id,
        position: None,
    }))
}

/// Returns the router for the layout context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_layout))
        .route(
            "/overrides/{node_id}",
            put(pin_position).delete(unpin_position),
        )
}
