//! Worldline narrative engine: HTTP API.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use state::AppState;

/// Builds the full application router over `state`.
pub fn app(state: AppState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the front-end origin once it has a fixed host.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/checkpoints", routes::checkpoints::router())
        .nest("/api/v1/segments", routes::segments::router())
        .nest("/api/v1/import", routes::import::router())
        .nest("/api/v1/layout", routes::layout::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
