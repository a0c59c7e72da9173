//! Worldline API server entry point.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use worldline_api::config::AppConfig;
use worldline_api::error::AppError;
use worldline_api::state::AppState;
use worldline_checkpoint::domain::store::NodeStore;
use worldline_core::clock::SystemClock;
use worldline_core::ids::UuidGenerator;
use worldline_core::repository::CheckpointRepository;
use worldline_file_store::file_checkpoint_repository::FileCheckpointRepository;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Worldline API server");

    let config = AppConfig::from_env()?;

    // Load the persisted checkpoint store.
    let mut repository = FileCheckpointRepository::new(&config.store_path);
    if let Some(quota) = config.store_quota_bytes {
        repository = repository.with_quota(quota);
    }
    let repository: Arc<dyn CheckpointRepository> = Arc::new(repository);
    let persisted = repository.load().await?;
    tracing::info!(
        path = %config.store_path.display(),
        checkpoints = persisted.nodes.len(),
        retention = %config.store.retention,
        "checkpoint store loaded"
    );
    let store = NodeStore::from_persisted(persisted, config.store);

    let app_state = AppState::new(
        Arc::new(SystemClock),
        Arc::new(UuidGenerator),
        store,
        repository,
    );
    let app = worldline_api::app(app_state);

    // Start server.
    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
