//! Deferred persistence of the checkpoint store.
//!
//! Mutations update the in-memory store first and then hand a copy of its
//! persisted record to a background task. The caller never waits for the
//! write, and a failed write is logged and dropped: the in-memory store stays
//! authoritative for the running game.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};
use worldline_core::repository::{CheckpointRepository, PersistedStore};

/// Spawns a write of `record` to `repo` without waiting for it.
///
/// The returned handle lets tests await completion; production callers drop
/// it.
pub fn schedule_flush(repo: Arc<dyn CheckpointRepository>, record: PersistedStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        match repo.persist(&record).await {
            Ok(()) => debug!(nodes = record.nodes.len(), "checkpoint store persisted"),
            Err(e) => warn!(error = %e, "failed to persist checkpoint store"),
        }
    })
}

#[cfg(test)]
mod tests {
    use worldline_core::model::SaveType;
    use worldline_test_support::{FailingCheckpointRepository, RecordingCheckpointRepository, node};

    use super::*;

    #[tokio::test]
    async fn test_schedule_flush_writes_record() {
        // Arrange
        let repo = Arc::new(RecordingCheckpointRepository::default());
        let record = PersistedStore {
            nodes: vec![node("n1", "s1", &["b1"], SaveType::Manual)],
            ..PersistedStore::default()
        };

        // Act
        schedule_flush(repo.clone(), record.clone()).await.unwrap();

        // Assert
        assert_eq!(repo.persisted(), vec![record]);
    }

    #[tokio::test]
    async fn test_schedule_flush_swallows_storage_errors() {
        let repo: Arc<dyn CheckpointRepository> = Arc::new(FailingCheckpointRepository);

        let joined = schedule_flush(repo, PersistedStore::default()).await;

        assert!(joined.is_ok());
    }
}
