//! Test repositories: mock `CheckpointRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use worldline_core::error::DomainError;
use worldline_core::repository::{CheckpointRepository, PersistedStore};

/// A repository that records every `persist` call and loads as the most
/// recently persisted store.
#[derive(Debug, Default)]
pub struct RecordingCheckpointRepository {
    persisted: Mutex<Vec<PersistedStore>>,
}

impl RecordingCheckpointRepository {
    /// Returns a snapshot of every store that was persisted, oldest first.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn persisted(&self) -> Vec<PersistedStore> {
        self.persisted.lock().unwrap().clone()
    }

    /// Returns the most recently persisted store, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn last_persisted(&self) -> Option<PersistedStore> {
        self.persisted.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CheckpointRepository for RecordingCheckpointRepository {
    async fn load(&self) -> Result<PersistedStore, DomainError> {
        Ok(self.last_persisted().unwrap_or_default())
    }

    async fn persist(&self, store: &PersistedStore) -> Result<(), DomainError> {
        self.persisted.lock().unwrap().push(store.clone());
        Ok(())
    }
}

/// A repository that loads as empty and silently accepts writes.
#[derive(Debug)]
pub struct EmptyCheckpointRepository;

#[async_trait]
impl CheckpointRepository for EmptyCheckpointRepository {
    async fn load(&self) -> Result<PersistedStore, DomainError> {
        Ok(PersistedStore::default())
    }

    async fn persist(&self, _store: &PersistedStore) -> Result<(), DomainError> {
        Ok(())
    }
}

/// A repository whose every call fails the way a full storage quota does.
#[derive(Debug)]
pub struct FailingCheckpointRepository;

#[async_trait]
impl CheckpointRepository for FailingCheckpointRepository {
    async fn load(&self) -> Result<PersistedStore, DomainError> {
        Err(DomainError::Infrastructure("storage quota exceeded".into()))
    }

    async fn persist(&self, _store: &PersistedStore) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("storage quota exceeded".into()))
    }
}
