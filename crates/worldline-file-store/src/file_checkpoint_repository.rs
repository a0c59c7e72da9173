//! JSON file implementation of the `CheckpointRepository` trait.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use worldline_core::error::DomainError;
use worldline_core::repository::{CheckpointRepository, PersistedStore};

/// Failures of the file-backed repository.
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} does not hold a checkpoint store: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode checkpoint store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage quota exceeded: {size} bytes over a {quota} byte quota")]
    QuotaExceeded { size: usize, quota: usize },
}

impl From<FileStoreError> for DomainError {
    fn from(error: FileStoreError) -> Self {
        DomainError::Infrastructure(error.to_string())
    }
}

/// Checkpoint repository backed by a single JSON document on disk.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a crash mid-write leaves the previous store intact. Flushes
/// may arrive out of order; a record whose revision is below the last one
/// written is dropped so the file never moves backwards.
#[derive(Debug)]
pub struct FileCheckpointRepository {
    path: PathBuf,
    quota_bytes: Option<usize>,
    /// Revision of the record currently on disk.
    written_revision: Mutex<u64>,
}

impl FileCheckpointRepository {
    /// Creates a repository writing to `path` with no size limit.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
            written_revision: Mutex::new(0),
        }
    }

    /// Rejects writes whose encoded size exceeds `quota_bytes`.
    #[must_use]
    pub fn with_quota(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = Some(quota_bytes);
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> Result<PersistedStore, FileStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no checkpoint store on disk, starting empty");
                return Ok(PersistedStore::default());
            }
            Err(source) => {
                return Err(FileStoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| FileStoreError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    async fn write(&self, store: &PersistedStore) -> Result<(), FileStoreError> {
        let bytes = serde_json::to_vec(store)?;
        if let Some(quota) = self.quota_bytes.filter(|&quota| bytes.len() > quota) {
            return Err(FileStoreError::QuotaExceeded {
                size: bytes.len(),
                quota,
            });
        }

        let mut written = self.written_revision.lock().await;
        if store.revision < *written {
            debug!(
                revision = store.revision,
                written = *written,
                "dropping stale checkpoint store write"
            );
            return Ok(());
        }
        let temp = self.temp_path();
        let write_error = |source| FileStoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(write_error)?;
        }
        tokio::fs::write(&temp, &bytes).await.map_err(write_error)?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(write_error)?;
        *written = store.revision;
        debug!(
            path = %self.path.display(),
            revision = store.revision,
            bytes = bytes.len(),
            nodes = store.nodes.len(),
            "checkpoint store written"
        );
        Ok(())
    }
}

#[async_trait]
impl CheckpointRepository for FileCheckpointRepository {
    async fn load(&self) -> Result<PersistedStore, DomainError> {
        let store = self.read().await?;
        let mut written = self.written_revision.lock().await;
        *written = (*written).max(store.revision);
        Ok(store)
    }

    async fn persist(&self, store: &PersistedStore) -> Result<(), DomainError> {
        Ok(self.write(store).await?)
    }
}
