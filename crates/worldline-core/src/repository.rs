//! Durable checkpoint storage abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::model::Node;

/// The record written to durable storage.
///
/// Nodes are stored without protagonist portraits and without oversized
/// segment backgrounds; portraits live once per session in `portraits`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStore {
    /// Checkpoints, most recent first.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Protagonist portrait per session id.
    #[serde(default)]
    pub portraits: BTreeMap<String, String>,
    /// Increases with every record the store hands out for writing.
    /// Repositories never replace a record with one of a lower revision.
    #[serde(default)]
    pub revision: u64,
}

/// Repository trait for loading and writing the checkpoint store.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Load the last persisted store. An absent store loads as empty.
    async fn load(&self) -> Result<PersistedStore, DomainError>;

    /// Replace the persisted store with `store`, unless a record with a
    /// higher `revision` has already been written.
    async fn persist(&self, store: &PersistedStore) -> Result<(), DomainError>;
}
