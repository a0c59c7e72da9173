//! Narrative generation collaborator.
//!
//! The generation service itself lives outside this workspace. The engine only
//! depends on the shape of what it returns.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::model::{SegmentVersion, Snapshot};

/// Result of one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSegment {
    /// The new rendering of the beat.
    pub segment: SegmentVersion,
    /// Affinity change per supporting cast member name.
    #[serde(default)]
    pub affinity_deltas: BTreeMap<String, i32>,
    /// Replacement memory summary, if the service produced one.
    #[serde(default)]
    pub memory_summary: Option<String>,
    /// Facts to add to memory.
    #[serde(default)]
    pub new_facts: Vec<String>,
    /// Scheduled story event this beat fulfilled.
    #[serde(default)]
    pub fulfilled_event_id: Option<String>,
}

/// Produces narrative beats for a snapshot and a player action.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generate the beat that follows `action` taken in `snapshot`.
    async fn generate(
        &self,
        snapshot: &Snapshot,
        action: &str,
    ) -> Result<GeneratedSegment, DomainError>;
}
