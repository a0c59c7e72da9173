//! Checkpoint nodes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::snapshot::Snapshot;

/// What triggered a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaveType {
    /// Explicit save requested by the player. Never overwritten by `Auto`.
    Manual,
    /// Debounced save fired by gameplay.
    Auto,
    /// Configuration save made before the first beat.
    Setup,
}

/// Display metadata shown for a checkpoint in lists and the graph view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Short human-readable summary.
    #[serde(default)]
    pub summary: String,
    /// Location at the time of the checkpoint.
    #[serde(default)]
    pub location: String,
    /// Label of the option the player picked to reach this beat. Empty or
    /// absent for free-form input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_label: Option<String>,
    /// Full text of the player's input that led to this beat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_text: Option<String>,
}

/// One persisted checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Instance identifier; kept when the node is overwritten in place.
    pub id: String,
    /// World-line (save slot) the node belongs to.
    pub session_id: String,
    /// Beat captured by the node.
    pub story_id: String,
    /// `story_id` of the preceding beat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// When the checkpoint was written.
    pub timestamp: DateTime<Utc>,
    /// What triggered the checkpoint.
    #[serde(rename = "type")]
    pub save_type: SaveType,
    /// Full game state.
    pub snapshot: Snapshot,
    /// Display metadata.
    #[serde(flatten)]
    pub metadata: NodeMetadata,
}

impl Node {
    /// Builds a node from a snapshot, deriving `session_id`, `story_id` and
    /// `parent_id` from it.
    #[must_use]
    pub fn from_snapshot(
        id: String,
        snapshot: Snapshot,
        save_type: SaveType,
        metadata: NodeMetadata,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id: snapshot.session_id.clone(),
            story_id: snapshot.story_id().to_owned(),
            parent_id: snapshot.parent_story_id(),
            timestamp,
            save_type,
            snapshot,
            metadata,
        }
    }

    /// Returns true if this node occupies the given `(session, story)` slot.
    #[must_use]
    pub fn occupies(&self, session_id: &str, story_id: &str) -> bool {
        self.session_id == session_id && self.story_id == story_id
    }

    /// True when the node has a parent but was reached without picking one of
    /// the offered options.
    #[must_use]
    pub fn is_freeform_transition(&self) -> bool {
        self.parent_id.is_some()
            && self
                .metadata
                .choice_label
                .as_deref()
                .is_none_or(|label| label.trim().is_empty())
    }
}
