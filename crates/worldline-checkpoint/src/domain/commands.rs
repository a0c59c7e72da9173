//! Commands for the checkpoint context.

use uuid::Uuid;
use worldline_core::command::Command;
use worldline_core::model::{NodeMetadata, SaveType, SegmentVersion, Snapshot, VersionDirection};

/// Command to save a snapshot as a checkpoint.
#[derive(Debug, Clone)]
pub struct SaveCheckpoint {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Game state to capture.
    pub snapshot: Snapshot,
    /// What triggered the save.
    pub save_type: SaveType,
    /// Display metadata for the checkpoint.
    pub metadata: NodeMetadata,
}

impl Command for SaveCheckpoint {
    fn command_type(&self) -> &'static str {
        "checkpoint.save"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to reload a checkpoint for play.
#[derive(Debug, Clone)]
pub struct LoadCheckpoint {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The node to load.
    pub node_id: String,
}

impl Command for LoadCheckpoint {
    fn command_type(&self) -> &'static str {
        "checkpoint.load"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete a single checkpoint.
#[derive(Debug, Clone)]
pub struct DeleteNode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The node to delete.
    pub node_id: String,
}

impl Command for DeleteNode {
    fn command_type(&self) -> &'static str {
        "checkpoint.delete_node"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete every checkpoint of a session.
#[derive(Debug, Clone)]
pub struct DeleteSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The session to delete.
    pub session_id: String,
}

impl Command for DeleteSession {
    fn command_type(&self) -> &'static str {
        "checkpoint.delete_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to append a regenerated rendering to a node's current beat.
#[derive(Debug, Clone)]
pub struct RegenerateSegment {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The node whose current beat is regenerated.
    pub node_id: String,
    /// The new rendering.
    pub variant: SegmentVersion,
}

impl Command for RegenerateSegment {
    fn command_type(&self) -> &'static str {
        "checkpoint.regenerate_segment"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to cycle the active rendering of a node's current beat.
#[derive(Debug, Clone)]
pub struct SwitchSegmentVersion {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The node whose current beat is switched.
    pub node_id: String,
    /// Which way to cycle.
    pub direction: VersionDirection,
}

impl Command for SwitchSegmentVersion {
    fn command_type(&self) -> &'static str {
        "checkpoint.switch_segment_version"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
