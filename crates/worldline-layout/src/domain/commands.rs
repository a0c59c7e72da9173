//! Commands for the layout context.

use uuid::Uuid;
use worldline_core::command::Command;

use super::overrides::Position;

/// Command to pin a node at a user-chosen position.
#[derive(Debug, Clone)]
pub struct PinNodePosition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The node being moved.
    pub node_id: String,
    /// Where it was dropped.
    pub position: Position,
}

impl Command for PinNodePosition {
    fn command_type(&self) -> &'static str {
        "layout.pin_node_position"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to return a node to its computed position.
#[derive(Debug, Clone)]
pub struct UnpinNodePosition {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The node being released.
    pub node_id: String,
}

impl Command for UnpinNodePosition {
    fn command_type(&self) -> &'static str {
        "layout.unpin_node_position"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
