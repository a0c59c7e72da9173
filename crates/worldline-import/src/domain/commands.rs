//! Commands for the import context.

use serde_json::Value;
use uuid::Uuid;
use worldline_core::command::Command;

/// Command to import an exported checkpoint, configuration or backup.
#[derive(Debug, Clone)]
pub struct ImportCheckpoints {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The raw, not yet classified payload.
    pub payload: Value,
}

impl Command for ImportCheckpoints {
    fn command_type(&self) -> &'static str {
        "import.import_checkpoints"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
