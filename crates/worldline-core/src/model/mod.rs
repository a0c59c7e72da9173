//! Checkpoint data model.

pub mod node;
pub mod segment;
pub mod snapshot;

pub use node::{Node, NodeMetadata, SaveType};
pub use segment::{Segment, SegmentVersion, VersionDirection};
pub use snapshot::{
    CastMember, MemoryState, Protagonist, SETUP_STORY_ID, ScheduledEvent, Snapshot, WorldSettings,
};
