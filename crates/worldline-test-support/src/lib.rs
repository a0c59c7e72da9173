//! Shared test doubles and fixtures for the Worldline narrative engine.

mod clock;
mod fixtures;
mod generator;
mod ids;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use fixtures::{node, segment, snapshot};
pub use generator::ScriptedGenerator;
pub use ids::SequentialIds;
pub use repository::{
    EmptyCheckpointRepository, FailingCheckpointRepository, RecordingCheckpointRepository,
};
