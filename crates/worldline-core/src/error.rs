//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No checkpoint node with the given identifier exists.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// An imported payload matched none of the known export shapes.
    #[error("unrecognized import format: {0}")]
    UnrecognizedFormat(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
