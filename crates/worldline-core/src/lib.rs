//! Worldline Core: shared checkpoint model and abstractions.
//!
//! This crate defines the checkpoint data model and the traits every other
//! crate depends on: time, identifier generation, durable storage and the
//! narrative generation collaborator. It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod generator;
pub mod ids;
pub mod model;
pub mod repository;
