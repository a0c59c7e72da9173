//! Worldline: checkpoint context.
//!
//! Responsible for storing checkpoints with merge/overwrite semantics,
//! retention, regenerated beat variants, background recovery along the parent
//! chain, and scheduling durable writes.

pub mod application;
pub mod domain;
