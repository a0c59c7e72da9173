//! Worldline: import context.
//!
//! Responsible for classifying exported payloads, rebuilding checkpoint
//! chains from flattened exports and feeding the results through the
//! checkpoint store's duplicate-checked insertion path.

pub mod application;
pub mod domain;
