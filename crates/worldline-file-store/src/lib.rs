//! Durable storage for the Worldline checkpoint store.
//!
//! The whole store is one JSON document; every flush rewrites it.

pub mod file_checkpoint_repository;
