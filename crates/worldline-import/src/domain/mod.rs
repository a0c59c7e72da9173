//! Domain layer for the import context.

pub mod commands;
pub mod payload;
pub mod reconstruct;
