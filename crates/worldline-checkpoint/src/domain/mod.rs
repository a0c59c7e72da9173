//! Domain layer for the checkpoint context.

pub mod background;
pub mod commands;
pub mod retention;
pub mod store;
