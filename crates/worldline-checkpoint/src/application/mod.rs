//! Application layer for the checkpoint context.

pub mod command_handlers;
pub mod flush;
pub mod query_handlers;
