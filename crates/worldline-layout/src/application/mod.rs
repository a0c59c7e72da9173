//! Application layer for the layout context.

pub mod command_handlers;
pub mod query_handlers;
