//! Application layer for the import context.

pub mod command_handlers;
