//! Domain layer for the layout context.

pub mod commands;
pub mod engine;
pub mod overrides;
