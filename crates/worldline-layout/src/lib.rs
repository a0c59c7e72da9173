//! Worldline: layout context.
//!
//! Responsible for turning the flat checkpoint list into positioned nodes and
//! edges, one tree band per root and one stacked forest per session, and for
//! the sparse map of positions the user has dragged by hand.

pub mod application;
pub mod domain;
