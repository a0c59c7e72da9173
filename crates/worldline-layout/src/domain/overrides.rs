//! Manually placed node positions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A point on the layout canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Sparse map from node id to a user-chosen position.
///
/// An entry replaces that node's computed coordinates and nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionOverrides {
    positions: HashMap<String, Position>,
}

impl PositionOverrides {
    /// Pins `node_id` at `position`, returning the previous pin if any.
    pub fn set(&mut self, node_id: impl Into<String>, position: Position) -> Option<Position> {
        self.positions.insert(node_id.into(), position)
    }

    /// Removes the pin for `node_id`, returning it if one existed.
    pub fn clear(&mut self, node_id: &str) -> Option<Position> {
        self.positions.remove(node_id)
    }

    #[must_use]
    pub fn get(&self, node_id: &str) -> Option<Position> {
        self.positions.get(node_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Drops pins for nodes that no longer exist. Returns how many were
    /// removed.
    pub fn retain_nodes<'a>(&mut self, live_ids: impl IntoIterator<Item = &'a str>) -> usize {
        let live: HashSet<&str> = live_ids.into_iter().collect();
        let before = self.positions.len();
        self.positions.retain(|id, _| live.contains(id.as_str()));
        before - self.positions.len()
    }
}
