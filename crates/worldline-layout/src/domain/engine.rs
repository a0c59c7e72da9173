//! Forest layout for the checkpoint graph.
//!
//! Each session becomes a forest keyed by `story_id`. A node whose parent
//! does not resolve within its own session is a root, which is how
//! retention-evicted ancestors surface. Coordinates are computed by a
//! post-order walk that threads a [`Placement`] accumulator through the
//! recursion instead of mutating shared state:
//!
//! - a leaf takes the next row of its session's band;
//! - an internal node sits at the mean of its children;
//! - `x` is the node's index in its own history, with setup nodes pinned to
//!   the first column.
//!
//! Sessions are stacked top to bottom in order of most recent activity, each
//! separated by [`LayoutConfig::session_gap`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use worldline_core::model::{Node, SaveType};

use super::overrides::{Position, PositionOverrides};

/// Spacing constants for the layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Distance between consecutive history indices.
    pub column_spacing: f64,
    /// Distance between consecutive leaves.
    pub row_spacing: f64,
    /// Extra distance between the bands of two sessions.
    pub session_gap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_spacing: 250.0,
            row_spacing: 120.0,
            session_gap: 200.0,
        }
    }
}

/// A node with its final coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    /// Node id.
    pub id: String,
    /// Session the node belongs to.
    pub session_id: String,
    /// Story beat the node is keyed by.
    pub story_id: String,
    /// Column coordinate, from the node's depth in its story history.
    pub x: f64,
    /// Row coordinate, from the node's place among its session's leaves.
    pub y: f64,
    /// What triggered the save.
    #[serde(rename = "type")]
    pub save_type: SaveType,
    /// Display summary.
    pub summary: String,
    /// True when the node's parent is absent or not stored in its session.
    pub is_root: bool,
}

/// A parent-to-child link between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    /// Parent node id.
    pub from: String,
    /// Child node id.
    pub to: String,
    /// The child was reached by free-form input rather than an offered option.
    pub is_freeform: bool,
}

/// Positioned nodes plus the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphLayout {
    /// Every laid out node, in input order.
    pub nodes: Vec<PositionedNode>,
    /// One edge per node whose parent was found in its session.
    pub edges: Vec<LayoutEdge>,
}

impl GraphLayout {
    /// Finds a positioned node by id.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }
}

/// Lays out `nodes` (most recent first), optionally only those of
/// `focus_session`. Overrides replace the final coordinates of the nodes
/// they name and have no effect on any other node.
///
/// Placement recurses once per chain link, so depth is bounded by the
/// number of nodes in a session, which retention caps.
#[must_use]
pub fn compute_layout(
    nodes: &[Node],
    focus_session: Option<&str>,
    overrides: &PositionOverrides,
    config: &LayoutConfig,
) -> GraphLayout {
    let visible: Vec<&Node> = nodes
        .iter()
        .filter(|node| focus_session.is_none_or(|s| node.session_id == s))
        .collect();

    let mut ys: Vec<f64> = vec![0.0; visible.len()];
    let mut roots: HashSet<usize> = HashSet::new();
    let mut parent_of: HashMap<usize, usize> = HashMap::new();
    let mut band_top = 0.0;

    for session_id in sessions_by_recency(&visible) {
        let forest = SessionForest::build(&visible, session_id);
        let placement = forest.place_all(band_top, config);
        for (index, y) in placement.ys {
            ys[index] = y;
        }
        roots.extend(forest.roots.iter().copied());
        roots.extend(placement.extra_roots);
        parent_of.extend(
            forest
                .children
                .iter()
                .flat_map(|(&parent, kids)| kids.iter().map(move |&kid| (kid, parent))),
        );
        band_top += scaled(placement.next_leaf, config.row_spacing) + config.session_gap;
    }

    let positioned = visible
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let computed = Position {
                x: column_of(node, config),
                y: ys[index],
            };
            let position = overrides.get(&node.id).unwrap_or(computed);
            PositionedNode {
                id: node.id.clone(),
                session_id: node.session_id.clone(),
                story_id: node.story_id.clone(),
                x: position.x,
                y: position.y,
                save_type: node.save_type,
                summary: node.metadata.summary.clone(),
                is_root: roots.contains(&index),
            }
        })
        .collect();

    let edges = visible
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let parent = parent_of.get(&index)?;
            Some(LayoutEdge {
                from: visible[*parent].id.clone(),
                to: node.id.clone(),
                is_freeform: node.is_freeform_transition(),
            })
        })
        .collect();

    GraphLayout {
        nodes: positioned,
        edges,
    }
}

fn sessions_by_recency<'a>(nodes: &[&'a Node]) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .map(|node| node.session_id.as_str())
        .filter(|session_id| seen.insert(*session_id))
        .collect()
}

fn column_of(node: &Node, config: &LayoutConfig) -> f64 {
    if node.save_type == SaveType::Setup {
        0.0
    } else {
        scaled(node.snapshot.history_index(), config.column_spacing)
    }
}

fn scaled(count: usize, spacing: f64) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX)) * spacing
}

/// Parent/child adjacency for one session, by index into the visible list.
struct SessionForest {
    /// Members ordered oldest first.
    members: Vec<usize>,
    children: HashMap<usize, Vec<usize>>,
    roots: Vec<usize>,
}

/// Accumulator threaded through the post-order walk.
#[derive(Debug, Default)]
struct Placement {
    band_top: f64,
    next_leaf: usize,
    entered: HashSet<usize>,
    ys: HashMap<usize, f64>,
    extra_roots: Vec<usize>,
}

impl SessionForest {
    fn build(visible: &[&Node], session_id: &str) -> Self {
        let mut members: Vec<usize> = (0..visible.len())
            .rev()
            .filter(|&index| visible[index].session_id == session_id)
            .collect();
        members.sort_by_key(|&index| visible[index].timestamp);

        let mut by_story: HashMap<&str, usize> = HashMap::new();
        for &index in &members {
            by_story
                .entry(visible[index].story_id.as_str())
                .or_insert(index);
        }

        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for &index in &members {
            let parent = visible[index]
                .parent_id
                .as_deref()
                .and_then(|parent_id| by_story.get(parent_id).copied())
                .filter(|&parent| parent != index);
            match parent {
                Some(parent) => children.entry(parent).or_default().push(index),
                None => roots.push(index),
            }
        }

        Self {
            members,
            children,
            roots,
        }
    }

    fn place_all(&self, band_top: f64, config: &LayoutConfig) -> Placement {
        let mut acc = Placement {
            band_top,
            ..Placement::default()
        };
        for &root in &self.roots {
            acc = self.place(root, acc, config).1;
        }
        // Nodes caught in a parent cycle are unreachable from any root.
        for &index in &self.members {
            if !acc.entered.contains(&index) {
                acc.extra_roots.push(index);
                acc = self.place(index, acc, config).1;
            }
        }
        acc
    }

    fn place(&self, index: usize, mut acc: Placement, config: &LayoutConfig) -> (f64, Placement) {
        acc.entered.insert(index);

        let mut child_ys = Vec::new();
        for &child in self.children.get(&index).map_or(&[][..], Vec::as_slice) {
            if acc.entered.contains(&child) {
                continue;
            }
            let (y, next) = self.place(child, acc, config);
            acc = next;
            child_ys.push(y);
        }

        let y = if child_ys.is_empty() {
            let y = acc.band_top + scaled(acc.next_leaf, config.row_spacing);
            acc.next_leaf += 1;
            y
        } else {
            child_ys.iter().sum::<f64>() / scaled(child_ys.len(), 1.0)
        };
        acc.ys.insert(index, y);
        (y, acc)
    }
}
