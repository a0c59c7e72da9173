//! Query handlers for the checkpoint context.
//!
//! Read-only views over the [`NodeStore`]; nothing here mutates or flushes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use worldline_core::error::DomainError;
use worldline_core::model::{Node, SaveType};

use crate::domain::background::resolve_background;
use crate::domain::store::NodeStore;

/// List entry for one checkpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummaryView {
    /// Node identifier.
    pub id: String,
    /// World-line the node belongs to.
    pub session_id: String,
    /// Beat captured by the node.
    pub story_id: String,
    /// Preceding beat, if any.
    pub parent_id: Option<String>,
    /// When the checkpoint was written.
    pub timestamp: DateTime<Utc>,
    /// What triggered the checkpoint.
    #[serde(rename = "type")]
    pub save_type: SaveType,
    /// Short summary.
    pub summary: String,
    /// Location at the time of the checkpoint.
    pub location: String,
    /// Option picked to reach this beat.
    pub choice_label: Option<String>,
    /// Number of regenerated renderings of the current beat.
    pub version_count: usize,
    /// Whether this is the checkpoint currently loaded for play.
    pub is_loaded: bool,
}

impl NodeSummaryView {
    fn from_node(node: &Node, loaded: Option<&str>) -> Self {
        Self {
            id: node.id.clone(),
            session_id: node.session_id.clone(),
            story_id: node.story_id.clone(),
            parent_id: node.parent_id.clone(),
            timestamp: node.timestamp,
            save_type: node.save_type,
            summary: node.metadata.summary.clone(),
            location: node.metadata.location.clone(),
            choice_label: node.metadata.choice_label.clone(),
            version_count: node
                .snapshot
                .current_segment
                .as_ref()
                .map_or(0, worldline_core::model::Segment::version_count),
            is_loaded: loaded == Some(node.id.as_str()),
        }
    }
}

/// Lists checkpoints, most recent first, optionally restricted to one
/// session.
#[must_use]
pub fn list_nodes(store: &NodeStore, session_id: Option<&str>) -> Vec<NodeSummaryView> {
    let loaded = store.loaded_node_id();
    let nodes = match session_id {
        Some(session_id) => store.list_by_session(session_id),
        None => store.list().iter().collect(),
    };
    nodes
        .into_iter()
        .map(|node| NodeSummaryView::from_node(node, loaded))
        .collect()
}

/// Resolves the background to display for a node, borrowing from ancestors
/// when its own was trimmed.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` for an unknown node.
pub fn get_background(store: &NodeStore, node_id: &str) -> Result<Option<String>, DomainError> {
    let node = store
        .get(node_id)
        .ok_or_else(|| DomainError::NodeNotFound(node_id.to_owned()))?;
    Ok(resolve_background(store.list(), node).map(str::to_owned))
}

/// Exports one checkpoint in the full-checkpoint shape, portrait included.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` for an unknown node.
pub fn export_node(store: &NodeStore, node_id: &str) -> Result<Node, DomainError> {
    store.hydrated(node_id)
}

/// Exports a session in the bulk-backup shape, oldest node first.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` (carrying the session id) if the
/// session has no nodes.
pub fn export_session(
    store: &NodeStore,
    session_id: &str,
    strip_assets: bool,
) -> Result<Vec<Node>, DomainError> {
    let nodes = store.export_session(session_id, strip_assets);
    if nodes.is_empty() {
        return Err(DomainError::NodeNotFound(session_id.to_owned()));
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use worldline_core::repository::PersistedStore;
    use worldline_test_support::node;

    use super::*;
    use crate::domain::store::StoreSettings;

    fn store_with(nodes: Vec<Node>) -> NodeStore {
        NodeStore::from_persisted(
            PersistedStore {
                nodes,
                portraits: BTreeMap::from([("s1".to_owned(), "portrait".to_owned())]),
                ..PersistedStore::default()
            },
            StoreSettings::default(),
        )
    }

    #[test]
    fn test_list_nodes_filters_by_session_and_marks_loaded() {
        // Arrange
        let mut store = store_with(vec![
            node("a1", "s1", &["b1"], SaveType::Auto),
            node("x1", "s2", &["b1"], SaveType::Auto),
        ]);
        store.load("a1").unwrap();

        // Act
        let all = list_nodes(&store, None);
        let only_s2 = list_nodes(&store, Some("s2"));

        // Assert
        assert_eq!(all.len(), 2);
        assert!(all[0].is_loaded);
        assert!(!all[1].is_loaded);
        assert_eq!(only_s2.len(), 1);
        assert_eq!(only_s2[0].id, "x1");
    }

    #[test]
    fn test_get_background_inherits_from_parent() {
        let mut parent = node("p", "s1", &["b1"], SaveType::Auto);
        if let Some(segment) = parent.snapshot.current_segment.as_mut() {
            segment.background = Some("bg".to_owned());
        }
        let store = store_with(vec![node("c", "s1", &["b1", "b2"], SaveType::Auto), parent]);

        assert_eq!(get_background(&store, "c").unwrap().as_deref(), Some("bg"));
        assert!(matches!(
            get_background(&store, "nope"),
            Err(DomainError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_export_node_reattaches_portrait() {
        let store = store_with(vec![node("a1", "s1", &["b1"], SaveType::Manual)]);

        let exported = export_node(&store, "a1").unwrap();

        assert_eq!(exported.snapshot.protagonist.portrait.as_deref(), Some("portrait"));
    }

    #[test]
    fn test_export_unknown_session_is_not_found() {
        let store = store_with(vec![]);

        assert!(export_session(&store, "ghost", false).is_err());
    }
}
