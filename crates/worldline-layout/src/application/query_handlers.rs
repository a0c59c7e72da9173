//! Query handlers for the layout context.

use tracing::debug;
use worldline_core::model::Node;

use crate::domain::engine::{GraphLayout, LayoutConfig, compute_layout};
use crate::domain::overrides::PositionOverrides;

/// Computes the graph layout of `nodes`, optionally focused on one session.
#[must_use]
pub fn get_layout(
    nodes: &[Node],
    session_id: Option<&str>,
    overrides: &PositionOverrides,
    config: &LayoutConfig,
) -> GraphLayout {
    let layout = compute_layout(nodes, session_id, overrides, config);
    debug!(
        session_id = session_id.unwrap_or("*"),
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        pinned = overrides.len(),
        "layout computed"
    );
    layout
}

#[cfg(test)]
mod tests {
    use worldline_core::model::SaveType;
    use worldline_test_support::node;

    use super::*;

    #[test]
    fn test_get_layout_of_empty_store_is_empty() {
        let layout = get_layout(&[], None, &PositionOverrides::default(), &LayoutConfig::default());

        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn test_get_layout_links_chain() {
        let nodes = vec![
            node("n2", "s1", &["b1", "b2"], SaveType::Auto),
            node("n1", "s1", &["b1"], SaveType::Auto),
        ];

        let layout = get_layout(&nodes, Some("s1"), &PositionOverrides::default(), &LayoutConfig::default());

        assert_eq!(layout.edges.len(), 1);
        assert_eq!(layout.edges[0].from, "n1");
        assert_eq!(layout.edges[0].to, "n2");
    }
}
