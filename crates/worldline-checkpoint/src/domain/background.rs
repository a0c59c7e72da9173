//! Recovers segment backgrounds that were trimmed from stored nodes.
//!
//! Only the freshest node keeps an oversized background, so older checkpoints
//! borrow the nearest ancestor's image when displayed.

use std::collections::HashSet;

use worldline_core::model::Node;

/// Returns the background to show for `node`: its own, or the closest
/// ancestor's within the same session.
///
/// Walks `parent_id` links until a node carrying a background is found, the
/// chain leaves the stored set (an evicted ancestor), or a story id repeats.
#[must_use]
pub fn resolve_background<'a>(nodes: &'a [Node], node: &'a Node) -> Option<&'a str> {
    let mut visited = HashSet::new();
    let mut current = node;
    loop {
        if let Some(background) = current
            .snapshot
            .current_segment
            .as_ref()
            .and_then(|segment| segment.background.as_deref())
        {
            return Some(background);
        }
        if !visited.insert(current.story_id.as_str()) {
            return None;
        }
        let parent_id = current.parent_id.as_deref()?;
        current = nodes
            .iter()
            .find(|n| n.session_id == current.session_id && n.story_id == parent_id)?;
    }
}
