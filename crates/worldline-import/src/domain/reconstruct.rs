//! Rebuilding checkpoint chains from flattened exports.
//!
//! An exported checkpoint carries only its own record plus the linear history
//! that led to it. The intermediate checkpoints are rebuilt here, one per
//! history entry, linked by `parent_id`.

use chrono::TimeDelta;
use worldline_core::clock::Clock;
use worldline_core::ids::IdGenerator;
use worldline_core::model::{Node, NodeMetadata, SaveType, Segment, Snapshot};

use super::payload::ConfigurationPayload;

/// Seconds between the timestamps of consecutive reconstructed checkpoints.
pub const RECONSTRUCTION_STEP_SECONDS: i64 = 1;

const SUMMARY_EXCERPT_CHARS: usize = 80;

/// Rebuilds the chain of checkpoints leading to `export`, oldest first.
///
/// Entry `i` of the exported history becomes a node whose history is
/// `history[..=i]`, whose current beat is that entry and whose parent is
/// entry `i - 1`. Timestamps step backward from the export's own. The last
/// node keeps the export's id, type and display metadata.
#[must_use]
pub fn reconstruct_chain(export: &Node, ids: &dyn IdGenerator) -> Vec<Node> {
    let history = &export.snapshot.history;
    let last = history.len().saturating_sub(1);

    history
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let snapshot = Snapshot {
                session_id: export.session_id.clone(),
                history: history[..=index].to_vec(),
                current_segment: Some(entry.clone()),
                ..export.snapshot.clone()
            };
            let steps_back = i64::try_from(last - index).unwrap_or(i64::MAX);
            let is_head = index == last;
            Node {
                id: if is_head {
                    export.id.clone()
                } else {
                    ids.next_id()
                },
                session_id: export.session_id.clone(),
                story_id: entry.id.clone(),
                parent_id: index.checked_sub(1).map(|prev| history[prev].id.clone()),
                timestamp: export.timestamp
                    - TimeDelta::seconds(RECONSTRUCTION_STEP_SECONDS.saturating_mul(steps_back)),
                save_type: if is_head {
                    export.save_type
                } else {
                    SaveType::Auto
                },
                snapshot,
                metadata: if is_head {
                    export.metadata.clone()
                } else {
                    metadata_for(entry)
                },
            }
        })
        .collect()
}

fn metadata_for(entry: &Segment) -> NodeMetadata {
    let mut summary: String = entry.text.chars().take(SUMMARY_EXCERPT_CHARS).collect();
    if entry.text.chars().count() > SUMMARY_EXCERPT_CHARS {
        summary.push('…');
    }
    NodeMetadata {
        summary,
        location: entry.location.clone(),
        choice_label: None,
        choice_text: None,
    }
}

/// Builds a brand-new setup checkpoint in a fresh session from configuration
/// data.
#[must_use]
pub fn synthesize_setup(
    config: ConfigurationPayload,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
) -> Node {
    let id = ids.next_id();
    let session_id = ids.next_id();
    let summary = if config.world.title.is_empty() {
        format!("Setup: {}", config.protagonist.name)
    } else {
        format!("Setup: {}", config.world.title)
    };
    let snapshot = Snapshot {
        session_id,
        protagonist: config.protagonist,
        world: config.world,
        supporting_cast: config.supporting_cast,
        ..Snapshot::default()
    };
    Node::from_snapshot(
        id,
        snapshot,
        SaveType::Setup,
        NodeMetadata {
            summary,
            ..NodeMetadata::default()
        },
        clock.now(),
    )
}

#[cfg(test)]
mod tests {
    use worldline_core::model::{Protagonist, SETUP_STORY_ID};
    use worldline_test_support::{FixedClock, SequentialIds, fixed_now, node};

    use super::*;

    fn exported() -> Node {
        let mut export = node("head", "s1", &["b1", "b2", "b3", "b4"], SaveType::Manual);
        export.metadata = NodeMetadata {
            summary: "At the lighthouse".to_owned(),
            location: "Lighthouse".to_owned(),
            choice_label: Some("Climb".to_owned()),
            choice_text: Some("Climb the spiral stair".to_owned()),
        };
        export
    }

    #[test]
    fn test_reconstructs_one_node_per_history_entry() {
        // Arrange
        let export = exported();
        let ids = SequentialIds::new("r");

        // Act
        let chain = reconstruct_chain(&export, &ids);

        // Assert
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].parent_id, None);
        for pair in chain.windows(2) {
            assert_eq!(pair[1].parent_id.as_deref(), Some(pair[0].story_id.as_str()));
        }
        for (index, node) in chain.iter().enumerate() {
            assert_eq!(node.snapshot.history.len(), index + 1);
            assert_eq!(
                node.snapshot.current_segment.as_ref().map(|s| s.id.as_str()),
                Some(node.story_id.as_str())
            );
        }
    }

    #[test]
    fn test_head_inherits_export_identity_and_metadata() {
        let export = exported();
        let ids = SequentialIds::new("r");

        let chain = reconstruct_chain(&export, &ids);

        let head = chain.last().unwrap();
        assert_eq!(head.id, "head");
        assert_eq!(head.save_type, SaveType::Manual);
        assert_eq!(head.metadata, export.metadata);
        assert_eq!(head.timestamp, export.timestamp);
        assert_eq!(head.snapshot, export.snapshot);
        assert!(chain[..3].iter().all(|n| n.save_type == SaveType::Auto));
    }

    #[test]
    fn test_timestamps_step_backward_from_export() {
        let export = exported();
        let ids = SequentialIds::new("r");

        let chain = reconstruct_chain(&export, &ids);

        assert_eq!(chain[0].timestamp, fixed_now() - TimeDelta::seconds(3));
        for pair in chain.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_long_beats_are_excerpted_for_summary() {
        let mut export = exported();
        export.snapshot.history[0].text = "x".repeat(200);
        let ids = SequentialIds::new("r");

        let chain = reconstruct_chain(&export, &ids);

        assert_eq!(chain[0].metadata.summary.chars().count(), SUMMARY_EXCERPT_CHARS + 1);
        assert_eq!(chain[0].metadata.location, "b1-place");
    }

    #[test]
    fn test_synthesize_setup_creates_fresh_session() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let ids = SequentialIds::new("cfg");
        let config = ConfigurationPayload {
            protagonist: Protagonist {
                name: "Ren".to_owned(),
                ..Protagonist::default()
            },
            ..ConfigurationPayload::default()
        };

        // Act
        let setup = synthesize_setup(config, &clock, &ids);

        // Assert
        assert_eq!(setup.id, "cfg-1");
        assert_eq!(setup.session_id, "cfg-2");
        assert_eq!(setup.snapshot.session_id, "cfg-2");
        assert_eq!(setup.save_type, SaveType::Setup);
        assert_eq!(setup.story_id, SETUP_STORY_ID);
        assert!(setup.snapshot.history.is_empty());
        assert!(setup.snapshot.current_segment.is_none());
        assert_eq!(setup.metadata.summary, "Setup: Ren");
    }
}
