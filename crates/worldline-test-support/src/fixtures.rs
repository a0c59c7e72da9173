//! Node and snapshot fixtures.

use worldline_core::model::{Node, NodeMetadata, Protagonist, SaveType, Segment, Snapshot};

use crate::clock::fixed_now;

/// A segment with the given id and placeholder prose.
#[must_use]
pub fn segment(id: &str) -> Segment {
    Segment {
        choices: vec!["Go on".to_owned(), "Turn back".to_owned()],
        location: format!("{id}-place"),
        ..Segment::new(id, format!("text of {id}"))
    }
}

/// A snapshot of `session_id` whose history is `beats` and whose current
/// beat is the last of them. An empty `beats` yields a setup snapshot.
#[must_use]
pub fn snapshot(session_id: &str, beats: &[&str]) -> Snapshot {
    let history: Vec<Segment> = beats.iter().map(|id| segment(id)).collect();
    Snapshot {
        session_id: session_id.to_owned(),
        protagonist: Protagonist {
            name: "Ayla".to_owned(),
            description: "a wandering cartographer".to_owned(),
            portrait: None,
        },
        current_segment: history.last().cloned(),
        history,
        ..Snapshot::default()
    }
}

/// A stored node with id `id` capturing the last of `beats` in `session_id`.
#[must_use]
pub fn node(id: &str, session_id: &str, beats: &[&str], save_type: SaveType) -> Node {
    Node::from_snapshot(
        id.to_owned(),
        snapshot(session_id, beats),
        save_type,
        NodeMetadata {
            summary: format!("summary of {id}"),
            choice_label: Some("Go on".to_owned()),
            ..NodeMetadata::default()
        },
        fixed_now(),
    )
}
