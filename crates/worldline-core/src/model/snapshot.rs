//! Full game-state snapshot captured by a checkpoint.

use serde::{Deserialize, Serialize};

use super::segment::Segment;

/// Story id used by SETUP checkpoints, which capture no narrative beat.
pub const SETUP_STORY_ID: &str = "setup";

/// The player character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protagonist {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form description used by the generation service.
    #[serde(default)]
    pub description: String,
    /// Portrait image. Held in the store's side dictionary rather than on
    /// stored nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
}

/// World configuration chosen at setup time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSettings {
    /// Story title.
    #[serde(default)]
    pub title: String,
    /// Genre label.
    #[serde(default)]
    pub genre: String,
    /// Opening premise.
    #[serde(default)]
    pub premise: String,
    /// Narrative tone.
    #[serde(default)]
    pub tone: String,
}

/// A supporting character and the protagonist's standing with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    /// Display name.
    pub name: String,
    /// Role in the story.
    #[serde(default)]
    pub role: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Relationship affinity towards the protagonist.
    #[serde(default)]
    pub affinity: i32,
}

/// A story event scheduled to be fulfilled by a later beat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    /// Event identifier reported back by the generation service.
    pub id: String,
    /// What should happen.
    #[serde(default)]
    pub description: String,
    /// Whether a beat has already fulfilled the event.
    #[serde(default)]
    pub fulfilled: bool,
}

/// Long-term memory carried between beats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    /// Rolling summary of the story so far.
    #[serde(default)]
    pub summary: String,
    /// Facts the narrator must keep consistent.
    #[serde(default)]
    pub facts: Vec<String>,
    /// Pending and fulfilled story events.
    #[serde(default)]
    pub scheduled_events: Vec<ScheduledEvent>,
}

/// A complete copy of game state at one checkpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// World-line this state belongs to.
    pub session_id: String,
    /// The player character.
    #[serde(default)]
    pub protagonist: Protagonist,
    /// World configuration.
    #[serde(default)]
    pub world: WorldSettings,
    /// Supporting characters.
    #[serde(default)]
    pub supporting_cast: Vec<CastMember>,
    /// Long-term memory.
    #[serde(default)]
    pub memory: MemoryState,
    /// Every beat up to and including the current one.
    #[serde(default)]
    pub history: Vec<Segment>,
    /// The beat this snapshot was taken at; `None` before the story starts.
    #[serde(default)]
    pub current_segment: Option<Segment>,
}

impl Snapshot {
    /// The story id a checkpoint of this snapshot is keyed by.
    #[must_use]
    pub fn story_id(&self) -> &str {
        self.current_segment
            .as_ref()
            .map_or(SETUP_STORY_ID, |segment| segment.id.as_str())
    }

    /// Position of the current beat within `history`.
    ///
    /// Falls back to the last history index when the current beat is not
    /// (yet) recorded in history, and to 0 for an empty history.
    #[must_use]
    pub fn history_index(&self) -> usize {
        let story_id = self.story_id();
        self.history
            .iter()
            .position(|segment| segment.id == story_id)
            .unwrap_or_else(|| self.history.len().saturating_sub(1))
    }

    /// The story id of the beat preceding the current one, if any.
    #[must_use]
    pub fn parent_story_id(&self) -> Option<String> {
        let current = self.current_segment.as_ref()?;
        match self.history.iter().position(|s| s.id == current.id) {
            Some(0) => None,
            Some(index) => Some(self.history[index - 1].id.clone()),
            None => self.history.last().map(|s| s.id.clone()),
        }
    }

    /// Copies the current segment over its entry in `history` so both views
    /// agree after a regeneration or version switch.
    pub fn sync_current_into_history(&mut self) {
        let Some(current) = self.current_segment.as_ref() else {
            return;
        };
        if let Some(entry) = self.history.iter_mut().find(|s| s.id == current.id) {
            entry.clone_from(current);
        }
    }

    /// Removes and returns the protagonist portrait.
    pub fn take_portrait(&mut self) -> Option<String> {
        self.protagonist.portrait.take()
    }

    /// Drops oversized backgrounds from the current segment and history.
    /// Returns the number of assets removed.
    pub fn strip_backgrounds_over(&mut self, limit: usize) -> usize {
        let mut removed = self
            .current_segment
            .as_mut()
            .map_or(0, |segment| segment.strip_backgrounds_over(limit));
        for segment in &mut self.history {
            removed += segment.strip_backgrounds_over(limit);
        }
        removed
    }

    /// Drops every background regardless of size.
    pub fn strip_all_backgrounds(&mut self) {
        self.strip_backgrounds_over(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(history: &[&str], current: Option<&str>) -> Snapshot {
        Snapshot {
            session_id: "s1".to_owned(),
            history: history.iter().map(|id| Segment::new(*id, "")).collect(),
            current_segment: current.map(|id| Segment::new(id, "")),
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_story_id_falls_back_to_setup_without_segment() {
        let snapshot = snapshot_with(&[], None);

        assert_eq!(snapshot.story_id(), SETUP_STORY_ID);
        assert_eq!(snapshot.parent_story_id(), None);
    }

    #[test]
    fn test_parent_story_id_is_previous_history_entry() {
        let snapshot = snapshot_with(&["b1", "b2", "b3"], Some("b3"));

        assert_eq!(snapshot.parent_story_id().as_deref(), Some("b2"));
        assert_eq!(snapshot.history_index(), 2);
    }

    #[test]
    fn test_first_beat_has_no_parent() {
        let snapshot = snapshot_with(&["b1"], Some("b1"));

        assert_eq!(snapshot.parent_story_id(), None);
        assert_eq!(snapshot.history_index(), 0);
    }

    #[test]
    fn test_current_beat_missing_from_history_hangs_off_last_entry() {
        let snapshot = snapshot_with(&["b1", "b2"], Some("b3"));

        assert_eq!(snapshot.parent_story_id().as_deref(), Some("b2"));
    }

    #[test]
    fn test_sync_current_into_history_overwrites_matching_entry() {
        // Arrange
        let mut snapshot = snapshot_with(&["b1", "b2"], Some("b2"));
        if let Some(current) = snapshot.current_segment.as_mut() {
            current.text = "rewritten".to_owned();
        }

        // Act
        snapshot.sync_current_into_history();

        // Assert
        assert_eq!(snapshot.history[1].text, "rewritten");
        assert_eq!(snapshot.history[0].text, "");
    }
}
