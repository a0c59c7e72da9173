//! Narrative beats and their regenerated variants.
//!
//! A [`Segment`] always exposes exactly one "live" rendering through its
//! top-level fields. Alternate renderings produced by regeneration are kept in
//! `versions`, which is either empty or holds at least two entries: the first
//! regeneration seeds it with the original rendering and the new variant at
//! once.

use serde::{Deserialize, Serialize};

/// One rendering of a narrative beat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentVersion {
    /// Narrative prose.
    #[serde(default)]
    pub text: String,
    /// Options offered to the player after this beat.
    #[serde(default)]
    pub choices: Vec<String>,
    /// Prompt handed to the image service.
    #[serde(default)]
    pub visual_prompt: String,
    /// Mood tag used for music/ambience selection.
    #[serde(default)]
    pub mood: String,
    /// Location name shown with the beat.
    #[serde(default)]
    pub location: String,
    /// Rendered background image (usually a data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Direction for cycling through a segment's versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionDirection {
    /// Move to the previous version, wrapping to the last.
    Prev,
    /// Move to the next version, wrapping to the first.
    Next,
}

/// One beat of narrative content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Stable beat identifier; becomes the `storyId` of checkpoints that
    /// capture this beat.
    pub id: String,
    /// Narrative prose.
    #[serde(default)]
    pub text: String,
    /// Options offered to the player after this beat.
    #[serde(default)]
    pub choices: Vec<String>,
    /// Prompt handed to the image service.
    #[serde(default)]
    pub visual_prompt: String,
    /// Mood tag used for music/ambience selection.
    #[serde(default)]
    pub mood: String,
    /// Location name shown with the beat.
    #[serde(default)]
    pub location: String,
    /// Rendered background image (usually a data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Alternate renderings; empty until the beat is first regenerated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<SegmentVersion>,
    /// Index into `versions` of the rendering mirrored by the live fields.
    #[serde(default)]
    pub current_version_index: usize,
}

impl Segment {
    /// Creates a segment with the given identifier and prose.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Returns the live fields as a standalone version.
    #[must_use]
    pub fn live_version(&self) -> SegmentVersion {
        SegmentVersion {
            text: self.text.clone(),
            choices: self.choices.clone(),
            visual_prompt: self.visual_prompt.clone(),
            mood: self.mood.clone(),
            location: self.location.clone(),
            background: self.background.clone(),
        }
    }

    fn apply_version(&mut self, version: &SegmentVersion) {
        self.text.clone_from(&version.text);
        self.choices.clone_from(&version.choices);
        self.visual_prompt.clone_from(&version.visual_prompt);
        self.mood.clone_from(&version.mood);
        self.location.clone_from(&version.location);
        self.background.clone_from(&version.background);
    }

    /// Number of stored versions (0 when never regenerated).
    #[must_use]
    pub fn version_count(&self) -> usize {
        self.versions.len()
    }

    /// Appends a regenerated rendering and makes it the live one.
    ///
    /// The first regeneration snapshots the current live fields as version 0
    /// before appending, so `versions` goes from empty to two entries in one
    /// call.
    pub fn regenerate(&mut self, variant: SegmentVersion) {
        if self.versions.is_empty() {
            self.versions.push(self.live_version());
        }
        self.versions.push(variant);
        self.current_version_index = self.versions.len() - 1;
        let active = self.versions[self.current_version_index].clone();
        self.apply_version(&active);
    }

    /// Cycles to the neighbouring version and copies it onto the live fields.
    ///
    /// Returns `false` (and changes nothing) when fewer than two versions
    /// exist.
    pub fn switch_version(&mut self, direction: VersionDirection) -> bool {
        let count = self.versions.len();
        if count < 2 {
            return false;
        }
        let current = self.current_version_index.min(count - 1);
        let target = match direction {
            VersionDirection::Next => (current + 1) % count,
            VersionDirection::Prev => (current + count - 1) % count,
        };
        self.current_version_index = target;
        let active = self.versions[target].clone();
        self.apply_version(&active);
        true
    }

    /// Drops every background (live and versioned) longer than `limit`
    /// bytes. Returns the number of assets removed.
    pub fn strip_backgrounds_over(&mut self, limit: usize) -> usize {
        let mut removed = 0;
        if self.background.as_ref().is_some_and(|b| b.len() > limit) {
            self.background = None;
            removed += 1;
        }
        for version in &mut self.versions {
            if version.background.as_ref().is_some_and(|b| b.len() > limit) {
                version.background = None;
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(text: &str) -> SegmentVersion {
        SegmentVersion {
            text: text.to_owned(),
            choices: vec![format!("after {text}")],
            mood: "tense".to_owned(),
            ..SegmentVersion::default()
        }
    }

    #[test]
    fn test_first_regenerate_seeds_original_and_variant() {
        // Arrange
        let mut segment = Segment::new("b1", "The door creaks open.");

        // Act
        segment.regenerate(variant("The door bursts apart."));

        // Assert
        assert_eq!(segment.version_count(), 2);
        assert_eq!(segment.versions[0].text, "The door creaks open.");
        assert_eq!(segment.current_version_index, 1);
        assert_eq!(segment.text, "The door bursts apart.");
        assert_eq!(segment.choices, vec!["after The door bursts apart.".to_owned()]);
    }

    #[test]
    fn test_later_regenerate_appends_single_version() {
        // Arrange
        let mut segment = Segment::new("b1", "one");
        segment.regenerate(variant("two"));

        // Act
        segment.regenerate(variant("three"));

        // Assert
        assert_eq!(segment.version_count(), 3);
        assert_eq!(segment.current_version_index, 2);
        assert_eq!(segment.text, "three");
    }

    #[test]
    fn test_switch_version_is_noop_without_versions() {
        let mut segment = Segment::new("b1", "only");

        let switched = segment.switch_version(VersionDirection::Next);

        assert!(!switched);
        assert_eq!(segment.text, "only");
        assert_eq!(segment.current_version_index, 0);
    }

    #[test]
    fn test_switch_version_wraps_in_both_directions() {
        // Arrange
        let mut segment = Segment::new("b1", "one");
        segment.regenerate(variant("two"));
        segment.regenerate(variant("three"));

        // Act / Assert
        segment.switch_version(VersionDirection::Next);
        assert_eq!(segment.current_version_index, 0);
        assert_eq!(segment.text, "one");

        segment.switch_version(VersionDirection::Prev);
        assert_eq!(segment.current_version_index, 2);
        assert_eq!(segment.text, "three");
    }

    #[test]
    fn test_full_cycle_returns_to_starting_version() {
        for direction in [VersionDirection::Next, VersionDirection::Prev] {
            // Arrange
            let mut segment = Segment::new("b1", "one");
            segment.regenerate(variant("two"));
            segment.regenerate(variant("three"));
            segment.regenerate(variant("four"));
            segment.switch_version(VersionDirection::Prev);
            let before = segment.clone();

            // Act
            for _ in 0..segment.version_count() {
                segment.switch_version(direction);
            }

            // Assert
            assert_eq!(segment, before);
        }
    }

    #[test]
    fn test_strip_backgrounds_only_removes_oversized_assets() {
        // Arrange
        let mut segment = Segment::new("b1", "one");
        segment.background = Some("x".repeat(10));
        segment.regenerate(SegmentVersion {
            background: Some("tiny".to_owned()),
            ..variant("two")
        });

        // Act
        let removed = segment.strip_backgrounds_over(5);

        // Assert
        assert_eq!(removed, 1);
        assert_eq!(segment.background.as_deref(), Some("tiny"));
        assert!(segment.versions[0].background.is_none());
    }
}
