//! The in-memory checkpoint store.
//!
//! Nodes live in one flat list ordered most recent first; parent/child links
//! are plain `story_id` back-references resolved by lookup. The store is the
//! single insertion path for both gameplay saves and imports, so the
//! `(session_id, story_id)` uniqueness invariant is enforced here.

use std::collections::BTreeMap;

use tracing::debug;
use worldline_core::clock::Clock;
use worldline_core::error::DomainError;
use worldline_core::ids::IdGenerator;
use worldline_core::model::{Node, NodeMetadata, SaveType, Segment, Snapshot};
use worldline_core::repository::PersistedStore;

use super::retention::RetentionPolicy;

/// Segment backgrounds longer than this many bytes are not kept on stored
/// nodes other than the one just written.
pub const DEFAULT_ASSET_INLINE_LIMIT: usize = 2_000;

/// Tunables for a [`NodeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreSettings {
    /// How many nodes survive an insert.
    pub retention: RetentionPolicy,
    /// Largest segment background, in bytes, kept on non-live nodes.
    pub asset_inline_limit: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::default(),
            asset_inline_limit: DEFAULT_ASSET_INLINE_LIMIT,
        }
    }
}

/// What a save did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new node was created with this id.
    Inserted(String),
    /// An existing node was overwritten in place.
    Merged(String),
    /// An `Auto` save hit a `Manual` node and was discarded.
    Skipped(String),
}

impl SaveOutcome {
    /// The id of the node inserted, merged or protected.
    #[must_use]
    pub fn node_id(&self) -> &str {
        match self {
            Self::Inserted(id) | Self::Merged(id) | Self::Skipped(id) => id,
        }
    }

    /// True unless the save was discarded.
    #[must_use]
    pub fn changed_store(&self) -> bool {
        !matches!(self, Self::Skipped(_))
    }
}

/// The checkpoint collection plus its side dictionary of portraits.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
    portraits: BTreeMap<String, String>,
    loaded_node_id: Option<String>,
    settings: StoreSettings,
    revision: u64,
}

impl NodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(settings: StoreSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Rebuilds a store from its persisted record, applying the current
    /// retention policy to it.
    #[must_use]
    pub fn from_persisted(persisted: PersistedStore, settings: StoreSettings) -> Self {
        let mut store = Self {
            nodes: persisted.nodes,
            portraits: persisted.portraits,
            loaded_node_id: None,
            settings,
            revision: persisted.revision,
        };
        store.enforce_retention();
        store
    }

    /// Returns the record to write to durable storage: portraits stay in the
    /// side dictionary and oversized backgrounds are dropped from every node.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedStore {
        let limit = self.settings.asset_inline_limit;
        let nodes = self
            .nodes
            .iter()
            .cloned()
            .map(|mut node| {
                node.snapshot.strip_backgrounds_over(limit);
                node
            })
            .collect();
        PersistedStore {
            nodes,
            portraits: self.portraits.clone(),
            revision: self.revision,
        }
    }

    /// Bumps the revision and returns the record to flush, so that a later
    /// mutation always produces a record that supersedes this one.
    pub fn next_record(&mut self) -> PersistedStore {
        self.revision += 1;
        self.to_persisted()
    }

    /// All nodes, most recent first.
    #[must_use]
    pub fn list(&self) -> &[Node] {
        &self.nodes
    }

    /// Nodes of one session, most recent first.
    #[must_use]
    pub fn list_by_session(&self, session_id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| node.session_id == session_id)
            .collect()
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn get(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    /// The portrait stored for a session.
    #[must_use]
    pub fn portrait(&self, session_id: &str) -> Option<&str> {
        self.portraits.get(session_id).map(String::as_str)
    }

    /// Id of the checkpoint most recently loaded for play.
    #[must_use]
    pub fn loaded_node_id(&self) -> Option<&str> {
        self.loaded_node_id.as_deref()
    }

    /// Saves a snapshot, merging into an existing node where one matches.
    ///
    /// The merge target is the node with the same `(session_id, story_id)`,
    /// or for `Setup` saves the session's existing setup node. Failing that,
    /// the currently loaded node is reused when its `story_id` matches.
    /// `Auto` saves never overwrite a `Manual` node.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a non-setup save carries no
    /// current segment, or a setup save carries one.
    pub fn save(
        &mut self,
        mut snapshot: Snapshot,
        save_type: SaveType,
        metadata: NodeMetadata,
        clock: &dyn Clock,
        ids: &dyn IdGenerator,
    ) -> Result<SaveOutcome, DomainError> {
        match (save_type, snapshot.current_segment.is_some()) {
            (SaveType::Setup, true) => {
                return Err(DomainError::Validation(
                    "setup saves must not carry a current segment".into(),
                ));
            }
            (SaveType::Auto | SaveType::Manual, false) => {
                return Err(DomainError::Validation(
                    "only setup saves may omit the current segment".into(),
                ));
            }
            _ => {}
        }

        let portrait = snapshot.take_portrait();
        let session_id = snapshot.session_id.clone();
        let story_id = snapshot.story_id().to_owned();

        let Some(index) = self.find_merge_target(&session_id, &story_id, save_type) else {
            let id = ids.next_id();
            let node = Node::from_snapshot(id.clone(), snapshot, save_type, metadata, clock.now());
            self.insert_front(node, portrait, true);
            return Ok(SaveOutcome::Inserted(id));
        };

        let existing = &self.nodes[index];
        if save_type == SaveType::Auto && existing.save_type == SaveType::Manual {
            debug!(node_id = %existing.id, "auto save skipped: manual checkpoint is protected");
            return Ok(SaveOutcome::Skipped(existing.id.clone()));
        }

        let id = existing.id.clone();
        self.nodes[index] =
            Node::from_snapshot(id.clone(), snapshot, save_type, metadata, clock.now());
        if let Some(portrait) = portrait {
            self.portraits.insert(session_id, portrait);
        }
        self.trim_assets(&id);
        Ok(SaveOutcome::Merged(id))
    }

    fn find_merge_target(
        &self,
        session_id: &str,
        story_id: &str,
        save_type: SaveType,
    ) -> Option<usize> {
        let direct = if save_type == SaveType::Setup {
            self.nodes
                .iter()
                .position(|n| n.session_id == session_id && n.save_type == SaveType::Setup)
        } else {
            self.nodes.iter().position(|n| n.occupies(session_id, story_id))
        };
        direct.or_else(|| {
            let loaded = self.loaded_node_id.as_deref()?;
            self.nodes
                .iter()
                .position(|n| n.id == loaded && n.story_id == story_id)
        })
    }

    /// Inserts a ready-made node unless it duplicates an existing one by `id`
    /// or by `(session_id, story_id)`. Returns whether it was inserted.
    ///
    /// Portraits carried by the node move into the side dictionary without
    /// replacing one the session already has.
    pub fn insert_if_absent(&mut self, mut node: Node) -> bool {
        let duplicate = self
            .nodes
            .iter()
            .any(|n| n.id == node.id || n.occupies(&node.session_id, &node.story_id));
        if duplicate {
            debug!(node_id = %node.id, "skipping duplicate node");
            return false;
        }
        let portrait = node.snapshot.take_portrait();
        self.insert_front(node, portrait, false);
        true
    }

    fn insert_front(&mut self, node: Node, portrait: Option<String>, replace_portrait: bool) {
        let id = node.id.clone();
        if let Some(portrait) = portrait {
            if replace_portrait {
                self.portraits.insert(node.session_id.clone(), portrait);
            } else {
                self.portraits
                    .entry(node.session_id.clone())
                    .or_insert(portrait);
            }
        }
        self.nodes.insert(0, node);
        self.trim_assets(&id);
        self.enforce_retention();
    }

    /// Drops oversized backgrounds from every node except `keep`.
    fn trim_assets(&mut self, keep: &str) {
        let limit = self.settings.asset_inline_limit;
        let removed: usize = self
            .nodes
            .iter_mut()
            .filter(|node| node.id != keep)
            .map(|node| node.snapshot.strip_backgrounds_over(limit))
            .sum();
        if removed > 0 {
            debug!(removed, "trimmed oversized backgrounds from stored nodes");
        }
    }

    fn enforce_retention(&mut self) {
        let evicted = self.settings.retention.apply(&mut self.nodes);
        if evicted.is_empty() {
            return;
        }
        debug!(
            evicted = evicted.len(),
            policy = %self.settings.retention,
            "retention evicted checkpoints"
        );
        for node in &evicted {
            if self.loaded_node_id.as_deref() == Some(node.id.as_str()) {
                self.loaded_node_id = None;
            }
        }
        self.forget_orphaned_portraits();
    }

    fn forget_orphaned_portraits(&mut self) {
        let nodes = &self.nodes;
        self.portraits
            .retain(|session_id, _| nodes.iter().any(|n| &n.session_id == session_id));
    }

    /// Marks a node as the loaded checkpoint and returns it with its
    /// session portrait re-attached.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NodeNotFound` if no node has this id.
    pub fn load(&mut self, node_id: &str) -> Result<Node, DomainError> {
        let node = self.hydrated(node_id)?;
        self.loaded_node_id = Some(node.id.clone());
        Ok(node)
    }

    /// Returns a copy of the node with its session portrait re-attached.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NodeNotFound` if no node has this id.
    pub fn hydrated(&self, node_id: &str) -> Result<Node, DomainError> {
        let mut node = self
            .get(node_id)
            .cloned()
            .ok_or_else(|| DomainError::NodeNotFound(node_id.to_owned()))?;
        node.snapshot.protagonist.portrait = self.portraits.get(&node.session_id).cloned();
        Ok(node)
    }

    /// Deletes one node.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NodeNotFound` if no node has this id.
    pub fn delete(&mut self, node_id: &str) -> Result<Node, DomainError> {
        let index = self
            .nodes
            .iter()
            .position(|node| node.id == node_id)
            .ok_or_else(|| DomainError::NodeNotFound(node_id.to_owned()))?;
        let removed = self.nodes.remove(index);
        if self.loaded_node_id.as_deref() == Some(node_id) {
            self.loaded_node_id = None;
        }
        self.forget_orphaned_portraits();
        Ok(removed)
    }

    /// Deletes every node of a session and its portrait. Returns how many
    /// nodes were removed.
    pub fn delete_session(&mut self, session_id: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.session_id != session_id);
        self.portraits.remove(session_id);
        if self
            .loaded_node_id
            .as_deref()
            .is_some_and(|id| !self.nodes.iter().any(|n| n.id == id))
        {
            self.loaded_node_id = None;
        }
        before - self.nodes.len()
    }

    /// Applies `edit` to a node's current segment, then mirrors the result
    /// into the snapshot's history.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NodeNotFound` for an unknown id and
    /// `DomainError::Validation` if the node has no current segment.
    pub fn edit_current_segment<R>(
        &mut self,
        node_id: &str,
        edit: impl FnOnce(&mut Segment) -> R,
    ) -> Result<R, DomainError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| node.id == node_id)
            .ok_or_else(|| DomainError::NodeNotFound(node_id.to_owned()))?;
        let segment = node.snapshot.current_segment.as_mut().ok_or_else(|| {
            DomainError::Validation(format!("node {node_id} has no narrative segment"))
        })?;
        let result = edit(segment);
        node.snapshot.sync_current_into_history();
        Ok(result)
    }

    /// A session's nodes, oldest first, in the bulk backup shape.
    #[must_use]
    pub fn export_session(&self, session_id: &str, strip_assets: bool) -> Vec<Node> {
        let portrait = if strip_assets {
            None
        } else {
            self.portraits.get(session_id).cloned()
        };
        self.nodes
            .iter()
            .rev()
            .filter(|node| node.session_id == session_id)
            .cloned()
            .map(|mut node| {
                node.snapshot.protagonist.portrait.clone_from(&portrait);
                if strip_assets {
                    node.snapshot.strip_all_backgrounds();
                }
                node
            })
            .collect()
    }
}
