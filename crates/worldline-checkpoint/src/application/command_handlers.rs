//! Command handlers for the checkpoint context.
//!
//! Each handler mutates the in-memory [`NodeStore`] synchronously and then
//! schedules a deferred flush of the persisted record. Handlers never await
//! the flush; the returned [`CheckpointCommandResult`] carries its handle.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;
use worldline_core::clock::Clock;
use worldline_core::command::Command;
use worldline_core::error::DomainError;
use worldline_core::generator::NarrativeGenerator;
use worldline_core::ids::IdGenerator;
use worldline_core::model::{Node, SegmentVersion};
use worldline_core::repository::CheckpointRepository;

use crate::application::flush::schedule_flush;
use crate::domain::commands::{
    DeleteNode, DeleteSession, LoadCheckpoint, RegenerateSegment, SaveCheckpoint,
    SwitchSegmentVersion,
};
use crate::domain::store::{NodeStore, SaveOutcome};

/// Action sent to the generator when a node records no player input.
const DEFAULT_REGENERATE_ACTION: &str = "continue";

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct CheckpointCommandResult<T> {
    /// What the command produced.
    pub value: T,
    /// The deferred write, if the command changed the store.
    pub flush: Option<JoinHandle<()>>,
}

fn flushed<T>(
    value: T,
    store: &mut NodeStore,
    repo: &Arc<dyn CheckpointRepository>,
) -> CheckpointCommandResult<T> {
    CheckpointCommandResult {
        value,
        flush: Some(schedule_flush(Arc::clone(repo), store.next_record())),
    }
}

/// Handles the `SaveCheckpoint` command: merges or inserts the snapshot and
/// schedules a flush unless the save was discarded.
///
/// # Errors
///
/// Returns `DomainError::Validation` if a non-setup snapshot has no current
/// segment.
pub fn handle_save(
    command: &SaveCheckpoint,
    store: &mut NodeStore,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &Arc<dyn CheckpointRepository>,
) -> Result<CheckpointCommandResult<SaveOutcome>, DomainError> {
    let outcome = store.save(
        command.snapshot.clone(),
        command.save_type,
        command.metadata.clone(),
        clock,
        ids,
    )?;

    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        node_id = outcome.node_id(),
        ?outcome,
        "checkpoint saved"
    );

    if outcome.changed_store() {
        Ok(flushed(outcome, store, repo))
    } else {
        Ok(CheckpointCommandResult {
            value: outcome,
            flush: None,
        })
    }
}

/// Handles the `LoadCheckpoint` command: marks the node as loaded and returns
/// it with its portrait. Loading changes nothing durable, so no flush runs.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` for an unknown node.
pub fn handle_load(command: &LoadCheckpoint, store: &mut NodeStore) -> Result<Node, DomainError> {
    let node = store.load(&command.node_id)?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        node_id = %node.id,
        "checkpoint loaded"
    );
    Ok(node)
}

/// Handles the `DeleteNode` command.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` for an unknown node.
pub fn handle_delete_node(
    command: &DeleteNode,
    store: &mut NodeStore,
    repo: &Arc<dyn CheckpointRepository>,
) -> Result<CheckpointCommandResult<Node>, DomainError> {
    let removed = store.delete(&command.node_id)?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        node_id = %removed.id,
        "checkpoint deleted"
    );
    Ok(flushed(removed, store, repo))
}

/// Handles the `DeleteSession` command: removes every node of the session.
/// Deleting an unknown session removes nothing and is not an error.
#[must_use]
pub fn handle_delete_session(
    command: &DeleteSession,
    store: &mut NodeStore,
    repo: &Arc<dyn CheckpointRepository>,
) -> CheckpointCommandResult<usize> {
    let removed = store.delete_session(&command.session_id);
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        session_id = %command.session_id,
        removed,
        "session deleted"
    );
    flushed(removed, store, repo)
}

/// Handles the `RegenerateSegment` command: appends the variant to the node's
/// current beat and makes it active.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` for an unknown node and
/// `DomainError::Validation` if the node has no narrative beat.
pub fn handle_regenerate(
    command: &RegenerateSegment,
    store: &mut NodeStore,
    repo: &Arc<dyn CheckpointRepository>,
) -> Result<CheckpointCommandResult<usize>, DomainError> {
    let versions = store.edit_current_segment(&command.node_id, |segment| {
        segment.regenerate(command.variant.clone());
        segment.version_count()
    })?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        node_id = %command.node_id,
        versions,
        "segment regenerated"
    );
    Ok(flushed(versions, store, repo))
}

/// Handles the `SwitchSegmentVersion` command. Returns the active version
/// index afterwards; a beat with fewer than two versions is left unchanged
/// and nothing is flushed.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` for an unknown node and
/// `DomainError::Validation` if the node has no narrative beat.
pub fn handle_switch_version(
    command: &SwitchSegmentVersion,
    store: &mut NodeStore,
    repo: &Arc<dyn CheckpointRepository>,
) -> Result<CheckpointCommandResult<usize>, DomainError> {
    let (switched, index) = store.edit_current_segment(&command.node_id, |segment| {
        let switched = segment.switch_version(command.direction);
        (switched, segment.current_version_index)
    })?;
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        node_id = %command.node_id,
        switched,
        index,
        "segment version switched"
    );
    if switched {
        Ok(flushed(index, store, repo))
    } else {
        Ok(CheckpointCommandResult {
            value: index,
            flush: None,
        })
    }
}

/// Asks the generation service for a fresh rendering of `node`'s beat,
/// replaying the player input that originally produced it.
///
/// Takes an owned copy of the node so callers can release any lock on the
/// store while the service runs.
///
/// # Errors
///
/// Propagates the generator's error.
pub async fn generate_variant(
    generator: &dyn NarrativeGenerator,
    node: &Node,
) -> Result<SegmentVersion, DomainError> {
    let action = node
        .metadata
        .choice_text
        .as_deref()
        .or(node.metadata.choice_label.as_deref())
        .filter(|action| !action.trim().is_empty())
        .unwrap_or(DEFAULT_REGENERATE_ACTION);
    let generated = generator.generate(&node.snapshot, action).await?;
    Ok(generated.segment)
}
