//! Command handlers for the import context.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use worldline_checkpoint::application::command_handlers::CheckpointCommandResult;
use worldline_checkpoint::application::flush::schedule_flush;
use worldline_checkpoint::domain::store::NodeStore;
use worldline_core::clock::Clock;
use worldline_core::command::Command;
use worldline_core::error::DomainError;
use worldline_core::ids::IdGenerator;
use worldline_core::model::Node;
use worldline_core::repository::CheckpointRepository;

use crate::domain::commands::ImportCheckpoints;
use crate::domain::payload::ImportPayload;
use crate::domain::reconstruct::{reconstruct_chain, synthesize_setup};

/// What an import did. `inserted == 0` means every node was already present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Which payload shape was recognised.
    pub kind: &'static str,
    /// Nodes added to the store.
    pub inserted: usize,
    /// Nodes skipped as duplicates.
    pub skipped: usize,
}

fn insert_all(store: &mut NodeStore, nodes: Vec<Node>) -> (usize, usize) {
    let total = nodes.len();
    let mut inserted = 0;
    for node in nodes {
        if store.insert_if_absent(node) {
            inserted += 1;
        }
    }
    (inserted, total - inserted)
}

/// Handles the `ImportCheckpoints` command: classifies the payload, builds
/// the nodes it describes and inserts those not already stored.
///
/// A flush is scheduled only when something was inserted.
///
/// # Errors
///
/// Returns `DomainError::UnrecognizedFormat` when the payload matches none of
/// the known shapes. Nothing is inserted in that case.
pub fn handle_import(
    command: &ImportCheckpoints,
    store: &mut NodeStore,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &Arc<dyn CheckpointRepository>,
) -> Result<CheckpointCommandResult<ImportOutcome>, DomainError> {
    let payload = ImportPayload::classify(command.payload.clone())?;
    let kind = payload.kind();

    let nodes = match payload {
        ImportPayload::Bulk(nodes) => nodes,
        ImportPayload::Configuration(config) => vec![synthesize_setup(config, clock, ids)],
        ImportPayload::Checkpoint(export) => reconstruct_chain(&export, ids),
    };
    let (inserted, skipped) = insert_all(store, nodes);

    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        kind,
        inserted,
        skipped,
        "import reconciled"
    );

    let flush = (inserted > 0).then(|| schedule_flush(Arc::clone(repo), store.next_record()));
    Ok(CheckpointCommandResult {
        value: ImportOutcome {
            kind,
            inserted,
            skipped,
        },
        flush,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;
    use worldline_checkpoint::domain::store::StoreSettings;
    use worldline_core::model::SaveType;
    use worldline_core::repository::PersistedStore;
    use worldline_test_support::{
        FixedClock, RecordingCheckpointRepository, SequentialIds, fixed_now, node,
    };

    use super::*;

    struct Fixture {
        store: NodeStore,
        clock: FixedClock,
        ids: SequentialIds,
        recording: Arc<RecordingCheckpointRepository>,
        repo: Arc<dyn CheckpointRepository>,
    }

    impl Fixture {
        fn with_nodes(nodes: Vec<Node>) -> Self {
            let recording = Arc::new(RecordingCheckpointRepository::default());
            let repo: Arc<dyn CheckpointRepository> = recording.clone();
            Self {
                store: NodeStore::from_persisted(
                    PersistedStore {
                        nodes,
                        ..PersistedStore::default()
                    },
                    StoreSettings::default(),
                ),
                clock: FixedClock(fixed_now()),
                ids: SequentialIds::new("imp"),
                recording,
                repo,
            }
        }

        fn import(&mut self, payload: serde_json::Value) -> Result<CheckpointCommandResult<ImportOutcome>, DomainError> {
            let command = ImportCheckpoints {
                correlation_id: Uuid::new_v4(),
                payload,
            };
            handle_import(&command, &mut self.store, &self.clock, &self.ids, &self.repo)
        }
    }

    #[tokio::test]
    async fn test_bulk_import_twice_inserts_nothing_second_time() {
        // Arrange
        let mut fixture = Fixture::with_nodes(vec![]);
        let backup = json!([
            node("a", "s1", &["b1"], SaveType::Auto),
            node("b", "s1", &["b1", "b2"], SaveType::Auto),
            node("c", "s1", &["b1", "b2", "b3"], SaveType::Manual),
        ]);

        // Act
        let first = fixture.import(backup.clone()).unwrap();
        first.flush.unwrap().await.unwrap();
        let second = fixture.import(backup).unwrap();

        // Assert
        assert_eq!(first.value.inserted, 3);
        assert_eq!(second.value.inserted, 0);
        assert_eq!(second.value.skipped, 3);
        assert!(second.flush.is_none());
        assert_eq!(fixture.store.list().len(), 3);
        assert_eq!(fixture.recording.persisted().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_import_of_already_stored_node_and_its_copy_inserts_zero() {
        // Arrange
        let a = node("A", "s1", &["b1"], SaveType::Manual);
        let mut fixture = Fixture::with_nodes(vec![a.clone()]);

        // Act
        let result = fixture.import(json!([a.clone(), a])).unwrap();

        // Assert
        assert_eq!(result.value.kind, "bulk");
        assert_eq!(result.value.inserted, 0);
        assert_eq!(fixture.store.list().len(), 1);
    }

    #[tokio::test]
    async fn test_checkpoint_import_rebuilds_parent_chain() {
        // Arrange
        let mut fixture = Fixture::with_nodes(vec![]);
        let mut export = node("head", "s1", &["b1", "b2", "b3"], SaveType::Manual);
        export.metadata.choice_label = Some("Wait".to_owned());
        export.metadata.summary = "Dawn breaks".to_owned();

        // Act
        let result = fixture.import(serde_json::to_value(&export).unwrap()).unwrap();

        // Assert
        assert_eq!(result.value.kind, "checkpoint");
        assert_eq!(result.value.inserted, 3);
        let stored = fixture.store.list();
        assert_eq!(stored[0].id, "head");
        assert_eq!(stored[0].metadata, export.metadata);
        assert_eq!(stored[0].parent_id.as_deref(), Some("b2"));
        assert_eq!(stored[1].parent_id.as_deref(), Some("b1"));
        assert_eq!(stored[2].parent_id, None);
    }

    #[tokio::test]
    async fn test_checkpoint_import_skips_beats_already_stored() {
        let mut fixture = Fixture::with_nodes(vec![node("old", "s1", &["b1"], SaveType::Auto)]);
        let export = node("head", "s1", &["b1", "b2"], SaveType::Manual);

        let result = fixture.import(serde_json::to_value(&export).unwrap()).unwrap();

        assert_eq!(result.value.inserted, 1);
        assert_eq!(result.value.skipped, 1);
        assert_eq!(fixture.store.list().len(), 2);
    }

    #[tokio::test]
    async fn test_configuration_import_creates_setup_node() {
        let mut fixture = Fixture::with_nodes(vec![]);

        let result = fixture
            .import(json!({ "protagonist": { "name": "Ren" }, "world": { "title": "Glass Sea" } }))
            .unwrap();

        assert_eq!(result.value.kind, "configuration");
        assert_eq!(result.value.inserted, 1);
        let setup = &fixture.store.list()[0];
        assert_eq!(setup.save_type, SaveType::Setup);
        assert_eq!(setup.metadata.summary, "Setup: Glass Sea");
    }

    #[tokio::test]
    async fn test_unrecognized_payload_is_an_error_not_zero() {
        let mut fixture = Fixture::with_nodes(vec![]);

        let result = fixture.import(json!({ "hello": "world" }));

        assert!(matches!(result, Err(DomainError::UnrecognizedFormat(_))));
        assert!(fixture.store.list().is_empty());
        assert!(fixture.recording.persisted().is_empty());
    }

    #[tokio::test]
    async fn test_empty_backup_is_an_error_while_duplicate_backup_is_zero() {
        // Arrange
        let a = node("A", "s1", &["b1"], SaveType::Auto);
        let mut fixture = Fixture::with_nodes(vec![a.clone()]);

        // Act
        let empty = fixture.import(json!([]));
        let duplicates = fixture.import(json!([a])).unwrap();

        // Assert
        assert!(matches!(empty, Err(DomainError::UnrecognizedFormat(_))));
        assert_eq!(duplicates.value.inserted, 0);
        assert_eq!(duplicates.value.skipped, 1);
    }
}
