//! Shared application state.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use worldline_checkpoint::domain::store::NodeStore;
use worldline_core::clock::Clock;
use worldline_core::error::DomainError;
use worldline_core::generator::NarrativeGenerator;
use worldline_core::ids::IdGenerator;
use worldline_core::repository::CheckpointRepository;
use worldline_layout::domain::engine::LayoutConfig;
use worldline_layout::domain::overrides::PositionOverrides;

/// Application state shared across all request handlers.
///
/// The store and override map sit behind `std` mutexes; handlers must drop
/// their guards before awaiting anything.
#[derive(Clone)]
pub struct AppState {
    /// Clock for checkpoint timestamps.
    pub clock: Arc<dyn Clock>,
    /// Mints node and session ids.
    pub ids: Arc<dyn IdGenerator>,
    /// The in-memory checkpoint store.
    pub store: Arc<Mutex<NodeStore>>,
    /// Durable storage the store is flushed to.
    pub repository: Arc<dyn CheckpointRepository>,
    /// Narrative generation service; regeneration without an explicit
    /// variant is unavailable when unset.
    pub generator: Option<Arc<dyn NarrativeGenerator>>,
    /// Manually dragged node positions.
    pub overrides: Arc<Mutex<PositionOverrides>>,
    /// Spacing used by the graph layout.
    pub layout: LayoutConfig,
}

impl AppState {
    /// Create new application state around an already loaded store.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        store: NodeStore,
        repository: Arc<dyn CheckpointRepository>,
    ) -> Self {
        Self {
            clock,
            ids,
            store: Arc::new(Mutex::new(store)),
            repository,
            generator: None,
            overrides: Arc::new(Mutex::new(PositionOverrides::default())),
            layout: LayoutConfig::default(),
        }
    }

    /// Attaches a narrative generation service.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn NarrativeGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Locks the checkpoint store.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a previous holder panicked.
    pub fn store(&self) -> Result<MutexGuard<'_, NodeStore>, DomainError> {
        self.store
            .lock()
            .map_err(|_| DomainError::Infrastructure("checkpoint store lock poisoned".into()))
    }

    /// Locks the position override map.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if a previous holder panicked.
    pub fn overrides(&self) -> Result<MutexGuard<'_, PositionOverrides>, DomainError> {
        self.overrides
            .lock()
            .map_err(|_| DomainError::Infrastructure("layout override lock poisoned".into()))
    }

    /// Drops position overrides of nodes no longer in `store`. Call after any
    /// command that can remove nodes, including retention evictions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the override lock is poisoned.
    pub fn prune_overrides(&self, store: &NodeStore) -> Result<(), DomainError> {
        let removed = self
            .overrides()?
            .retain_nodes(store.list().iter().map(|node| node.id.as_str()));
        if removed > 0 {
            debug!(removed, "dropped overrides of removed checkpoints");
        }
        Ok(())
    }
}
