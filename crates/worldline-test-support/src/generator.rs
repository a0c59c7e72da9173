//! Scripted narrative generator for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use worldline_core::error::DomainError;
use worldline_core::generator::{GeneratedSegment, NarrativeGenerator};
use worldline_core::model::{SegmentVersion, Snapshot};

/// Returns a canned rendering per call and records the actions it was asked
/// to generate for.
#[derive(Debug)]
pub struct ScriptedGenerator {
    texts: Mutex<Vec<String>>,
    actions: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Create a generator that yields `texts` in order. Once exhausted every
    /// call fails with an infrastructure error.
    #[must_use]
    pub fn new(texts: &[&str]) -> Self {
        Self {
            texts: Mutex::new(texts.iter().rev().map(|t| (*t).to_owned()).collect()),
            actions: Mutex::new(Vec::new()),
        }
    }

    /// Actions received so far, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        _snapshot: &Snapshot,
        action: &str,
    ) -> Result<GeneratedSegment, DomainError> {
        self.actions.lock().unwrap().push(action.to_owned());
        let text = self
            .texts
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| DomainError::Infrastructure("generator script exhausted".into()))?;
        Ok(GeneratedSegment {
            segment: SegmentVersion {
                text,
                ..SegmentVersion::default()
            },
            ..GeneratedSegment::default()
        })
    }
}
