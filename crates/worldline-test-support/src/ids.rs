//! Test identifiers: predictable `IdGenerator` for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use worldline_core::ids::IdGenerator;

/// Produces `"{prefix}-1"`, `"{prefix}-2"`, ... in call order.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: &'static str,
    next: AtomicUsize,
}

impl SequentialIds {
    /// Create a generator whose ids start with `prefix`.
    #[must_use]
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicUsize::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}
