//! Clock abstraction for deterministic checkpoint timestamps.

use chrono::{DateTime, Utc};

/// Source of the time stamped onto every saved or synthesized checkpoint.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
