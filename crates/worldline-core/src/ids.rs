//! Identifier generation.
//!
//! Node and session identifiers are minted through this trait so that tests
//! and replays can inject a predictable sequence instead of random UUIDs.

use uuid::Uuid;

/// Abstraction over fresh identifier generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a new, previously unused identifier.
    fn next_id(&self) -> String;
}

/// Production generator producing random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_produces_distinct_parseable_ids() {
        let ids = UuidGenerator;

        let first = ids.next_id();
        let second = ids.next_id();

        assert_ne!(first, second);
        Uuid::parse_str(&first).unwrap();
    }
}
