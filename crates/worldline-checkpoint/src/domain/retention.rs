//! Retention policies bounding the number of stored checkpoints.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use worldline_core::error::DomainError;
use worldline_core::model::Node;

/// Default number of checkpoints kept by [`RetentionPolicy::default`].
pub const DEFAULT_RETENTION_LIMIT: usize = 20;

/// Largest limit accepted when parsing a policy. The layout walks a
/// session's chain recursively, so this also bounds its recursion depth.
pub const MAX_RETENTION_LIMIT: usize = 1_000;

/// How many checkpoints survive an insert.
///
/// Both variants keep the front of the store (the most recently inserted
/// nodes) and evict the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    /// Keep the `n` most recent nodes across all sessions. Heavy play in one
    /// session can evict another session's entire history.
    GlobalMostRecent(usize),
    /// Keep the `n` most recent nodes of every session.
    PerSession(usize),
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::GlobalMostRecent(DEFAULT_RETENTION_LIMIT)
    }
}

impl RetentionPolicy {
    /// Evicts nodes beyond the policy's bound and returns them, front-most
    /// first.
    pub fn apply(&self, nodes: &mut Vec<Node>) -> Vec<Node> {
        match *self {
            Self::GlobalMostRecent(limit) => {
                if nodes.len() > limit {
                    nodes.split_off(limit)
                } else {
                    Vec::new()
                }
            }
            Self::PerSession(limit) => {
                let mut seen: HashMap<String, usize> = HashMap::new();
                let mut evicted = Vec::new();
                let mut kept = Vec::with_capacity(nodes.len());
                for node in nodes.drain(..) {
                    let count = seen.entry(node.session_id.clone()).or_default();
                    *count += 1;
                    if *count > limit {
                        evicted.push(node);
                    } else {
                        kept.push(node);
                    }
                }
                *nodes = kept;
                evicted
            }
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GlobalMostRecent(limit) => write!(f, "global:{limit}"),
            Self::PerSession(limit) => write!(f, "session:{limit}"),
        }
    }
}

impl FromStr for RetentionPolicy {
    type Err = DomainError;

    /// Parses `global:N` or `session:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope, limit) = s.split_once(':').ok_or_else(|| {
            DomainError::Validation(format!("retention must be `global:N` or `session:N`, got `{s}`"))
        })?;
        let limit: usize = limit
            .trim()
            .parse()
            .map_err(|e| DomainError::Validation(format!("invalid retention limit `{limit}`: {e}")))?;
        if !(1..=MAX_RETENTION_LIMIT).contains(&limit) {
            return Err(DomainError::Validation(format!(
                "retention limit must be between 1 and {MAX_RETENTION_LIMIT}, got {limit}"
            )));
        }
        match scope.trim() {
            "global" => Ok(Self::GlobalMostRecent(limit)),
            "session" => Ok(Self::PerSession(limit)),
            other => Err(DomainError::Validation(format!(
                "unknown retention scope `{other}`"
            ))),
        }
    }
}
