//! Classification of externally produced import payloads.
//!
//! A payload is sorted into exactly one [`ImportPayload`] variant before any
//! of its fields are used. Anything that does not fully parse as one of the
//! known shapes is rejected as a whole.

use serde::Deserialize;
use serde_json::Value;
use worldline_core::error::DomainError;
use worldline_core::model::{CastMember, Node, Protagonist, WorldSettings};

/// Protagonist, world and cast definitions without any narrative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationPayload {
    /// The player character.
    pub protagonist: Protagonist,
    /// World configuration.
    #[serde(default)]
    pub world: WorldSettings,
    /// Supporting characters.
    #[serde(default)]
    pub supporting_cast: Vec<CastMember>,
}

/// The three accepted export shapes.
#[derive(Debug, Clone)]
pub enum ImportPayload {
    /// A backup: many full checkpoints.
    Bulk(Vec<Node>),
    /// Setup data only.
    Configuration(ConfigurationPayload),
    /// One exported checkpoint whose snapshot embeds its full history.
    Checkpoint(Box<Node>),
}

impl ImportPayload {
    /// Short name of the variant, for logs and responses.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bulk(_) => "bulk",
            Self::Configuration(_) => "configuration",
            Self::Checkpoint(_) => "checkpoint",
        }
    }

    /// Sorts a raw JSON value into one of the known shapes.
    ///
    /// - an array is a bulk backup; every element must be a full checkpoint;
    /// - an object with a `snapshot` is a checkpoint, or configuration-only
    ///   when its history is empty;
    /// - an object with a `protagonist` and no history is configuration-only.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnrecognizedFormat` for any other shape, or when
    /// a payload looks like one shape but fails to parse as it.
    pub fn classify(value: Value) -> Result<Self, DomainError> {
        match value {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(DomainError::UnrecognizedFormat(
                        "backup contains no checkpoints".into(),
                    ));
                }
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| {
                        serde_json::from_value::<Node>(item).map_err(|e| {
                            DomainError::UnrecognizedFormat(format!(
                                "backup entry {index} is not a checkpoint: {e}"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Bulk)
            }
            Value::Object(ref map) if map.contains_key("snapshot") => {
                let node: Node = serde_json::from_value(value).map_err(|e| {
                    DomainError::UnrecognizedFormat(format!("malformed checkpoint: {e}"))
                })?;
                if node.snapshot.history.is_empty() {
                    let snapshot = node.snapshot;
                    Ok(Self::Configuration(ConfigurationPayload {
                        protagonist: snapshot.protagonist,
                        world: snapshot.world,
                        supporting_cast: snapshot.supporting_cast,
                    }))
                } else {
                    Ok(Self::Checkpoint(Box::new(node)))
                }
            }
            Value::Object(ref map) if map.contains_key("protagonist") => {
                let has_history = map
                    .get("history")
                    .and_then(Value::as_array)
                    .is_some_and(|history| !history.is_empty());
                if has_history {
                    return Err(DomainError::UnrecognizedFormat(
                        "narrative history outside a checkpoint".into(),
                    ));
                }
                serde_json::from_value(value)
                    .map(Self::Configuration)
                    .map_err(|e| {
                        DomainError::UnrecognizedFormat(format!("malformed configuration: {e}"))
                    })
            }
            other => Err(DomainError::UnrecognizedFormat(format!(
                "expected a checkpoint, configuration or backup array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without known fields",
    }
}
