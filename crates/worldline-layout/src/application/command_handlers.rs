//! Command handlers for the layout context.

use tracing::info;
use worldline_core::command::Command;
use worldline_core::error::DomainError;
use worldline_core::model::Node;

use crate::domain::commands::{PinNodePosition, UnpinNodePosition};
use crate::domain::overrides::{Position, PositionOverrides};

/// Handles the `PinNodePosition` command. Returns the previous pin, if any.
///
/// # Errors
///
/// Returns `DomainError::NodeNotFound` if no stored node has the id, and
/// `DomainError::Validation` if a coordinate is not finite.
pub fn handle_pin(
    command: &PinNodePosition,
    nodes: &[Node],
    overrides: &mut PositionOverrides,
) -> Result<Option<Position>, DomainError> {
    if !nodes.iter().any(|node| node.id == command.node_id) {
        return Err(DomainError::NodeNotFound(command.node_id.clone()));
    }
    let Position { x, y } = command.position;
    if !x.is_finite() || !y.is_finite() {
        return Err(DomainError::Validation(format!(
            "position ({x}, {y}) is not a finite point"
        )));
    }
    let previous = overrides.set(command.node_id.clone(), command.position);
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        node_id = %command.node_id,
        x,
        y,
        "node position pinned"
    );
    Ok(previous)
}

/// Handles the `UnpinNodePosition` command. Returns whether a pin was
/// removed; unpinning a node that was never moved is not an error.
pub fn handle_unpin(command: &UnpinNodePosition, overrides: &mut PositionOverrides) -> bool {
    let removed = overrides.clear(&command.node_id).is_some();
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        node_id = %command.node_id,
        removed,
        "node position unpinned"
    );
    removed
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;
    use worldline_core::model::SaveType;
    use worldline_test_support::node;

    use super::*;

    fn pin(node_id: &str, x: f64, y: f64) -> PinNodePosition {
        PinNodePosition {
            correlation_id: Uuid::new_v4(),
            node_id: node_id.to_owned(),
            position: Position { x, y },
        }
    }

    #[test]
    fn test_pin_known_node_records_override() {
        // Arrange
        let nodes = vec![node("n1", "s1", &["b1"], SaveType::Auto)];
        let mut overrides = PositionOverrides::default();

        // Act
        let previous = handle_pin(&pin("n1", 10.0, 20.0), &nodes, &mut overrides).unwrap();

        // Assert
        assert!(previous.is_none());
        assert_eq!(overrides.get("n1"), Some(Position { x: 10.0, y: 20.0 }));
    }

    #[test]
    fn test_pin_unknown_node_is_not_found() {
        let mut overrides = PositionOverrides::default();

        let result = handle_pin(&pin("ghost", 0.0, 0.0), &[], &mut overrides);

        assert!(matches!(result, Err(DomainError::NodeNotFound(_))));
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_pin_rejects_non_finite_coordinates() {
        let nodes = vec![node("n1", "s1", &["b1"], SaveType::Auto)];
        let mut overrides = PositionOverrides::default();

        let result = handle_pin(&pin("n1", f64::NAN, 0.0), &nodes, &mut overrides);

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_unpin_reports_whether_anything_was_removed() {
        let mut overrides = PositionOverrides::default();
        overrides.set("n1", Position { x: 1.0, y: 1.0 });
        let unpin = |id: &str| UnpinNodePosition {
            correlation_id: Uuid::new_v4(),
            node_id: id.to_owned(),
        };

        assert!(handle_unpin(&unpin("n1"), &mut overrides));
        assert!(!handle_unpin(&unpin("n1"), &mut overrides));
    }
}
