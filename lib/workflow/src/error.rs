//! Error types for the workflow crate.
//!
//! Validation errors are reported synchronously at the point of the action
//! and leave the graph unchanged. Execution failures never surface as
//! errors from the simulator; they land in the triggering node's
//! `last_error` (see the `simulator` module).

use crate::node::NodeKind;
use flowboard_core::{EdgeId, NodeId};
use std::fmt;

/// Errors from graph mutation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// Edge with the given ID was not found in the graph.
    EdgeNotFound { edge_id: EdgeId },
    /// A config replace attempted to change the node's kind.
    KindImmutable {
        node_id: NodeId,
        existing: NodeKind,
        requested: NodeKind,
    },
    /// The node's kind does not own a growable port list.
    PortsUnsupported { node_id: NodeId, kind: NodeKind },
    /// Removing the port would shrink the list below the kind's floor.
    PortFloorReached { node_id: NodeId, floor: usize },
    /// The port index is outside the node's port list.
    PortIndexOutOfRange { node_id: NodeId, index: usize },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => {
                write!(f, "node not found: {node_id}")
            }
            Self::EdgeNotFound { edge_id } => {
                write!(f, "edge not found: {edge_id}")
            }
            Self::KindImmutable {
                node_id,
                existing,
                requested,
            } => {
                write!(
                    f,
                    "node {node_id} is a {existing} node; cannot replace its config with {requested}"
                )
            }
            Self::PortsUnsupported { node_id, kind } => {
                write!(f, "{kind} node {node_id} has no growable port list")
            }
            Self::PortFloorReached { node_id, floor } => {
                write!(f, "node {node_id} must keep at least {floor} ports")
            }
            Self::PortIndexOutOfRange { node_id, index } => {
                write!(f, "port index {index} out of range on node {node_id}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_not_found_display() {
        let node_id = NodeId::new();
        let err = GraphError::NodeNotFound { node_id };
        assert!(err.to_string().contains("node not found"));
    }

    #[test]
    fn kind_immutable_display_names_both_kinds() {
        let err = GraphError::KindImmutable {
            node_id: NodeId::new(),
            existing: NodeKind::Branch,
            requested: NodeKind::Merge,
        };
        let text = err.to_string();
        assert!(text.contains("branch"));
        assert!(text.contains("merge"));
    }

    #[test]
    fn port_floor_display() {
        let err = GraphError::PortFloorReached {
            node_id: NodeId::new(),
            floor: 2,
        };
        assert!(err.to_string().contains("at least 2"));
    }
}
