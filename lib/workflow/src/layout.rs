//! Layout port.
//!
//! "Auto layout" delegates to an external layered-layout algorithm. The
//! engine hands over the graph's shape, takes back positions, and applies
//! them without validation: layout aesthetics are entirely the engine's
//! collaborator's business.

use crate::graph::WorkflowGraph;
use crate::node::Position;
use flowboard_core::NodeId;
use serde::{Deserialize, Serialize};

/// A node as seen by the layout engine: identity only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: NodeId,
    /// Current position, which the engine may use as a starting point.
    pub position: Position,
}

/// An edge as seen by the layout engine: endpoints only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub source: NodeId,
    pub target: NodeId,
}

/// A black-box layout algorithm.
pub trait LayoutEngine {
    /// Computes new positions for the given shape.
    fn layout(&self, nodes: &[LayoutNode], edges: &[LayoutEdge]) -> Vec<(NodeId, Position)>;
}

/// Runs the engine over the graph and writes back whatever it returns.
///
/// Positions for unknown ids are ignored; nodes the engine omits keep their
/// current position.
pub fn apply_layout(graph: &mut WorkflowGraph, engine: &dyn LayoutEngine) {
    let nodes: Vec<LayoutNode> = graph
        .nodes()
        .map(|node| LayoutNode {
            id: node.id,
            position: node.position,
        })
        .collect();
    let edges: Vec<LayoutEdge> = graph
        .edges()
        .into_iter()
        .map(|edge| LayoutEdge {
            source: edge.source,
            target: edge.target,
        })
        .collect();

    for (id, position) in engine.layout(&nodes, &edges) {
        graph.set_position(id, position);
    }
}
