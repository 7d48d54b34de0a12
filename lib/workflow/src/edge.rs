//! Edge types for workflow graphs.
//!
//! An edge means "the target node may read the source node's output at
//! `source_handle`, delivered into `target_handle`". Handles are optional:
//! nodes with a single implicit connection point connect with `None`.

use flowboard_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// An edge between two nodes, as stored on the graph.
///
/// The endpoints live in the graph structure itself; the weight carries the
/// edge identity and the port handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    /// Output handle on the source node, if it has named outputs.
    pub source_handle: Option<String>,
    /// Input handle on the target node, if it has named inputs.
    pub target_handle: Option<String>,
}

impl Edge {
    /// Creates a new edge weight with a fresh id.
    #[must_use]
    pub fn new(source_handle: Option<String>, target_handle: Option<String>) -> Self {
        Self {
            id: EdgeId::new(),
            source_handle,
            target_handle,
        }
    }
}

/// A complete edge reference including both endpoint node IDs.
///
/// This is the external representation used by documents, the connection
/// engine, and callers inspecting the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRef {
    /// The edge ID.
    pub id: EdgeId,
    /// The source node ID.
    pub source: NodeId,
    /// The source handle, if any.
    pub source_handle: Option<String>,
    /// The target node ID.
    pub target: NodeId,
    /// The target handle, if any.
    pub target_handle: Option<String>,
}

/// A request to connect two nodes, as produced by the editor surface.
///
/// Whether it becomes an edge (and which one) is decided by the connection
/// engine, see `WorkflowGraph::connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub source: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    pub target: NodeId,
    #[serde(default)]
    pub target_handle: Option<String>,
}

impl ConnectRequest {
    /// Creates a request without handles.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            source_handle: None,
            target,
            target_handle: None,
        }
    }

    /// Sets the source handle.
    #[must_use]
    pub fn from_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    /// Sets the target handle.
    #[must_use]
    pub fn into_handle(mut self, handle: impl Into<String>) -> Self {
        self.target_handle = Some(handle.into());
        self
    }
}
