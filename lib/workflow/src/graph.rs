//! Workflow graph implementation using petgraph.
//!
//! Workflows are directed graphs where:
//! - Nodes are typed workflow steps (see the `node` module)
//! - Edges connect an output handle on one node to an input handle on another
//!
//! All mutations are synchronous and atomic from the caller's perspective:
//! an operation either applies completely or leaves the graph unchanged.
//! Edge creation goes through the connection engine (`connect` module); the
//! operations here never add edges directly.

use crate::edge::{Edge, EdgeRef};
use crate::error::GraphError;
use crate::node::{Node, NodeConfig, NodeKind, PortSide, Position, next_port_name};
use flowboard_core::{EdgeId, NodeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A workflow graph using petgraph's directed graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GraphData", into = "GraphData")]
pub struct WorkflowGraph {
    /// The underlying directed graph.
    graph: DiGraph<Node, Edge>,
    /// Map from NodeId to petgraph's NodeIndex for O(1) lookup.
    node_index_map: HashMap<NodeId, NodeIndex>,
}

impl WorkflowGraph {
    /// Creates a new empty workflow graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index_map: HashMap::new(),
        }
    }

    /// Adds a node of the given kind with its default configuration.
    ///
    /// Returns the new node's ID. Never fails.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        self.insert_node(Node::new(kind, position))
    }

    /// Inserts a fully-built node (used when loading persisted documents).
    pub fn insert_node(&mut self, node: Node) -> NodeId {
        let node_id = node.id;
        let index = self.graph.add_node(node);
        self.node_index_map.insert(node_id, index);
        node_id
    }

    /// Returns a reference to a node by its ID.
    #[must_use]
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        let index = self.node_index_map.get(&node_id)?;
        self.graph.node_weight(*index)
    }

    /// Returns true if the node exists in the graph.
    #[must_use]
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.node_index_map.contains_key(&node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        let index = self.node_index_map.get(&node_id)?;
        self.graph.node_weight_mut(*index)
    }

    /// Replaces a node's configuration wholesale (no deep merge).
    ///
    /// Returns `Ok(false)` if the node does not exist (a stale edit is a
    /// no-op, not an error).
    ///
    /// # Errors
    ///
    /// Returns an error if the new config's kind differs from the node's:
    /// a node's kind is immutable after creation.
    pub fn update_node_config(
        &mut self,
        node_id: NodeId,
        config: NodeConfig,
    ) -> Result<bool, GraphError> {
        let Some(node) = self.node_mut(node_id) else {
            return Ok(false);
        };
        if node.kind() != config.kind() {
            return Err(GraphError::KindImmutable {
                node_id,
                existing: node.kind(),
                requested: config.kind(),
            });
        }
        node.config = config;
        Ok(true)
    }

    /// Updates a node's label and description. Metadata only: status,
    /// config and outputs are untouched. No-op for unknown ids.
    pub fn rename_node(
        &mut self,
        node_id: NodeId,
        label: impl Into<String>,
        description: Option<String>,
    ) -> bool {
        let Some(node) = self.node_mut(node_id) else {
            return false;
        };
        node.label = label.into();
        node.description = description;
        true
    }

    /// Moves a node on the canvas. No-op for unknown ids.
    pub fn set_position(&mut self, node_id: NodeId, position: Position) -> bool {
        let Some(node) = self.node_mut(node_id) else {
            return false;
        };
        node.position = position;
        true
    }

    /// Removes a node and every edge incident to it.
    ///
    /// Idempotent: deleting an unknown id returns `None`.
    pub fn delete_node(&mut self, node_id: NodeId) -> Option<Node> {
        let index = self.node_index_map.remove(&node_id)?;
        let node = self.graph.remove_node(index);
        // remove_node moves the last node into the freed index; the stale
        // mapping for that node must be repaired.
        self.rebuild_index_map();
        node
    }

    /// Removes a single edge by its ID. Returns false if no such edge.
    pub fn disconnect(&mut self, edge_id: EdgeId) -> bool {
        let found = self
            .graph
            .edge_references()
            .find(|e| e.weight().id == edge_id)
            .map(|e| e.id());
        match found {
            Some(index) => {
                self.graph.remove_edge(index);
                true
            }
            None => false,
        }
    }

    /// Appends a port to a branch/join/merge/template node.
    ///
    /// Returns the new handle name.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or its kind has no growable
    /// port list.
    pub fn add_port(&mut self, node_id: NodeId) -> Result<String, GraphError> {
        let node = self
            .node_mut(node_id)
            .ok_or(GraphError::NodeNotFound { node_id })?;
        let kind = node.kind();
        let Some((ports, side)) = node.config.ports_mut() else {
            return Err(GraphError::PortsUnsupported { node_id, kind });
        };
        let name = next_port_name(side, ports);
        ports.push(name.clone());
        Ok(name)
    }

    /// Removes the port at `index` from a branch/join/merge/template node,
    /// dropping any edge bound to the removed handle.
    ///
    /// Returns the removed handle name.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown, its kind has no port list,
    /// the index is out of range, or removal would go below the kind's
    /// floor (2 for join/merge/template, 1 for branch).
    pub fn remove_port(&mut self, node_id: NodeId, index: usize) -> Result<String, GraphError> {
        let node = self
            .node_mut(node_id)
            .ok_or(GraphError::NodeNotFound { node_id })?;
        let kind = node.kind();
        let floor = kind
            .port_floor()
            .ok_or(GraphError::PortsUnsupported { node_id, kind })?;
        let Some((ports, side)) = node.config.ports_mut() else {
            return Err(GraphError::PortsUnsupported { node_id, kind });
        };
        if index >= ports.len() {
            return Err(GraphError::PortIndexOutOfRange { node_id, index });
        }
        if ports.len() <= floor {
            return Err(GraphError::PortFloorReached { node_id, floor });
        }
        let handle = ports.remove(index);

        match side {
            PortSide::Output => self.remove_edges_where(|e| {
                e.source == node_id && e.source_handle.as_deref() == Some(handle.as_str())
            }),
            PortSide::Input => self.remove_edges_where(|e| {
                e.target == node_id && e.target_handle.as_deref() == Some(handle.as_str())
            }),
        }
        Ok(handle)
    }

    /// Returns all nodes in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns every edge as a full reference (endpoints plus handles).
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeRef> {
        self.graph
            .edge_references()
            .filter_map(|e| self.to_edge_ref(e))
            .collect()
    }

    /// Returns the edges arriving at a node.
    #[must_use]
    pub fn incoming_edges(&self, node_id: NodeId) -> Vec<EdgeRef> {
        let Some(&index) = self.node_index_map.get(&node_id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(index, Direction::Incoming)
            .filter_map(|e| self.to_edge_ref(e))
            .collect()
    }

    /// Returns the edges leaving a node.
    #[must_use]
    pub fn outgoing_edges(&self, node_id: NodeId) -> Vec<EdgeRef> {
        let Some(&index) = self.node_index_map.get(&node_id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(index, Direction::Outgoing)
            .filter_map(|e| self.to_edge_ref(e))
            .collect()
    }

    /// Returns the edge already occupying `(target, target_handle)`, if any.
    ///
    /// An input handle accepts exactly one producer; the connection engine
    /// consults this before accepting a request.
    #[must_use]
    pub fn input_occupant(&self, target: NodeId, target_handle: Option<&str>) -> Option<EdgeRef> {
        self.incoming_edges(target)
            .into_iter()
            .find(|e| e.target_handle.as_deref() == target_handle)
    }

    /// Clears execution state on every node: status back to `Initial`,
    /// outputs and errors wiped.
    pub fn reset_execution(&mut self) {
        for node in self.graph.node_weights_mut() {
            node.reset_execution();
        }
    }

    /// Rebuilds the node index map from the graph.
    pub(crate) fn rebuild_index_map(&mut self) {
        self.node_index_map.clear();
        for index in self.graph.node_indices() {
            if let Some(node) = self.graph.node_weight(index) {
                self.node_index_map.insert(node.id, index);
            }
        }
    }

    pub(crate) fn add_edge_unchecked(&mut self, request: &crate::edge::ConnectRequest) -> EdgeRef {
        let source_index = self.node_index_map[&request.source];
        let target_index = self.node_index_map[&request.target];
        let weight = Edge::new(request.source_handle.clone(), request.target_handle.clone());
        let edge_ref = EdgeRef {
            id: weight.id,
            source: request.source,
            source_handle: weight.source_handle.clone(),
            target: request.target,
            target_handle: weight.target_handle.clone(),
        };
        self.graph.add_edge(source_index, target_index, weight);
        edge_ref
    }

    /// Re-inserts a persisted edge, keeping its id and handles.
    ///
    /// Returns false (and inserts nothing) when either endpoint is unknown:
    /// stale connections in a loaded document are dropped, not fatal.
    pub(crate) fn restore_edge(&mut self, edge: EdgeRef) -> bool {
        let (Some(&source), Some(&target)) = (
            self.node_index_map.get(&edge.source),
            self.node_index_map.get(&edge.target),
        ) else {
            return false;
        };
        self.graph.add_edge(
            source,
            target,
            Edge {
                id: edge.id,
                source_handle: edge.source_handle,
                target_handle: edge.target_handle,
            },
        );
        true
    }

    pub(crate) fn remove_edges_where(&mut self, predicate: impl Fn(&EdgeRef) -> bool) {
        // Edge indices shift on removal; re-scan after each one.
        loop {
            let next = self
                .graph
                .edge_references()
                .find(|e| self.to_edge_ref(*e).is_some_and(|r| predicate(&r)))
                .map(|e| e.id());
            match next {
                Some(index) => {
                    self.graph.remove_edge(index);
                }
                None => break,
            }
        }
    }

    fn to_edge_ref(&self, e: petgraph::graph::EdgeReference<'_, Edge>) -> Option<EdgeRef> {
        let source = self.graph.node_weight(e.source())?.id;
        let target = self.graph.node_weight(e.target())?.id;
        let weight = e.weight();
        Some(EdgeRef {
            id: weight.id,
            source,
            source_handle: weight.source_handle.clone(),
            target,
            target_handle: weight.target_handle.clone(),
        })
    }
}

impl Default for WorkflowGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat serialization shape for the graph: a node list and an edge list.
///
/// Edges referencing unknown nodes are dropped on load rather than
/// poisoning the whole document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphData {
    nodes: Vec<Node>,
    edges: Vec<EdgeRef>,
}

impl From<WorkflowGraph> for GraphData {
    fn from(graph: WorkflowGraph) -> Self {
        Self {
            edges: graph.edges(),
            nodes: graph.graph.into_nodes_edges().0.into_iter().map(|n| n.weight).collect(),
        }
    }
}

impl From<GraphData> for WorkflowGraph {
    fn from(data: GraphData) -> Self {
        let mut graph = WorkflowGraph::new();
        for node in data.nodes {
            graph.insert_node(node);
        }
        for edge in data.edges {
            let (Some(&source), Some(&target)) = (
                graph.node_index_map.get(&edge.source),
                graph.node_index_map.get(&edge.target),
            ) else {
                continue;
            };
            graph.graph.add_edge(
                source,
                target,
                Edge {
                    id: edge.id,
                    source_handle: edge.source_handle,
                    target_handle: edge.target_handle,
                },
            );
        }
        graph
    }
}
