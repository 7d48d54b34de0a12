//! Persistence wire documents.
//!
//! The backend owns storage; this module owns the lossless mapping between
//! the in-memory `Workflow` and the backend's document shape:
//!
//! ```json
//! {
//!   "name": "...", "description": null, "is_active": true,
//!   "nodes": [{"node_id": "...", "position": {"x": 0, "y": 0}, "data": {...}}],
//!   "connections": [{"connection_id": "...", "source_node_id": "...",
//!                    "target_node_id": "...", "source_handle": null,
//!                    "target_handle": null}]
//! }
//! ```
//!
//! A node's `data` blob carries its label, description and tagged config.
//! Execution state (status, outputs, errors) is runtime-only and never
//! persisted. Connections referencing unknown nodes are dropped on load.

use crate::definition::{Workflow, WorkflowMetadata};
use crate::edge::EdgeRef;
use crate::graph::WorkflowGraph;
use crate::node::{Node, NodeConfig, NodeStatus, Position};
use flowboard_core::{EdgeId, NodeId, WorkflowId};
use serde::{Deserialize, Serialize};

/// The `data` blob stored per node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub config: NodeConfig,
}

/// One node entry in a workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub node_id: NodeId,
    pub position: Position,
    pub data: NodeData,
}

/// One connection entry in a workflow document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    pub connection_id: EdgeId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    #[serde(default)]
    pub source_handle: Option<String>,
    #[serde(default)]
    pub target_handle: Option<String>,
}

/// A complete workflow document in the backend's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
    pub nodes: Vec<NodeDocument>,
    pub connections: Vec<ConnectionDocument>,
}

impl WorkflowDocument {
    /// Projects a workflow into the wire shape.
    #[must_use]
    pub fn from_workflow(workflow: &Workflow) -> Self {
        let nodes = workflow
            .graph
            .nodes()
            .map(|node| NodeDocument {
                node_id: node.id,
                position: node.position,
                data: NodeData {
                    label: node.label.clone(),
                    description: node.description.clone(),
                    config: node.config.clone(),
                },
            })
            .collect();

        let connections = workflow
            .graph
            .edges()
            .into_iter()
            .map(|edge| ConnectionDocument {
                connection_id: edge.id,
                source_node_id: edge.source,
                target_node_id: edge.target,
                source_handle: edge.source_handle,
                target_handle: edge.target_handle,
            })
            .collect();

        Self {
            name: workflow.metadata.name.clone(),
            description: workflow.metadata.description.clone(),
            is_active: workflow.metadata.is_active,
            nodes,
            connections,
        }
    }

    /// Rebuilds a workflow from the wire shape under the given id.
    ///
    /// Node and connection ids are preserved; connections whose endpoints
    /// are missing from the node list are dropped. Every node starts in
    /// `Initial` status with no outputs.
    #[must_use]
    pub fn into_workflow(self, id: WorkflowId) -> Workflow {
        let mut graph = WorkflowGraph::new();
        for entry in self.nodes {
            graph.insert_node(Node {
                id: entry.node_id,
                label: entry.data.label,
                description: entry.data.description,
                position: entry.position,
                config: entry.data.config,
                status: NodeStatus::Initial,
                last_output: None,
                last_error: None,
            });
        }
        for connection in self.connections {
            let restored = graph.restore_edge(EdgeRef {
                id: connection.connection_id,
                source: connection.source_node_id,
                source_handle: connection.source_handle,
                target: connection.target_node_id,
                target_handle: connection.target_handle,
            });
            if !restored {
                tracing::debug!(
                    connection_id = %connection.connection_id,
                    "dropping connection with unknown endpoint"
                );
            }
        }

        let mut metadata = WorkflowMetadata::new(self.name);
        metadata.description = self.description;
        metadata.is_active = self.is_active;

        Workflow {
            id,
            metadata,
            graph,
        }
    }
}

impl From<&Workflow> for WorkflowDocument {
    fn from(workflow: &Workflow) -> Self {
        Self::from_workflow(workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::ConnectRequest;
    use crate::node::{ApiActionConfig, HttpMethod, NodeKind};
    use serde_json::json;

    fn sample_workflow() -> Workflow {
        let mut workflow = Workflow::new("Ingest");
        let start = workflow
            .graph
            .add_node(NodeKind::Start, Position::new(0.0, 0.0));
        let action = workflow
            .graph
            .add_node(NodeKind::ApiAction, Position::new(200.0, 40.0));
        workflow
            .graph
            .update_node_config(
                action,
                NodeConfig::ApiAction(ApiActionConfig {
                    url: Some("/ingest".to_string()),
                    method: HttpMethod::Put,
                    ..ApiActionConfig::default()
                }),
            )
            .expect("same kind");
        let end = workflow
            .graph
            .add_node(NodeKind::End, Position::new(400.0, 0.0));
        workflow.graph.connect(ConnectRequest::new(start, action));
        workflow
            .graph
            .connect(ConnectRequest::new(action, end).from_handle("output-1"));
        workflow
    }

    #[test]
    fn document_round_trip_preserves_topology() {
        let workflow = sample_workflow();
        let document = WorkflowDocument::from_workflow(&workflow);
        let restored = document.into_workflow(workflow.id);

        assert_eq!(restored.id, workflow.id);
        assert_eq!(restored.name(), "Ingest");
        assert_eq!(restored.graph.node_count(), workflow.graph.node_count());
        assert_eq!(restored.graph.edge_count(), workflow.graph.edge_count());

        // Kinds, configs and positions survive.
        for node in workflow.graph.nodes() {
            let restored_node = restored.graph.node(node.id).expect("node survives");
            assert_eq!(restored_node.kind(), node.kind());
            assert_eq!(restored_node.config, node.config);
            assert_eq!(restored_node.position, node.position);
        }

        // Edge endpoints and handles survive.
        let mut original_edges = workflow.graph.edges();
        let mut restored_edges = restored.graph.edges();
        original_edges.sort_by_key(|e| e.id);
        restored_edges.sort_by_key(|e| e.id);
        assert_eq!(original_edges, restored_edges);
    }

    #[test]
    fn execution_state_is_not_persisted() {
        let mut workflow = sample_workflow();
        let id = workflow.graph.nodes().next().unwrap().id;
        workflow
            .graph
            .node_mut(id)
            .unwrap()
            .complete_execution(json!({"cached": true}));

        let document = WorkflowDocument::from_workflow(&workflow);
        let restored = document.into_workflow(workflow.id);
        let node = restored.graph.node(id).unwrap();
        assert_eq!(node.status, NodeStatus::Initial);
        assert!(node.last_output.is_none());
    }

    #[test]
    fn stale_connections_are_dropped_on_load() {
        let workflow = sample_workflow();
        let mut document = WorkflowDocument::from_workflow(&workflow);
        document.connections.push(ConnectionDocument {
            connection_id: EdgeId::new(),
            source_node_id: NodeId::new(),
            target_node_id: NodeId::new(),
            source_handle: None,
            target_handle: None,
        });

        let restored = document.into_workflow(workflow.id);
        assert_eq!(restored.graph.edge_count(), workflow.graph.edge_count());
    }

    #[test]
    fn wire_shape_uses_backend_field_names() {
        let workflow = sample_workflow();
        let document = WorkflowDocument::from_workflow(&workflow);
        let json = serde_json::to_value(&document).expect("serialize");

        assert!(json.get("is_active").is_some());
        let node = &json["nodes"][0];
        assert!(node.get("node_id").is_some());
        assert!(node["data"].get("kind").is_some());
        let connection = &json["connections"][0];
        assert!(connection.get("connection_id").is_some());
        assert!(connection.get("source_node_id").is_some());
        assert!(connection.get("target_node_id").is_some());
    }

    #[test]
    fn document_serde_roundtrip() {
        let document = WorkflowDocument::from_workflow(&sample_workflow());
        let json = serde_json::to_string(&document).expect("serialize");
        let parsed: WorkflowDocument = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(document, parsed);
    }
}
