//! Workflow definition types.
//!
//! A workflow is a named automation consisting of metadata and a graph.
//! The persistence backend owns the stored format; `Workflow` is the
//! in-memory source of truth the editor mutates, and the `document` module
//! maps it to the backend's wire shape.

use crate::graph::WorkflowGraph;
use chrono::{DateTime, Utc};
use flowboard_core::WorkflowId;
use serde::{Deserialize, Serialize};

/// Metadata for a workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Human-readable name for this workflow.
    pub name: String,
    /// Description of what this workflow does.
    pub description: Option<String>,
    /// Whether this workflow is active (eligible for backend scheduling).
    pub is_active: bool,
    /// When this workflow was created.
    pub created_at: DateTime<Utc>,
    /// When this workflow was last updated.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowMetadata {
    /// Creates new metadata with default values.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A complete workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier for this workflow.
    pub id: WorkflowId,
    /// Workflow metadata.
    pub metadata: WorkflowMetadata,
    /// The workflow graph (nodes and edges).
    pub graph: WorkflowGraph,
}

impl Workflow {
    /// Creates a new workflow with the given name and an empty graph.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkflowId::new(),
            metadata: WorkflowMetadata::new(name),
            graph: WorkflowGraph::new(),
        }
    }

    /// Creates a workflow with a specific ID.
    #[must_use]
    pub fn with_id(id: WorkflowId, name: impl Into<String>) -> Self {
        Self {
            id,
            metadata: WorkflowMetadata::new(name),
            graph: WorkflowGraph::new(),
        }
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Returns whether the workflow is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.metadata.is_active
    }

    /// Activates the workflow.
    pub fn activate(&mut self) {
        self.metadata.is_active = true;
        self.touch();
    }

    /// Deactivates the workflow.
    pub fn deactivate(&mut self) {
        self.metadata.is_active = false;
        self.touch();
    }

    /// Marks the workflow as updated (bumps the updated_at timestamp).
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

/// Summary information about a workflow (for listings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    /// Workflow ID.
    pub id: WorkflowId,
    /// Workflow name.
    pub name: String,
    /// Description, if any.
    pub description: Option<String>,
    /// Whether active.
    pub is_active: bool,
    /// Number of nodes in the graph.
    pub node_count: usize,
    /// Last updated timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&Workflow> for WorkflowSummary {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: workflow.id,
            name: workflow.metadata.name.clone(),
            description: workflow.metadata.description.clone(),
            is_active: workflow.metadata.is_active,
            node_count: workflow.graph.node_count(),
            updated_at: workflow.metadata.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_creation() {
        let workflow = Workflow::new("Morning digest");
        assert_eq!(workflow.name(), "Morning digest");
        assert!(workflow.is_active());
        assert_eq!(workflow.graph.node_count(), 0);
    }

    #[test]
    fn activate_deactivate() {
        let mut workflow = Workflow::new("Test");

        workflow.deactivate();
        assert!(!workflow.is_active());

        workflow.activate();
        assert!(workflow.is_active());
    }

    #[test]
    fn summary_from_workflow() {
        let mut workflow = Workflow::new("Summary");
        workflow.metadata = WorkflowMetadata::new("Summary").with_description("does things");
        let summary = WorkflowSummary::from(&workflow);

        assert_eq!(summary.id, workflow.id);
        assert_eq!(summary.description.as_deref(), Some("does things"));
        assert_eq!(summary.node_count, 0);
    }

    #[test]
    fn workflow_serde_roundtrip() {
        let workflow = Workflow::new("Roundtrip");
        let json = serde_json::to_string(&workflow).expect("serialize");
        let parsed: Workflow = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(workflow.id, parsed.id);
        assert_eq!(workflow.name(), parsed.name());
    }
}
