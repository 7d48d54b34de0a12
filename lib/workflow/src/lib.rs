//! Workflow graph model and client-side execution engine for flowboard.
//!
//! This crate provides the core of the visual workflow editor:
//!
//! - **Graph Model**: directed graphs using petgraph with typed nodes and
//!   port-addressed edges (`graph`, `node`, `edge`)
//! - **Connection Engine**: the accept/reject/transform rules for edge
//!   requests (`connect`)
//! - **Path Extractor**: depth-bounded flattening of sample outputs into
//!   addressable paths (`paths`)
//! - **Binding Resolver**: static/dynamic field bindings and the
//!   `{{{...}}}` placeholder wire format (`binding`)
//! - **Execution Simulator**: per-kind dispatch driving the node status
//!   state machine over backend port traits (`simulator`, `condition`)
//! - **Persistence mapping**: lossless round-trip to the backend's
//!   document shape (`definition`, `document`)

pub mod binding;
pub mod condition;
pub mod connect;
pub mod definition;
pub mod document;
pub mod edge;
pub mod error;
pub mod graph;
pub mod layout;
pub mod node;
pub mod paths;
pub mod simulator;

pub use binding::{Binding, BindingCandidate, BindingField, Placeholder};
pub use condition::ConditionOperator;
pub use connect::ConnectOutcome;
pub use definition::{Workflow, WorkflowMetadata, WorkflowSummary};
pub use document::WorkflowDocument;
pub use edge::{ConnectRequest, Edge, EdgeRef};
pub use error::GraphError;
pub use graph::WorkflowGraph;
pub use layout::{LayoutEngine, apply_layout};
pub use node::{Node, NodeConfig, NodeKind, NodeStatus, Position};
pub use paths::{PathEntry, PathKind, extract_paths};
pub use simulator::{
    BackendError, EmailBackend, EmailSendRequest, ExecutionError, HttpActionRequest, HttpBackend,
    Simulator,
};
