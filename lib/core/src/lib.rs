//! Core domain types for the flowboard workflow editor.
//!
//! This crate provides the strongly-typed identifiers and the error handling
//! foundation shared by the graph engine and the backend clients.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EdgeId, NodeId, ParseIdError, WorkflowId};
