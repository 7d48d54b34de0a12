//! Backend connectors for the flowboard workflow editor.
//!
//! The graph engine reaches every external collaborator through a port
//! trait; this crate provides the HTTP implementations:
//!
//! - `HttpConnector`: the arbitrary-URL action backend and the email-send
//!   endpoint (implements the engine's `HttpBackend`/`EmailBackend` ports)
//! - `WorkflowStore`: CRUD over `/api/workflows` in the document wire shape
//! - `EmailTemplateCatalog`: the template listing for email action configs
//! - `GoogleServices`: connection status for Google-backed action kinds
//! - `Autosaver`: debounced, coalescing persistence of graph edits
//!
//! Configuration comes from the environment (`FLOWBOARD__*`), optionally
//! layered over a config file.

pub mod autosave;
pub mod config;
pub mod email;
pub mod error;
pub mod google;
pub mod http;
pub mod store;

pub use autosave::{Autosaver, WorkflowSink};
pub use config::ClientConfig;
pub use email::{EmailTemplate, EmailTemplateCatalog};
pub use error::ClientError;
pub use google::{GoogleConnectionStatus, GoogleService, GoogleServices};
pub use http::HttpConnector;
pub use store::{StoredWorkflow, WorkflowStore};
