//! Workflow persistence client.
//!
//! CRUD over the backend's `/api/workflows` endpoints, exchanging the
//! document wire shape owned by `flowboard_workflow::document`.

use crate::config::ClientConfig;
use crate::error::ClientError;
use flowboard_core::WorkflowId;
use flowboard_workflow::WorkflowDocument;
use serde::Deserialize;

/// A workflow as returned by the backend: the document plus its id.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredWorkflow {
    pub id: WorkflowId,
    #[serde(flatten)]
    pub document: WorkflowDocument,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: WorkflowId,
}

/// Client for the workflow persistence backend.
#[derive(Debug, Clone)]
pub struct WorkflowStore {
    client: reqwest::Client,
    base_url: String,
}

impl WorkflowStore {
    /// Builds a store client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/api/workflows{}", self.base_url, suffix)
    }

    /// Lists all stored workflows.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn list(&self) -> Result<Vec<StoredWorkflow>, ClientError> {
        let response = self.client.get(self.url("")).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Fetches one workflow by id.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn get(&self, id: WorkflowId) -> Result<StoredWorkflow, ClientError> {
        let response = self.client.get(self.url(&format!("/{id}"))).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Creates a workflow and returns the id the backend assigned.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn create(&self, document: &WorkflowDocument) -> Result<WorkflowId, ClientError> {
        let response = self
            .client
            .post(self.url(""))
            .json(document)
            .send()
            .await?;
        let created: CreateResponse = check(response).await?.json().await?;
        tracing::info!(workflow_id = %created.id, "created workflow");
        Ok(created.id)
    }

    /// Replaces a stored workflow's document.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn update(
        &self,
        id: WorkflowId,
        document: &WorkflowDocument,
    ) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/{id}")))
            .json(document)
            .send()
            .await?;
        check(response).await?;
        tracing::debug!(workflow_id = %id, "updated workflow");
        Ok(())
    }

    /// Deletes a stored workflow.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn delete(&self, id: WorkflowId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.url(&format!("/{id}")))
            .send()
            .await?;
        check(response).await?;
        tracing::info!(workflow_id = %id, "deleted workflow");
        Ok(())
    }
}

/// Turns non-success statuses into `ClientError::Status` with the body kept
/// for diagnostics.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_rooted_at_api_workflows() {
        let store = WorkflowStore::new(&ClientConfig::default()).expect("store");
        assert_eq!(store.url(""), "http://localhost:8000/api/workflows");
        let id = WorkflowId::new();
        assert_eq!(
            store.url(&format!("/{id}")),
            format!("http://localhost:8000/api/workflows/{id}")
        );
    }

    #[test]
    fn stored_workflow_flattens_the_document() {
        let id = WorkflowId::new();
        let json = serde_json::json!({
            "id": id,
            "name": "Digest",
            "description": null,
            "is_active": true,
            "nodes": [],
            "connections": []
        });
        let stored: StoredWorkflow = serde_json::from_value(json).expect("deserialize");
        assert_eq!(stored.id, id);
        assert_eq!(stored.document.name, "Digest");
        assert!(stored.document.nodes.is_empty());
    }
}
