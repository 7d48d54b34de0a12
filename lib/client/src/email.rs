//! Email template catalog client.
//!
//! The editor's email action config offers a template picker; this client
//! fetches the catalog. The send path lives on `HttpConnector` (the
//! engine's `EmailBackend` port).

use crate::config::ClientConfig;
use crate::error::ClientError;
use serde::Deserialize;

/// One entry in the template catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Client for the email template catalog.
#[derive(Debug, Clone)]
pub struct EmailTemplateCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl EmailTemplateCatalog {
    /// Builds a catalog client from configuration.
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

    /// Lists the available templates.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn list(&self) -> Result<Vec<EmailTemplate>, ClientError> {
        let url = format!("{}/api/email-templates", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
