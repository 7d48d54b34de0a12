//! Google service status client.
//!
//! Google-backed action kinds need to know whether the account is connected
//! before offering calendars or documents. The OAuth flow itself happens
//! elsewhere; this client only reads status and disconnects.

use crate::config::ClientConfig;
use crate::error::ClientError;
use serde::Deserialize;
use std::fmt;

/// The Google services backing action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoogleService {
    Calendar,
    Docs,
}

impl GoogleService {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Docs => "docs",
        }
    }
}

impl fmt::Display for GoogleService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection status for one service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleConnectionStatus {
    pub connected: bool,
    /// The connected account, when the backend exposes it.
    #[serde(default)]
    pub email: Option<String>,
}

/// Client for the Google integration endpoints.
#[derive(Debug, Clone)]
pub struct GoogleServices {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleServices {
    /// Builds a client from configuration.
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

    fn url(&self, service: GoogleService, suffix: &str) -> String {
        format!("{}/api/google/{}/{}", self.base_url, service, suffix)
    }

    /// Reads the connection status for a service.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn status(
        &self,
        service: GoogleService,
    ) -> Result<GoogleConnectionStatus, ClientError> {
        let response = self
            .client
            .get(self.url(service, "status"))
            .send()
            .await?;
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

    /// Disconnects the service's account.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn disconnect(&self, service: GoogleService) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url(service, "disconnect"))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        tracing::info!(service = %service, "disconnected Google service");
        Ok(())
    }
}
