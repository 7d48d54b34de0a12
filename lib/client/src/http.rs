//! HTTP implementations of the engine's backend ports.
//!
//! `HttpConnector` carries one shared reqwest client and serves both ports:
//! the arbitrary-URL action backend (`HttpBackend`) and the email-send
//! endpoint (`EmailBackend`). Responses are parsed as JSON when possible so
//! the path extractor can sample them; non-JSON bodies are kept as strings.

use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use flowboard_workflow::node::HttpMethod;
use flowboard_workflow::simulator::{
    BackendError, EmailBackend, EmailSendRequest, HttpActionRequest, HttpBackend,
};
use serde_json::Value as JsonValue;

/// Reqwest-backed implementation of the engine's HTTP and email ports.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    client: reqwest::Client,
    base_url: String,
}

impl HttpConnector {
    /// Builds a connector from configuration.
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

    /// Resolves a possibly-relative URL against the backend base.
    fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Reads a response into the JSON value handed to the engine.
async fn read_body(response: reqwest::Response) -> Result<JsonValue, BackendError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::new(format!("failed to read response: {e}")))?;
    let body = serde_json::from_str(&text).unwrap_or(JsonValue::String(text));

    if status.is_success() {
        Ok(body)
    } else {
        Err(BackendError::new(format!("request failed with status {status}")).with_payload(body))
    }
}

#[async_trait]
impl HttpBackend for HttpConnector {
    async fn execute(&self, request: HttpActionRequest) -> Result<JsonValue, BackendError> {
        let url = self.absolute(&request.url);
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, url = %url, "executing API action");
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::new(format!("request failed: {e}")))?;
        read_body(response).await
    }
}

#[async_trait]
impl EmailBackend for HttpConnector {
    async fn send(&self, request: EmailSendRequest) -> Result<JsonValue, BackendError> {
        let url = format!("{}/api/workflows/actions/email", self.base_url);
        tracing::debug!(
            template = request.template.as_deref().unwrap_or("<none>"),
            recipients = request.recipients.len(),
            "sending templated email"
        );
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::new(format!("email send failed: {e}")))?;
        read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector(base: &str) -> HttpConnector {
        HttpConnector::new(&ClientConfig {
            api_base_url: base.to_string(),
            ..ClientConfig::default()
        })
        .expect("connector")
    }

    #[test]
    fn relative_urls_join_the_base() {
        let connector = connector("http://localhost:8000/");
        assert_eq!(
            connector.absolute("/echo"),
            "http://localhost:8000/echo"
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let connector = connector("http://localhost:8000");
        assert_eq!(
            connector.absolute("https://api.example.com/v1/things"),
            "https://api.example.com/v1/things"
        );
    }

    #[test]
    fn method_mapping_is_complete() {
        assert_eq!(to_reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(to_reqwest_method(HttpMethod::Post), reqwest::Method::POST);
        assert_eq!(to_reqwest_method(HttpMethod::Put), reqwest::Method::PUT);
        assert_eq!(to_reqwest_method(HttpMethod::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest_method(HttpMethod::Delete), reqwest::Method::DELETE);
    }
}
