//! Client configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate. The
//! environment always wins (`FLOWBOARD__API_BASE_URL=...`), optionally
//! layered over a config file for local development.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration for the backend connectors.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the persistence/action backend.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    /// Auto-save debounce window, in milliseconds.
    /// Rapid edits within the window coalesce into one write.
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}

fn default_autosave_debounce_ms() -> u64 {
    2000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
            autosave_debounce_ms: default_autosave_debounce_ms(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if present configuration is malformed.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::build(None)
    }

    /// Loads configuration from a file, with the environment layered on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable or malformed.
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(Some(path))
    }

    fn build(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder
            .add_source(
                config::Environment::with_prefix("FLOWBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// The per-request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// The auto-save debounce window as a `Duration`.
    #[must_use]
    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_sensible() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.autosave_debounce(), Duration::from_millis(2000));
    }

    #[test]
    fn loads_from_a_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        writeln!(
            file,
            "api_base_url = \"https://flow.example.com\"\nautosave_debounce_ms = 500"
        )
        .expect("write");

        let config = ClientConfig::from_file(file.path()).expect("load");
        assert_eq!(config.api_base_url, "https://flow.example.com");
        assert_eq!(config.autosave_debounce_ms, 500);
        // Unset keys fall back to defaults.
        assert_eq!(config.request_timeout_seconds, 30);
    }
}
