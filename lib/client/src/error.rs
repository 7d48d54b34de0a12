//! Error types for backend connectors.

use std::fmt;

/// Errors from backend API calls.
#[derive(Debug)]
pub enum ClientError {
    /// The request never produced a response (connection, TLS, timeout).
    Transport { message: String },
    /// The backend answered with a non-success status.
    Status { status: u16, body: String },
    /// The response body could not be decoded into the expected shape.
    Decode { message: String },
    /// Configuration could not be loaded.
    Config(config::ConfigError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { message } => write!(f, "request failed: {message}"),
            Self::Status { status, body } => {
                write!(f, "backend returned {status}: {body}")
            }
            Self::Decode { message } => write!(f, "could not decode response: {message}"),
            Self::Config(e) => write!(f, "configuration error: {e}"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode {
                message: error.to_string(),
            }
        } else {
            Self::Transport {
                message: error.to_string(),
            }
        }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(error: config::ConfigError) -> Self {
        Self::Config(error)
    }
}
