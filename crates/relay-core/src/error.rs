//! Error types for relay-core

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error types
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Token file not found for identifier: {0}")]
    CredentialNotFound(String),

    #[error("Token for identifier {identifier} could not be read: {reason}")]
    CredentialUnreadable { identifier: String, reason: String },

    #[error("Upstream host is not allowed: {0}")]
    HostNotAllowed(String),

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("Upstream request failed: {0}")]
    UpstreamFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::UpstreamFailure(err.to_string())
    }
}
