//! Error types for the dynamic DNS updater
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure: connection refused, DNS failure, timeout, unreadable body
    #[error("Network error: {0}")]
    Network(String),

    /// The remote endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, kept as the diagnostic
        body: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input (e.g. a lookup body that is not an IP address)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a non-success status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error came from talking to a remote endpoint
    ///
    /// Both transport failures and non-success statuses count.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }

    /// Diagnostic text suitable for an update outcome
    ///
    /// For status errors this is the bare response body.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Status { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}
