//! Error types for the HealthShare client.

use thiserror::Error;

/// Errors that can occur when talking to a HealthShare server or driving
/// the profile view.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with an error body
    #[error("Server error ({status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Authentication required but no token available
    #[error("Authentication required")]
    AuthRequired,

    /// Credentials or token rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// Request exceeded its time limit
    #[error("Request timed out")]
    Timeout,

    /// Request aborted because the view was torn down
    #[error("Request cancelled")]
    Cancelled,

    /// Another operation is already in flight
    #[error("An operation is already in progress")]
    Busy,

    /// Action not valid in the current view state
    #[error("Not allowed while {0}")]
    InvalidState(&'static str),
}

impl ClientError {
    /// Machine-readable code from the server, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
