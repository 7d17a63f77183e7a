/// Core error types for HealthShare
use crate::types::UserId;
use thiserror::Error;

/// Result type alias using `HealthShareError`
pub type Result<T> = std::result::Result<T, HealthShareError>;

/// Core error type shared by the identity and profile capabilities.
///
/// A missing profile on read is not an error: reads return `Option`.
/// `NotFound` is only raised when an operation needs an existing profile
/// (a merge write against a uid that was never provisioned).
#[derive(Error, Debug)]
pub enum HealthShareError {
    /// Missing or malformed required input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Role outside the fixed allow-list
    #[error("Invalid role value: {0}")]
    InvalidRole(String),

    /// No profile stored for this identifier
    #[error("Profile not found: {0}")]
    NotFound(UserId),

    /// Identity already registered for this email
    #[error("Identity already exists: {0}")]
    AlreadyExists(String),

    /// No identity registered for this email
    #[error("No account found for {0}")]
    IdentityNotFound(String),

    /// Password or federated assertion rejected
    #[error("Bad credential")]
    BadCredential,

    /// Profile store failure
    #[error("Profile store unavailable: {0}")]
    StoreUnavailable(String),

    /// Identity provider failure
    #[error("Identity provider unavailable: {0}")]
    IdentityUnavailable(String),
}

impl HealthShareError {
    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a store unavailable error
    pub fn store_unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    /// Create an identity unavailable error
    pub fn identity_unavailable(msg: impl Into<String>) -> Self {
        Self::IdentityUnavailable(msg.into())
    }

    /// Backend failures that may succeed if the caller tries again later
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_) | Self::IdentityUnavailable(_)
        )
    }

    /// Stable machine-readable code used in API error bodies
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidRole(_) => "invalid_role",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::IdentityNotFound(_) => "identity_not_found",
            Self::BadCredential => "bad_credential",
            Self::StoreUnavailable(_) | Self::IdentityUnavailable(_) => "unavailable",
        }
    }
}
