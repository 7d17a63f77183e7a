/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use healthshare_core::{types::wire::ErrorBody, HealthShareError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Domain(#[from] HealthShareError),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Authorization failed: {0}")]
    Forbidden(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

impl From<healthshare_storage::StorageError> for ServerError {
    fn from(err: healthshare_storage::StorageError) -> Self {
        ServerError::Domain(err.into())
    }
}

impl ServerError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ServerError::Domain(HealthShareError::invalid_request(msg))
    }

    fn status_and_body(&self) -> (StatusCode, String, &'static str) {
        match self {
            ServerError::Domain(err) if err.is_transient() => {
                tracing::error!("Backend error: {}", err);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    UNAVAILABLE_MESSAGE.to_string(),
                    err.code(),
                )
            }
            ServerError::Domain(err) => {
                let status = match err {
                    HealthShareError::InvalidRequest(_) | HealthShareError::InvalidRole(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    HealthShareError::NotFound(_) | HealthShareError::IdentityNotFound(_) => {
                        StatusCode::NOT_FOUND
                    }
                    HealthShareError::AlreadyExists(_) => StatusCode::CONFLICT,
                    HealthShareError::BadCredential => StatusCode::UNAUTHORIZED,
                    HealthShareError::StoreUnavailable(_)
                    | HealthShareError::IdentityUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, err.to_string(), err.code())
            }
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), "unauthenticated"),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), "forbidden"),
            ServerError::Jwt(e) => {
                tracing::warn!("JWT error: {:?}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    "Invalid token".to_string(),
                    "unauthenticated",
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "internal",
                )
            }
            ServerError::Config(msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                    "internal",
                )
            }
            ServerError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password error".to_string(),
                    "internal",
                )
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error, code) = self.status_and_body();

        let body = Json(ErrorBody {
            error,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
