/// Authentication middleware
use crate::{error::ServerError, middleware::read_cookie, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use healthshare_core::UserId;

/// Extension type to store the authenticated uid in the request
/// Can be used as an extractor in handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn uid(&self) -> &UserId {
        &self.0
    }
}

/// Middleware that validates the ID token from the Authorization header or
/// the auth cookie
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = bearer
        .or_else(|| read_cookie(request.headers(), &state.cookie.name))
        .ok_or_else(|| ServerError::Auth("Missing ID token".to_string()))?;

    let uid = state.auth_service.verify_id_token(&token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ServerError::Auth("Invalid token".to_string())
    })?;

    request.extensions_mut().insert(AuthenticatedUser(uid));

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so AuthenticatedUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}
