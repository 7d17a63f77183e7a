/// Session guard middleware for page routes
use crate::{middleware::read_cookie, state::AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use healthshare_core::GuardDecision;

fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Redirects page requests for protected paths that carry no auth cookie.
///
/// Only cookie presence is checked. API routes are skipped; they verify the
/// token in [`super::auth_middleware`].
pub async fn session_guard_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_api_path(&path) {
        return next.run(request).await;
    }

    let token = read_cookie(request.headers(), &state.cookie.name);
    match state.guard.check(&path, token.as_deref()) {
        GuardDecision::Continue => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(path = %path, "Redirecting unauthenticated page request");
            Redirect::temporary(&target).into_response()
        }
    }
}
