/// Authentication API routes
use crate::{
    error::{Result, ServerError},
    state::{AppState, CookieSettings},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use healthshare_core::types::wire::{
    FederatedSignInRequest, SessionResponse, SignInRequest, SignUpRequest,
};

/// Unwrap a JSON body, reporting malformed input as `invalid_request`
pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ServerError::bad_request(e.body_text()))
}

fn cookie_header(settings: &CookieSettings, value: &str, max_age: u64) -> Result<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        settings.name, value, max_age
    );
    if settings.secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| ServerError::Internal(format!("bad cookie: {e}")))
}

fn session_response(
    state: &AppState,
    status: StatusCode,
    session: SessionResponse,
) -> Result<Response> {
    let cookie = cookie_header(&state.cookie, &session.id_token, session.expires_in)?;
    Ok((status, [(header::SET_COOKIE, cookie)], Json(session)).into_response())
}

/// POST /api/auth/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<Response> {
    let req = json_body(payload)?;
    let session = state.account_service.sign_up(&req).await?;
    session_response(&state, StatusCode::CREATED, session)
}

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Response> {
    let req = json_body(payload)?;
    let session = state.account_service.sign_in(&req).await?;
    session_response(&state, StatusCode::OK, session)
}

/// POST /api/auth/federated
pub async fn federated(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FederatedSignInRequest>, JsonRejection>,
) -> Result<Response> {
    let req = json_body(payload)?;
    let session = state
        .account_service
        .federated_sign_in(&req.assertion)
        .await?;
    session_response(&state, StatusCode::OK, session)
}

/// POST /api/auth/sign-out
pub async fn sign_out(State(state): State<AppState>) -> Result<Response> {
    let cleared = cookie_header(&state.cookie, "", 0)?;
    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cleared)]).into_response())
}
