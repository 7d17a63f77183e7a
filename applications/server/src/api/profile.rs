/// Profile API routes
use crate::{
    api::auth::json_body,
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use healthshare_core::{
    types::wire::{ProfileEnvelope, WriteProfileRequest, WriteProfileResponse},
    ProfileSummary, UserId,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub uid: Option<String>,
}

fn target_uid(raw: Option<&str>) -> Result<UserId> {
    raw.and_then(UserId::parse)
        .ok_or_else(|| ServerError::bad_request("uid is required"))
}

/// Owners may act on their own profile; admins on any.
///
/// Changing a role needs an admin, even on the caller's own profile. The
/// caller's role is loaded from the store on every call.
async fn authorize(
    state: &AppState,
    caller: &AuthenticatedUser,
    target: &UserId,
    changes_role: bool,
) -> Result<()> {
    if caller.uid() == target && !changes_role {
        return Ok(());
    }

    let caller_profile = state
        .profile_service
        .read(Some(caller.uid().as_str()))
        .await?;

    match caller_profile {
        Some(profile) if profile.role.is_admin() => Ok(()),
        _ => {
            tracing::warn!(
                caller = %caller.uid(),
                target = %target,
                changes_role,
                "Profile access denied"
            );
            Err(ServerError::Forbidden(
                "Not allowed to access this profile".to_string(),
            ))
        }
    }
}

/// GET /api/profile?uid=...
pub async fn get_profile(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let uid = target_uid(query.uid.as_deref())?;
    authorize(&state, &caller, &uid, false).await?;

    let user = state.profile_service.read(Some(uid.as_str())).await?;
    let status = if user.is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    Ok((status, Json(ProfileEnvelope { user })).into_response())
}

/// POST /api/profile
pub async fn write_profile(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    payload: std::result::Result<Json<WriteProfileRequest>, JsonRejection>,
) -> Result<Json<WriteProfileResponse>> {
    let (uid, update) = json_body(payload)?.into_parts();
    let uid = target_uid(uid.as_deref())?;
    // Field errors win over access errors: a bad role is always invalid_role
    update.clone().validate()?;
    authorize(&state, &caller, &uid, update.role.is_some()).await?;

    let user = state
        .profile_service
        .write(Some(uid.as_str()), update)
        .await?;

    Ok(Json(WriteProfileResponse {
        success: true,
        message: "Profile updated".to_string(),
        user,
    }))
}

/// GET /api/profiles
pub async fn list_profiles(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
) -> Result<Json<Vec<ProfileSummary>>> {
    let profiles = state.profile_service.list().await?;
    Ok(Json(profiles))
}
