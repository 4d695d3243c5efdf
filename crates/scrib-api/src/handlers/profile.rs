//! Profile handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use scrib_core::UserRepository;

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

/// Request body for updating the profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
}

/// Return the caller's account.
pub async fn get_profile(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users
        .get_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user))
}

/// Update the caller's first and last name.
pub async fn update_profile(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "First name and last name are required".to_string(),
        ));
    }

    let user = state
        .db
        .users
        .update_profile(caller.id, &req.first_name, &req.last_name)
        .await?;

    Ok(Json(user))
}
