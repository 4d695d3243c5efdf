//! Account handlers: registration, login, and password reset.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use scrib_core::{CreateUserRequest, UserRepository};

use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::{ApiError, AppState};

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Request body for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body carrying a freshly issued token.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Request body for changing the password.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Create a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;

    // Duplicate emails surface as 409 via the unique constraint.
    let user = state
        .db
        .users
        .create(CreateUserRequest {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Verify credentials and issue a signed token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.users.get_by_email(&req.email).await?;

    // Same rejection for unknown email and wrong password.
    let user = match user {
        Some(user) if verify_password(&req.password, &user.password_hash) => user,
        _ => return Err(ApiError::Unauthorized("Invalid credentials".to_string())),
    };

    let token = issue_token(&state.jwt, &user, state.token_ttl)?;
    Ok(Json(LoginResponse { token }))
}

/// Change the caller's password after verifying the old one.
pub async fn reset_password(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.old_password.is_empty() || req.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Old password and new password are required".to_string(),
        ));
    }

    let user = state
        .db
        .users
        .get_by_id(caller.id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    if !verify_password(&req.old_password, &user.password_hash) {
        return Err(ApiError::Unauthorized("Incorrect password".to_string()));
    }

    let new_hash = hash_password(&req.new_password)?;
    state.db.users.update_password(user.id, &new_hash).await?;

    Ok(Json(serde_json::json!({
        "message": "Password reset successful"
    })))
}
