//! Text-generation passthrough handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use scrib_core::GenerateResponse;

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

/// Request body for the passthrough.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

/// Forward a prompt to the configured generation backend.
pub async fn generate(
    State(state): State<AppState>,
    _caller: AuthUser,
    Json(req): Json<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }

    let backend = state
        .inference
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("Generation backend not configured".to_string()))?;

    let response = backend.generate(&req.prompt).await?;
    Ok(Json(GenerateResponse { response }))
}
