//! Card CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use scrib_core::{CardRepository, CreateCardRequest, UpdateCardRequest};

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

/// Request body for updating only the status code.
#[derive(Debug, Deserialize)]
pub struct UpdateCardStatusRequest {
    pub status: i16,
}

/// Create a card owned by the caller.
pub async fn create_card(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<CreateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.db.cards.create(caller.id, req).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// List all of the caller's cards, newest first.
pub async fn list_cards(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let cards = state.db.cards.list(caller.id).await?;
    Ok(Json(cards))
}

/// List the caller's pending cards.
pub async fn list_pending_cards(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let cards = state.db.cards.list_pending(caller.id).await?;
    Ok(Json(cards))
}

/// Fetch a single card.
pub async fn get_card(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.db.cards.get(id, caller.id).await?;
    Ok(Json(card))
}

/// Update a card's title, description, and status.
pub async fn update_card(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state.db.cards.update(id, caller.id, req).await?;
    Ok(Json(card))
}

/// Update only a card's status code.
pub async fn update_card_status(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCardStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let card = state
        .db
        .cards
        .update_status(id, caller.id, req.status)
        .await?;
    Ok(Json(card))
}

/// Delete a card.
pub async fn delete_card(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.cards.delete(id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
