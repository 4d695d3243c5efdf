//! Note CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use scrib_core::{CreateNoteRequest, NoteRepository, UpdateNoteRequest};

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

/// Query parameters for listing notes.
#[derive(Debug, Deserialize)]
pub struct ListNotesQuery {
    /// Maximum number of notes to return; omitted or zero means all.
    pub limit: Option<i64>,
}

/// Create a note owned by the caller.
pub async fn create_note(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(req): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.db.notes.create(caller.id, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// List the caller's notes, newest first.
pub async fn list_notes(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<ListNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.db.notes.list(caller.id, query.limit).await?;
    Ok(Json(notes))
}

/// Fetch a single note.
pub async fn get_note(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.db.notes.get(id, caller.id).await?;
    Ok(Json(note))
}

/// Update a note's title and content.
pub async fn update_note(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.db.notes.update(id, caller.id, req).await?;
    Ok(Json(note))
}

/// Delete a note.
pub async fn delete_note(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.notes.delete(id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
