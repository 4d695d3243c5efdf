//! Full-text search handler.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use scrib_core::{SearchRepository, SearchResults};

use crate::auth::AuthUser;
use crate::{ApiError, AppState};

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Raw free-text query. Absent or whitespace-only matches nothing.
    #[serde(default)]
    pub q: String,
}

/// Response envelope: the two lists stay independently ranked.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: SearchResults,
}

/// Ranked search across the caller's notes and cards.
pub async fn search(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(user = %caller.email, query = %query.q, "Running search");
    let results = state.db.search.search(&query.q, caller.id).await?;
    Ok(Json(SearchResponse { results }))
}
