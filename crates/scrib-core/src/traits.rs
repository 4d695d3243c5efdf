//! Core traits for scrib abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Card, Note, SearchResults, User};

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Request for creating a new user. The password arrives already hashed;
/// repositories never see plaintext credentials.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Repository for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, returning the stored row.
    async fn create(&self, req: CreateUserRequest) -> Result<User>;

    /// Fetch a user by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Fetch a user by email, including the password hash.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update first/last name, returning the updated row.
    async fn update_profile(&self, id: Uuid, first_name: &str, last_name: &str) -> Result<User>;

    /// Replace the stored password hash.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}

/// Request for updating an existing note.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
}

/// Repository for note CRUD operations. Every operation is scoped to the
/// owning user; a row belonging to someone else behaves as absent.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note owned by `user_id`.
    async fn create(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a single note.
    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Note>;

    /// List the user's notes, newest first. `limit` of zero or `None`
    /// returns everything.
    async fn list(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<Note>>;

    /// Update title and content.
    async fn update(&self, id: Uuid, user_id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Delete a note.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()>;
}

// =============================================================================
// CARD REPOSITORY
// =============================================================================

/// Request for creating a new card. Status defaults to pending.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCardRequest {
    pub title: String,
    pub description: String,
    pub status: Option<i16>,
}

/// Request for updating an existing card.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCardRequest {
    pub title: String,
    pub description: String,
    pub status: i16,
}

/// Repository for card CRUD operations, owner-scoped like notes.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// Insert a new card owned by `user_id`.
    async fn create(&self, user_id: Uuid, req: CreateCardRequest) -> Result<Card>;

    /// Fetch a single card.
    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Card>;

    /// List all of the user's cards, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Card>>;

    /// List the user's pending cards, newest first.
    async fn list_pending(&self, user_id: Uuid) -> Result<Vec<Card>>;

    /// Update title, description and status.
    async fn update(&self, id: Uuid, user_id: Uuid, req: UpdateCardRequest) -> Result<Card>;

    /// Update only the status code.
    async fn update_status(&self, id: Uuid, user_id: Uuid, status: i16) -> Result<Card>;

    /// Delete a card.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()>;
}

// =============================================================================
// SEARCH
// =============================================================================

/// Read-only full-text search across both record types.
#[async_trait]
pub trait SearchRepository: Send + Sync {
    /// Run the ranked search for `query`, scoped to rows owned by
    /// `user_id`. Zero matches is a successful, empty result.
    async fn search(&self, query: &str, user_id: Uuid) -> Result<SearchResults>;
}

// =============================================================================
// GENERATION BACKEND
// =============================================================================

/// Backend capable of text generation (third-party passthrough).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Response envelope for the generation passthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}
