//! # scrib-core
//!
//! Core types, traits, and abstractions for scrib.
//!
//! This crate provides:
//! - Domain models (users, notes, cards, search results)
//! - Repository traits implemented by the database layer
//! - The generation backend abstraction
//! - The shared error type and `Result` alias

pub mod error;
pub mod models;
pub mod traits;

pub use error::{Error, Result};
pub use models::{card_status, Card, Note, SearchResults, User};
pub use traits::{
    CardRepository, CreateCardRequest, CreateNoteRequest, CreateUserRequest, GenerateResponse,
    GenerationBackend, NoteRepository, SearchRepository, UpdateCardRequest, UpdateNoteRequest,
    UserRepository,
};
