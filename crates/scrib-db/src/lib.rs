//! # scrib-db
//!
//! PostgreSQL database layer for scrib.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, notes, and cards
//! - Full-text search with PostgreSQL tsvector
//!
//! ## Example
//!
//! ```rust,ignore
//! use scrib_db::Database;
//! use scrib_core::{CreateNoteRequest, NoteRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/scrib").await?;
//!
//!     let note = db.notes.create(user_id, CreateNoteRequest {
//!         title: "Hello".to_string(),
//!         content: "World".to_string(),
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod cards;
pub mod notes;
pub mod pool;
pub mod search;
pub mod users;

// Re-export core types
pub use scrib_core::*;

// Re-export repository implementations
pub use cards::PgCardRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use search::{format_tsquery, PgSearchRepository};
pub use users::PgUserRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User account repository.
    pub users: PgUserRepository,
    /// Note repository for CRUD operations.
    pub notes: PgNoteRepository,
    /// Card repository for CRUD operations.
    pub cards: PgCardRepository,
    /// Full-text search provider.
    pub search: PgSearchRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            cards: PgCardRepository::new(pool.clone()),
            search: PgSearchRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
