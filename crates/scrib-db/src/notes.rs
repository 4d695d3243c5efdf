//! Note repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use scrib_core::{CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest};

const NOTE_COLUMNS: &str = "id, title, content, user_id, created_at, updated_at";

/// PostgreSQL implementation of NoteRepository.
///
/// Every statement carries the owner in its WHERE clause; a note that
/// exists but belongs to another user is indistinguishable from a
/// missing one.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let sql = format!(
            r#"
            INSERT INTO notes (title, content, user_id)
            VALUES ($1, $2, $3)
            RETURNING {NOTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Note>(&sql)
            .bind(&req.title)
            .bind(&req.content)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Note> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND user_id = $2");

        sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))
    }

    async fn list(&self, user_id: Uuid, limit: Option<i64>) -> Result<Vec<Note>> {
        let mut sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1 ORDER BY created_at DESC"
        );

        let limit = limit.filter(|n| *n > 0);
        if limit.is_some() {
            sql.push_str(" LIMIT $2");
        }

        let mut q = sqlx::query_as::<_, Note>(&sql).bind(user_id);
        if let Some(n) = limit {
            q = q.bind(n);
        }

        q.fetch_all(&self.pool).await.map_err(Error::Database)
    }

    async fn update(&self, id: Uuid, user_id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let sql = format!(
            r#"
            UPDATE notes
            SET title = $1, content = $2, updated_at = now()
            WHERE id = $3 AND user_id = $4
            RETURNING {NOTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Note>(&sql)
            .bind(&req.title)
            .bind(&req.content)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }
}
