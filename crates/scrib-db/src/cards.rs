//! Card repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use scrib_core::{
    card_status, Card, CardRepository, CreateCardRequest, Error, Result, UpdateCardRequest,
};

const CARD_COLUMNS: &str = "id, title, description, status, user_id, created_at, updated_at";

/// PostgreSQL implementation of CardRepository.
pub struct PgCardRepository {
    pool: Pool<Postgres>,
}

impl PgCardRepository {
    /// Create a new PgCardRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CardRepository for PgCardRepository {
    async fn create(&self, user_id: Uuid, req: CreateCardRequest) -> Result<Card> {
        let sql = format!(
            r#"
            INSERT INTO cards (title, description, status, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {CARD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Card>(&sql)
            .bind(&req.title)
            .bind(&req.description)
            .bind(req.status.unwrap_or(card_status::PENDING))
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Card> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = $1 AND user_id = $2");

        sqlx::query_as::<_, Card>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::CardNotFound(id))
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Card>> {
        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE user_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Card>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn list_pending(&self, user_id: Uuid) -> Result<Vec<Card>> {
        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE user_id = $1 AND status = $2 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Card>(&sql)
            .bind(user_id)
            .bind(card_status::PENDING)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn update(&self, id: Uuid, user_id: Uuid, req: UpdateCardRequest) -> Result<Card> {
        let sql = format!(
            r#"
            UPDATE cards
            SET title = $1, description = $2, status = $3, updated_at = now()
            WHERE id = $4 AND user_id = $5
            RETURNING {CARD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Card>(&sql)
            .bind(&req.title)
            .bind(&req.description)
            .bind(req.status)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::CardNotFound(id))
    }

    async fn update_status(&self, id: Uuid, user_id: Uuid, status: i16) -> Result<Card> {
        let sql = format!(
            r#"
            UPDATE cards
            SET status = $1, updated_at = now()
            WHERE id = $2 AND user_id = $3
            RETURNING {CARD_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Card>(&sql)
            .bind(status)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::CardNotFound(id))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CardNotFound(id));
        }
        Ok(())
    }
}
