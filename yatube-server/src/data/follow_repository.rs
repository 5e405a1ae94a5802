use crate::domain::error::DomainError;
use crate::domain::follow::Follow;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Get-or-create; returns true if a new edge was stored.
    async fn create(&self, follow: Follow) -> Result<bool, DomainError>;
    /// Returns true if an edge was removed.
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn create(&self, follow: Follow) -> Result<bool, DomainError> {
        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO follows (user_id, author_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, author_id) DO NOTHING
            RETURNING user_id
            "#,
        )
        .bind(follow.user_id)
        .bind(follow.author_id)
        .bind(follow.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "failed to create follow {} -> {}: {}",
                follow.user_id, follow.author_id, e
            );
            DomainError::from(e)
        })?;

        if inserted.is_some() {
            info!(user_id = %follow.user_id, author_id = %follow.author_id, "follow created");
        }
        Ok(inserted.is_some())
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let affected = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete follow {} -> {}: {}", user_id, author_id, e);
                DomainError::from(e)
            })?
            .rows_affected();

        if affected > 0 {
            info!(user_id = %user_id, author_id = %author_id, "follow deleted");
        }
        Ok(affected > 0)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("db error follow exists {} -> {}: {}", user_id, author_id, e);
            DomainError::from(e)
        })
    }
}
