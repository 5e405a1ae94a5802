use crate::domain::error::DomainError;
use crate::domain::post::{GroupRef, Post, PostCard, PostChanges, PostScope};
use crate::domain::user::Author;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create(&self, post: Post) -> Result<Post, DomainError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError>;
    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, DomainError>;
    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, DomainError>;
    async fn count(&self, scope: PostScope) -> Result<u64, DomainError>;
    /// Newest first.
    async fn list(
        &self,
        scope: PostScope,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostCard>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CARD_SELECT: &str = r#"
    SELECT p.id, p.text, p.created_at, p.image,
           p.author_id, u.username AS author_username,
           g.slug AS group_slug, g.title AS group_title
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

#[derive(sqlx::FromRow)]
struct PostCardRow {
    id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
    image: Option<String>,
    author_id: Uuid,
    author_username: String,
    group_slug: Option<String>,
    group_title: Option<String>,
}

impl From<PostCardRow> for PostCard {
    fn from(row: PostCardRow) -> Self {
        let group = match (row.group_slug, row.group_title) {
            (Some(slug), Some(title)) => Some(GroupRef { slug, title }),
            _ => None,
        };
        PostCard {
            id: row.id,
            text: row.text,
            created_at: row.created_at,
            image: row.image,
            author: Author {
                id: row.author_id,
                username: row.author_username,
            },
            group,
        }
    }
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: PostScope) {
    match scope {
        PostScope::All => {}
        PostScope::Group(group_id) => {
            qb.push(" WHERE p.group_id = ").push_bind(group_id);
        }
        PostScope::Author(author_id) => {
            qb.push(" WHERE p.author_id = ").push_bind(author_id);
        }
        PostScope::FollowedBy(user_id) => {
            qb.push(" WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: Post) -> Result<Post, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, text, created_at, image, author_id, group_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(post.id)
        .bind(&post.text)
        .bind(post.created_at)
        .bind(&post.image)
        .bind(post.author_id)
        .bind(post.group_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to create post: {}", e);
            DomainError::from(e)
        })?;

        info!(post_id = %post.id, author_id = %post.author_id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        sqlx::query_as::<_, Post>(
            r#"
            SELECT id, text, created_at, image, author_id, group_id
            FROM posts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("db error find_by_id {}: {}", id, e);
            DomainError::from(e)
        })
    }

    async fn find_card(&self, id: Uuid) -> Result<Option<PostCard>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(CARD_SELECT);
        qb.push(" WHERE p.id = ").push_bind(id);

        let row = qb
            .build_query_as::<PostCardRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("db error find_card {}: {}", id, e);
                DomainError::from(e)
            })?;

        Ok(row.map(PostCard::from))
    }

    async fn update(&self, id: Uuid, changes: PostChanges) -> Result<Option<Post>, DomainError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET
                text = $1,
                group_id = $2,
                image = COALESCE($3, image)
            WHERE id = $4
            RETURNING id, text, created_at, image, author_id, group_id
            "#,
        )
        .bind(changes.text)
        .bind(changes.group_id)
        .bind(changes.image)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to update post {}: {}", id, e);
            DomainError::from(e)
        })?;

        if post.is_some() {
            info!(post_id = %id, "post updated");
        }

        Ok(post)
    }

    async fn count(&self, scope: PostScope) -> Result<u64, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        push_scope(&mut qb, scope);

        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while counting posts {:?}: {}", scope, e);
                DomainError::from(e)
            })?;

        Ok(count.max(0) as u64)
    }

    async fn list(
        &self,
        scope: PostScope,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostCard>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(CARD_SELECT);
        push_scope(&mut qb, scope);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind(offset as i64);

        let rows = qb
            .build_query_as::<PostCardRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error while fetching posts {:?}: {}", scope, e);
                DomainError::from(e)
            })?;

        Ok(rows.into_iter().map(PostCard::from).collect())
    }
}
