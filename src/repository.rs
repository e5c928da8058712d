use crate::models::{CreatePostRequest, Post, PostWithVotes, User, Vote};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// PostQuery
///
/// An inert description of one aggregated post read: optional id constraint,
/// title substring filter, and pagination window. Both the list and the
/// get-by-id paths build one of these and hand it to the repository, so the
/// vote-count join is rendered in exactly one place.
#[derive(Debug, Clone)]
pub struct PostQuery {
    /// Constrain the read to a single post id.
    pub id: Option<Uuid>,
    /// Substring matched against the title. Empty matches every post.
    pub search: String,
    /// Maximum rows returned.
    pub limit: i64,
    /// Rows skipped before the window starts (storage order).
    pub skip: i64,
}

pub const DEFAULT_LIMIT: i64 = 10;

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            id: None,
            search: String::new(),
            limit: DEFAULT_LIMIT,
            skip: 0,
        }
    }
}

impl PostQuery {
    /// A query for exactly one post.
    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            limit: 1,
            ..Self::default()
        }
    }

    /// A filtered, paginated listing query. `None` falls back to the
    /// defaults: match-all search, limit 10, skip 0.
    pub fn filtered(search: Option<String>, limit: Option<i64>, skip: Option<i64>) -> Self {
        Self {
            id: None,
            search: search.unwrap_or_default(),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
            skip: skip.unwrap_or(0),
        }
    }
}

/// Repository Trait
///
/// The abstract contract for all persistence operations, shared across the
/// application as `Arc<dyn Repository>` so handlers never see the concrete
/// backend. Every method is one implicit transaction: committed on Ok,
/// surfaced to the handler as `sqlx::Error` otherwise.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Post Retrieval ---
    /// Executes a `PostQuery`: posts left-joined with votes, grouped by
    /// post id, each row carrying its live vote count.
    async fn posts_with_votes(&self, query: &PostQuery) -> Result<Vec<PostWithVotes>, sqlx::Error>;
    /// Plain row fetch by id, used for existence and ownership checks.
    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error>;

    // --- Post Mutation ---
    /// Inserts a new post owned by `owner_id` and returns the stored row
    /// with its generated id and created_at.
    async fn create_post(&self, req: CreatePostRequest, owner_id: Uuid)
    -> Result<Post, sqlx::Error>;
    /// Full-field replace of title/content/published. Returns the updated
    /// row, or None if the post vanished since the caller's check.
    async fn update_post(
        &self,
        id: Uuid,
        req: CreatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error>;
    /// Deletes the row. True if a row was removed.
    async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Identity ---
    /// Looks up the caller's account for the auth extractor.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;

    // --- Votes ---
    /// Inserts a vote row. False on conflict (the caller already voted).
    async fn cast_vote(&self, vote: Vote) -> Result<bool, sqlx::Error>;
    /// Removes a vote row. False if no such vote existed.
    async fn remove_vote(&self, vote: Vote) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL connection pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// posts_with_votes
    ///
    /// Renders the `PostQuery` through QueryBuilder with bound parameters.
    /// The LEFT JOIN keeps posts with zero votes in the result; COUNT over
    /// `v.post_id` (never `*`) counts only actual vote rows. No ORDER BY:
    /// results come back in storage order, windowed by OFFSET/LIMIT.
    async fn posts_with_votes(&self, query: &PostQuery) -> Result<Vec<PostWithVotes>, sqlx::Error> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.title, p.content, p.published, p.created_at, p.owner_id,
                COUNT(v.post_id) AS votes
            FROM posts p
            LEFT JOIN votes v ON v.post_id = p.id
            WHERE p.title LIKE
            "#,
        );

        // Substring match; the empty search renders as '%%' and matches all,
        // so the WHERE clause shape is identical for every query.
        builder.push_bind(format!("%{}%", query.search));

        if let Some(id) = query.id {
            builder.push(" AND p.id = ");
            builder.push_bind(id);
        }

        builder.push(" GROUP BY p.id OFFSET ");
        builder.push_bind(query.skip);
        builder.push(" LIMIT ");
        builder.push_bind(query.limit);

        builder
            .build_query_as::<PostWithVotes>()
            .fetch_all(&self.pool)
            .await
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            "SELECT id, title, content, published, created_at, owner_id FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_post(
        &self,
        req: CreatePostRequest,
        owner_id: Uuid,
    ) -> Result<Post, sqlx::Error> {
        let new_id = Uuid::new_v4();
        sqlx::query_as::<_, Post>(
            r#"INSERT INTO posts (id, title, content, published, created_at, owner_id)
               VALUES ($1, $2, $3, $4, NOW(), $5)
               RETURNING id, title, content, published, created_at, owner_id"#,
        )
        .bind(new_id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.published)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
    }

    /// update_post
    ///
    /// Unconditional full-field replace; ownership has already been checked
    /// by the handler against the same id. The `WHERE id` guard means a post
    /// deleted between check and act yields None, not a resurrected row.
    async fn update_post(
        &self,
        id: Uuid,
        req: CreatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as::<_, Post>(
            r#"UPDATE posts
               SET title = $2, content = $3, published = $4
               WHERE id = $1
               RETURNING id, title, content, published, created_at, owner_id"#,
        )
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.published)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// cast_vote
    ///
    /// `ON CONFLICT DO NOTHING` against the composite primary key makes the
    /// insert idempotent; a duplicate vote affects zero rows without erroring.
    async fn cast_vote(&self, vote: Vote) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO votes (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
                .bind(vote.post_id)
                .bind(vote.user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_vote(&self, vote: Vote) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM votes WHERE post_id = $1 AND user_id = $2")
            .bind(vote.post_id)
            .bind(vote.user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
