use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The caller's canonical identity record stored in the `users` table.
/// Resolved during authentication and referenced by `posts.owner_id` and
/// `votes.user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// Post
///
/// The primary content resource, one row in the `posts` table.
/// `owner_id` is fixed at creation and never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    // Plain flag, not a workflow state; list/get do not filter on it.
    pub published: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // FK to users.id (Owner).
    pub owner_id: Uuid,
}

/// PostWithVotes
///
/// Read-time projection: a Post joined with the live count of its vote rows.
/// Computed per request by the repository's aggregated read, never stored.
/// Flattened in both JSON and row mapping so the wire shape is one object.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PostWithVotes {
    #[serde(flatten)]
    #[sqlx(flatten)]
    #[ts(flatten)]
    pub post: Post,
    /// COUNT of vote rows referencing this post at read time.
    pub votes: i64,
}

/// Vote
///
/// A single vote record in the `votes` table. Composite primary key,
/// existence-only: no payload beyond (post_id, user_id).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Vote {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

/// --- Request Payloads (Input Schemas) ---

fn default_published() -> bool {
    true
}

/// CreatePostRequest
///
/// Input payload for POST /posts and the full-replacement payload for
/// PUT /posts/{id}. `published` may be omitted and defaults to true.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_published")]
    pub published: bool,
}

impl Default for CreatePostRequest {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            published: true,
        }
    }
}

/// VoteRequest
///
/// Input payload for POST /votes. `dir` selects the action:
/// 1 casts a vote for `post_id`, 0 retracts the caller's existing vote.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VoteRequest {
    pub post_id: Uuid,
    pub dir: i16,
}
