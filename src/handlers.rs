use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{self, CreatePostRequest, Post, PostWithVotes, Vote, VoteRequest},
    repository::PostQuery,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// PostFilter
///
/// Accepted query parameters for the post listing endpoint (GET /posts).
/// Bound by Axum's Query extractor; all three are optional and default to
/// match-all / limit 10 / skip 0 inside `PostQuery::filtered`.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PostFilter {
    /// Substring matched against post titles.
    pub search: Option<String>,
    /// Maximum number of rows returned.
    pub limit: Option<i64>,
    /// Number of rows skipped before the page starts.
    pub skip: Option<i64>,
}

// --- Handlers ---

/// list_posts
///
/// [Authenticated Route] Lists posts from all owners with their live vote
/// counts, filtered by title substring and windowed by limit/skip.
#[utoipa::path(
    get,
    path = "/posts",
    params(PostFilter),
    responses((status = 200, description = "Filtered posts with vote counts", body = [PostWithVotes]))
)]
pub async fn list_posts(
    _caller: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<Vec<models::PostWithVotes>>, ApiError> {
    let query = PostQuery::filtered(filter.search, filter.limit, filter.skip);
    let posts = state.repo.posts_with_votes(&query).await?;
    Ok(Json(posts))
}

/// create_post
///
/// [Authenticated Route] Creates a new post owned by the caller. The
/// owner_id is taken from the resolved identity, never from the payload.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses((status = 201, description = "Created", body = Post))
)]
pub async fn create_post(
    AuthUser { id: owner_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<models::Post>), ApiError> {
    let post = state.repo.create_post(payload, owner_id).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// get_post
///
/// [Authenticated Route] Retrieves a single post with its vote count.
/// Same aggregated read as the listing, constrained to one id. Reads carry
/// no ownership restriction.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostWithVotes),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    _caller: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::PostWithVotes>, ApiError> {
    let mut posts = state.repo.posts_with_votes(&PostQuery::by_id(id)).await?;
    match posts.pop() {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::PostNotFound(id)),
    }
}

/// update_post
///
/// [Authenticated Route] Full-field replace of the caller's own post.
/// Existence is checked before ownership so a missing post reports 404 and
/// a foreign post reports 403. The check and the update are separate
/// statements; the update still carries `WHERE id`, so a post deleted in
/// between yields 404 rather than a lost write.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<models::Post>, ApiError> {
    let existing = state
        .repo
        .get_post(id)
        .await?
        .ok_or(ApiError::PostNotFound(id))?;

    if existing.owner_id != user_id {
        return Err(ApiError::Forbidden);
    }

    match state.repo.update_post(id, payload).await? {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::PostNotFound(id)),
    }
}

/// delete_post
///
/// [Authenticated Route] Deletes the caller's own post. Same 404/403 split
/// as update; associated votes are removed by the schema's cascade.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let existing = state
        .repo
        .get_post(id)
        .await?
        .ok_or(ApiError::PostNotFound(id))?;

    if existing.owner_id != user_id {
        return Err(ApiError::Forbidden);
    }

    if state.repo.delete_post(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::PostNotFound(id))
    }
}

/// cast_vote
///
/// [Authenticated Route] Records or retracts the caller's vote on a post.
/// `dir = 1` casts (409 on duplicate), anything else retracts (404 if the
/// caller never voted). The post must exist either way.
#[utoipa::path(
    post,
    path = "/votes",
    request_body = VoteRequest,
    responses(
        (status = 201, description = "Vote cast"),
        (status = 204, description = "Vote retracted"),
        (status = 404, description = "Post or vote not found"),
        (status = 409, description = "Already voted")
    )
)]
pub async fn cast_vote(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<VoteRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .repo
        .get_post(payload.post_id)
        .await?
        .ok_or(ApiError::PostNotFound(payload.post_id))?;

    let vote = Vote {
        post_id: payload.post_id,
        user_id,
    };

    if payload.dir == 1 {
        if state.repo.cast_vote(vote).await? {
            Ok(StatusCode::CREATED)
        } else {
            Err(ApiError::DuplicateVote)
        }
    } else if state.repo.remove_vote(vote).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::VoteNotFound)
    }
}
