use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here sits behind the `AuthUser` route layer in lib.rs, so
/// handlers always receive a resolved caller identity. Ownership checks for
/// update/delete run inside the handlers against that identity.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /posts?search=...&limit=...&skip=...
        // Lists posts from all owners with live vote counts.
        // POST /posts
        // Creates a post owned by the caller.
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        // GET/PUT/DELETE /posts/{id}
        // Reads carry no ownership restriction; update and delete enforce
        // the owner-only check (404 on missing id, 403 on foreign posts).
        .route(
            "/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        // POST /votes
        // Casts (dir=1) or retracts (dir=0) the caller's vote on a post.
        // The composite primary key on `votes` enforces one vote per user
        // per post; duplicates report 409.
        .route("/votes", post(handlers::cast_vote))
}
