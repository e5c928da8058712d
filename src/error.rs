use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// ApiError
///
/// The error taxonomy surfaced by the handlers. Each variant maps directly
/// onto one terminal HTTP response; nothing is retried or recovered locally.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The referenced post id does not exist.
    #[error("post with id {0} not found")]
    PostNotFound(Uuid),

    /// The caller asked to retract a vote they never cast.
    #[error("vote does not exist")]
    VoteNotFound,

    /// The caller is not the owner of the resource they tried to mutate.
    #[error("not authorized to perform requested action")]
    Forbidden,

    /// The caller already voted for this post (composite PK conflict).
    #[error("vote already exists")]
    DuplicateVote,

    /// Underlying persistence failure. Logged server-side, reported to the
    /// client as a generic 500 without leaking driver details.
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::PostNotFound(_) | ApiError::VoteNotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::DuplicateVote => StatusCode::CONFLICT,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(ref e) = self {
            tracing::error!("database error: {:?}", e);
        }
        let body = Json(json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
