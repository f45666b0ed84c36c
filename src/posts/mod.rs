mod comment;
mod detail;
mod edit;
pub mod form;
mod index;
mod new;
pub mod store;

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    routing::{get, post},
    Router,
};

use crate::{AppError, AppState};

pub use store::NewPost;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/create/", get(new::create_form).post(new::create))
        .route("/posts/{post_id}/", get(detail::post_detail))
        .route("/posts/{post_id}/edit/", get(edit::edit_form).post(edit::edit))
        .route("/posts/{post_id}/comment/", post(comment::add_comment))
}

/// The `{post_id}` path segment. Anything that is not a post id names no
/// post at all.
pub(crate) struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound("post"))?;

        raw.parse::<i64>().map(PostId).map_err(|_| AppError::NotFound("post"))
    }
}
