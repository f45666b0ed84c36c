use axum::{
    debug_handler,
    extract::State,
    response::Redirect,
    Form,
};
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    auth::LoggedIn,
    comments,
    posts::{form::CommentForm, store, PostId},
    AppResult,
};

/// Adds a comment and goes back to the post. A blank comment is dropped
/// without a message.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn add_comment(
    LoggedIn(user): LoggedIn,
    PostId(post_id): PostId,
    State(db_pool): State<SqlitePool>,
    Form(form): Form<CommentForm>,
) -> AppResult<Redirect> {
    let post = store::get(&db_pool, post_id).await?;

    match form.clean() {
        Ok(text) => {
            let comment_id = comments::create(&db_pool, post.id, user.id, text).await?;
            debug!(comment_id, post_id, author = %user.username, "comment added");
        }
        Err(errors) => debug!(post_id, ?errors, "comment rejected"),
    }

    Ok(Redirect::to(&format!("/posts/{post_id}/")))
}
