mod follow;
mod page;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/{username}/", get(page::profile))
        .route("/profile/{username}/follow/", get(follow::profile_follow))
        .route("/profile/{username}/unfollow/", get(follow::profile_unfollow))
        .route("/follow/", get(follow::follow_index))
}
