use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use sqlx::SqlitePool;

use crate::{
    auth::LoggedIn,
    config::Config,
    feed::{self, FeedScope},
    follows, include_res,
    paginate::PageQuery,
    render,
    res::fill,
    users, AppResult,
};

/// Subscribes the caller to the author. Following yourself or following
/// twice changes nothing; either way the caller lands on the profile.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile_follow(
    LoggedIn(user): LoggedIn,
    Path(username): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Redirect> {
    let author = users::get_by_username(&db_pool, &username).await?;
    follows::follow(&db_pool, user.id, author.id).await?;

    Ok(Redirect::to(&format!("/profile/{}/", author.username)))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile_unfollow(
    LoggedIn(user): LoggedIn,
    Path(username): Path<String>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Redirect> {
    let author = users::get_by_username(&db_pool, &username).await?;
    follows::unfollow(&db_pool, user.id, author.id).await?;

    Ok(Redirect::to("/follow/"))
}

/// Posts by everyone the caller follows.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn follow_index(
    LoggedIn(user): LoggedIn,
    Query(query): Query<PageQuery>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
) -> AppResult<Html<String>> {
    let page = feed::page(&db_pool, FeedScope::Following(user.id), query.page(), config.posts_per_page).await?;

    let body = fill(
        include_res!(str, "/pages/feed.html"),
        &[
            ("heading", "Posts of authors you follow"),
            ("header", ""),
            ("posts", &render::post_list(&page)),
        ],
    );

    Ok(Html(render::layout("Following", &body)))
}
