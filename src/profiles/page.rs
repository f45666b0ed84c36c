use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::Html,
};
use sqlx::SqlitePool;

use crate::{
    auth::Viewer,
    config::Config,
    db::User,
    feed::{self, FeedScope},
    follows, include_res,
    paginate::PageQuery,
    render::{self, escape},
    res::fill,
    users, AppResult,
};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn profile(
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    Viewer(viewer): Viewer,
) -> AppResult<Html<String>> {
    let author = users::get_by_username(&db_pool, &username).await?;
    let page = feed::page(&db_pool, FeedScope::Author(author.id), query.page(), config.posts_per_page).await?;

    let following = match &viewer {
        Some(viewer) => follows::is_following(&db_pool, viewer.id, author.id).await?,
        None => false,
    };
    let followers = follows::follower_count(&db_pool, author.id).await?;

    let header = fill(
        include_res!(str, "/pages/posts/profile_header.html"),
        &[
            ("author_name", &escape(&author.display_name())),
            ("post_count", &page.count.to_string()),
            ("follow", &follow_button(&author, viewer.as_ref(), following, followers)),
        ],
    );
    let body = fill(
        include_res!(str, "/pages/feed.html"),
        &[
            ("heading", &escape(&format!("@{}", author.username))),
            ("header", &header),
            ("posts", &render::post_list(&page)),
        ],
    );

    Ok(Html(render::layout(&format!("Profile of {}", author.display_name()), &body)))
}

fn follow_button(author: &User, viewer: Option<&User>, following: bool, followers: i64) -> String {
    let count = format!("<p>Followers: {followers}</p>");
    if viewer.is_some_and(|viewer| viewer.id == author.id) {
        return count;
    }

    let username = escape(&author.username);
    let button = if following {
        format!(r#"<a class="button unfollow" href="/profile/{username}/unfollow/">Unfollow</a>"#)
    } else {
        format!(r#"<a class="button follow" href="/profile/{username}/follow/">Follow</a>"#)
    };
    count + &button
}
