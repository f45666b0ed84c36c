use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Query, State},
    response::Html,
};
use sqlx::SqlitePool;

use crate::{
    cache::{FeedCache, INDEX_PAGE},
    config::Config,
    feed::{self, FeedScope},
    include_res,
    paginate::PageQuery,
    render,
    res::fill,
    AppResult,
};

/// The global feed. The rendered page is shared by every visitor until the
/// cache entry expires, so it must not depend on who is asking.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn index(
    Query(query): Query<PageQuery>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    State(feed_cache): State<FeedCache>,
) -> AppResult<Html<String>> {
    let key = FeedCache::key(INDEX_PAGE, query.page());
    if let Some(html) = feed_cache.get(&key).await {
        return Ok(Html(html));
    }

    let page = feed::page(&db_pool, FeedScope::Global, query.page(), config.posts_per_page).await?;
    let body = fill(
        include_res!(str, "/pages/feed.html"),
        &[
            ("heading", "Latest posts"),
            ("header", ""),
            ("posts", &render::post_list(&page)),
        ],
    );
    let html = render::layout("Yatube", &body);

    feed_cache.insert(key, html.clone()).await;
    Ok(Html(html))
}
