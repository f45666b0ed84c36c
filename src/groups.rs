use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::Html,
};
use sqlx::SqlitePool;

use crate::{
    AppError, AppResult,
    config::Config,
    db::Group,
    feed::{self, FeedScope},
    include_res,
    paginate::PageQuery,
    render::{self, escape},
    res::fill,
};

const GROUP_COLUMNS: &str = "id,title,slug,description";

/// Groups are created by administrators; there is no page for it.
pub async fn create(
    db_pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> sqlx::Result<Group> {
    sqlx::query_as(&format!(
        "INSERT INTO post_groups (title,slug,description) VALUES (?,?,?) RETURNING {GROUP_COLUMNS}"
    ))
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(db_pool)
    .await
}

pub async fn by_slug(db_pool: &SqlitePool, slug: &str) -> sqlx::Result<Option<Group>> {
    sqlx::query_as(&format!("SELECT {GROUP_COLUMNS} FROM post_groups WHERE slug=?"))
        .bind(slug)
        .fetch_optional(db_pool)
        .await
}

pub async fn get_by_slug(db_pool: &SqlitePool, slug: &str) -> AppResult<Group> {
    by_slug(db_pool, slug)
        .await?
        .ok_or(AppError::NotFound("group"))
}

pub async fn exists(db_pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM post_groups WHERE id=?)")
        .bind(id)
        .fetch_one(db_pool)
        .await
}

pub async fn all(db_pool: &SqlitePool) -> sqlx::Result<Vec<Group>> {
    sqlx::query_as(&format!("SELECT {GROUP_COLUMNS} FROM post_groups ORDER BY title,id"))
        .fetch_all(db_pool)
        .await
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn group_posts(
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    State(db_pool): State<SqlitePool>,
    State(config): State<std::sync::Arc<Config>>,
) -> AppResult<Html<String>> {
    let group = get_by_slug(&db_pool, &slug).await?;
    let page = feed::page(
        &db_pool,
        FeedScope::Group(group.id),
        query.page(),
        config.posts_per_group,
    )
    .await?;

    let header = fill(
        include_res!(str, "/pages/posts/group_header.html"),
        &[("description", &escape(&group.description))],
    );
    let body = fill(
        include_res!(str, "/pages/feed.html"),
        &[
            ("heading", &escape(&group.title)),
            ("header", &header),
            ("posts", &render::post_list(&page)),
        ],
    );

    Ok(Html(render::layout(&format!("Posts of group {group}"), &body)))
}
