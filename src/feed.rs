//! Feed resolution: which posts a listing page shows, and in what order.
//!
//! Every feed is ordered newest first (`pub_date DESC`, then `id DESC` for
//! posts published in the same millisecond) and paginated with
//! [`Paginator`]. The filter is the only thing that varies between feeds.

use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::{
    db,
    paginate::{Page, Paginator},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedScope {
    /// Every post on the site.
    Global,
    /// Posts filed under one group.
    Group(i64),
    /// Posts written by one user.
    Author(i64),
    /// Posts by the authors a user follows.
    Following(i64),
}

impl FeedScope {
    fn filter(self) -> (&'static str, Option<i64>) {
        match self {
            FeedScope::Global => ("", None),
            FeedScope::Group(group_id) => ("WHERE p.group_id=?", Some(group_id)),
            FeedScope::Author(author_id) => ("WHERE p.author_id=?", Some(author_id)),
            FeedScope::Following(user_id) => (
                "WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id=?)",
                Some(user_id),
            ),
        }
    }
}

/// A post joined with what a listing shows about its author and group.
#[derive(Debug, Clone, FromRow)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub pub_date: OffsetDateTime,
    pub image: Option<String>,
    pub author_id: i64,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

impl PostCard {
    pub fn author_name(&self) -> String {
        db::display_name(
            &self.author_username,
            &self.author_first_name,
            &self.author_last_name,
        )
    }
}

const CARD_SELECT: &str = "SELECT p.id,p.text,p.pub_date,p.image,p.author_id,\
    u.username AS author_username,u.first_name AS author_first_name,u.last_name AS author_last_name,\
    g.slug AS group_slug,g.title AS group_title \
    FROM posts p JOIN users u ON u.id=p.author_id LEFT JOIN post_groups g ON g.id=p.group_id";

const NEWEST_FIRST: &str = "ORDER BY p.pub_date DESC, p.id DESC";

pub async fn count(db_pool: &SqlitePool, scope: FeedScope) -> sqlx::Result<usize> {
    let (filter, arg) = scope.filter();
    let sql = format!("SELECT COUNT(*) FROM posts p {filter}");

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(arg) = arg {
        query = query.bind(arg);
    }
    let count = query.fetch_one(db_pool).await?;

    Ok(usize::try_from(count).unwrap_or_default())
}

/// One page of a feed, `per_page` posts at most.
pub async fn page(
    db_pool: &SqlitePool,
    scope: FeedScope,
    requested: Option<&str>,
    per_page: usize,
) -> sqlx::Result<Page<PostCard>> {
    let paginator = Paginator::new(per_page);
    let count = count(db_pool, scope).await?;
    let window = paginator.locate(count, requested);

    let (filter, arg) = scope.filter();
    let sql = format!("{CARD_SELECT} {filter} {NEWEST_FIRST} LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, PostCard>(&sql);
    if let Some(arg) = arg {
        query = query.bind(arg);
    }
    let posts = query
        .bind(window.limit as i64)
        .bind(window.offset as i64)
        .fetch_all(db_pool)
        .await?;

    Ok(Page::new(posts, window, count, paginator.per_page()))
}

pub async fn card(db_pool: &SqlitePool, post_id: i64) -> sqlx::Result<Option<PostCard>> {
    sqlx::query_as(&format!("{CARD_SELECT} WHERE p.id=?"))
        .bind(post_id)
        .fetch_optional(db_pool)
        .await
}
