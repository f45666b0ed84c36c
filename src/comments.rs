use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use crate::db;

#[derive(Debug, Clone, FromRow)]
pub struct CommentCard {
    pub id: i64,
    pub post_id: i64,
    pub text: String,
    pub created: OffsetDateTime,
    pub author_id: i64,
    pub author_username: String,
    pub author_first_name: String,
    pub author_last_name: String,
}

impl CommentCard {
    pub fn author_name(&self) -> String {
        db::display_name(
            &self.author_username,
            &self.author_first_name,
            &self.author_last_name,
        )
    }
}

/// Appends a comment; `text` must already be validated.
pub async fn create(
    db_pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> sqlx::Result<i64> {
    sqlx::query_scalar("INSERT INTO comments (post_id,author_id,text) VALUES (?,?,?) RETURNING id")
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(db_pool)
        .await
}

/// Comments of a post in the order they were written.
pub async fn for_post(db_pool: &SqlitePool, post_id: i64) -> sqlx::Result<Vec<CommentCard>> {
    sqlx::query_as(
        "SELECT c.id,c.post_id,c.text,c.created,c.author_id,\
         u.username AS author_username,u.first_name AS author_first_name,u.last_name AS author_last_name \
         FROM comments c JOIN users u ON u.id=c.author_id \
         WHERE c.post_id=? ORDER BY c.id ASC",
    )
    .bind(post_id)
    .fetch_all(db_pool)
    .await
}
