use sqlx::SqlitePool;

use crate::{db::Post, AppError, AppResult};

const POST_COLUMNS: &str = "id,text,pub_date,author_id,group_id,image";

#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: i64,
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl NewPost {
    pub fn text(author_id: i64, text: impl Into<String>) -> Self {
        Self {
            author_id,
            text: text.into(),
            group_id: None,
            image: None,
        }
    }

    pub fn in_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }
}

pub async fn create(db_pool: &SqlitePool, post: NewPost) -> sqlx::Result<Post> {
    sqlx::query_as(&format!(
        "INSERT INTO posts (author_id,text,group_id,image) VALUES (?,?,?,?) RETURNING {POST_COLUMNS}"
    ))
    .bind(post.author_id)
    .bind(post.text)
    .bind(post.group_id)
    .bind(post.image)
    .fetch_one(db_pool)
    .await
}

pub async fn by_id(db_pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Post>> {
    sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn get(db_pool: &SqlitePool, id: i64) -> AppResult<Post> {
    by_id(db_pool, id).await?.ok_or(AppError::NotFound("post"))
}

/// Rewrites the editable fields. Author and publication date never change.
pub async fn update(
    db_pool: &SqlitePool,
    id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE posts SET text=?, group_id=?, image=? WHERE id=?")
        .bind(text)
        .bind(group_id)
        .bind(image)
        .bind(id)
        .execute(db_pool)
        .await?;

    Ok(())
}
