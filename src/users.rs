use sqlx::SqlitePool;

use crate::{AppError, AppResult, db::User};

const USER_COLUMNS: &str = "id,username,email,first_name,last_name";

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub external_id: Option<String>,
}

impl NewUser {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }
}

pub async fn create(db_pool: &SqlitePool, user: NewUser) -> sqlx::Result<User> {
    sqlx::query_as(&format!(
        "INSERT INTO users (username,email,first_name,last_name,external_id) VALUES (?,?,?,?,?) RETURNING {USER_COLUMNS}"
    ))
    .bind(user.username)
    .bind(user.email)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.external_id)
    .fetch_one(db_pool)
    .await
}

pub async fn by_id(db_pool: &SqlitePool, id: i64) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id=?"))
        .bind(id)
        .fetch_optional(db_pool)
        .await
}

pub async fn by_username(db_pool: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username=?"))
        .bind(username)
        .fetch_optional(db_pool)
        .await
}

pub async fn by_external_id(db_pool: &SqlitePool, external_id: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE external_id=?"))
        .bind(external_id)
        .fetch_optional(db_pool)
        .await
}

/// Looks up a profile owner, failing with `NotFound`.
pub async fn get_by_username(db_pool: &SqlitePool, username: &str) -> AppResult<User> {
    by_username(db_pool, username)
        .await?
        .ok_or(AppError::NotFound("user"))
}

pub async fn post_count(db_pool: &SqlitePool, user_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id=?")
        .bind(user_id)
        .fetch_one(db_pool)
        .await
}
