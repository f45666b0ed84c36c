//! Follow edges between users.
//!
//! An edge `user -> author` puts the author's posts into the user's
//! following feed. There is at most one edge per pair and never one from a
//! user to themself.

use sqlx::SqlitePool;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Created,
    AlreadyFollowing,
    /// Nothing was stored; users cannot follow themselves.
    SelfFollow,
}

pub async fn follow(db_pool: &SqlitePool, user_id: i64, author_id: i64) -> sqlx::Result<FollowOutcome> {
    if user_id == author_id {
        debug!(user_id, "ignoring self-follow");
        return Ok(FollowOutcome::SelfFollow);
    }

    let result = sqlx::query(
        "INSERT INTO follows (user_id,author_id) VALUES (?,?) ON CONFLICT (user_id,author_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(author_id)
    .execute(db_pool)
    .await?;

    let outcome = if result.rows_affected() == 0 {
        FollowOutcome::AlreadyFollowing
    } else {
        FollowOutcome::Created
    };
    debug!(user_id, author_id, ?outcome, "follow");

    Ok(outcome)
}

/// Removes the edge if there is one. Returns whether anything was removed.
pub async fn unfollow(db_pool: &SqlitePool, user_id: i64, author_id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id=? AND author_id=?")
        .bind(user_id)
        .bind(author_id)
        .execute(db_pool)
        .await?;

    let removed = result.rows_affected() > 0;
    debug!(user_id, author_id, removed, "unfollow");

    Ok(removed)
}

pub async fn is_following(db_pool: &SqlitePool, user_id: i64, author_id: i64) -> sqlx::Result<bool> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM follows WHERE user_id=? AND author_id=?)")
        .bind(user_id)
        .bind(author_id)
        .fetch_one(db_pool)
        .await
}

/// Number of users following `author_id`.
pub async fn follower_count(db_pool: &SqlitePool, author_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE author_id=?")
        .bind(author_id)
        .fetch_one(db_pool)
        .await
}
