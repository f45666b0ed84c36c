//! Process-wide cache for rendered feed pages.
//!
//! Entries live for a fixed time after insertion and are shared by every
//! visitor, so a cached page is a snapshot: writes made while it is alive are
//! not visible until it expires or [`FeedCache::invalidate_all`] is called.

use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

/// Key prefix of the global feed page.
pub const INDEX_PAGE: &str = "index_page";

pub const DEFAULT_TTL: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct FeedCache {
    inner: Cache<String, String>,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(1024)
            .time_to_live(ttl)
            .build();

        Self { inner, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Key of one page of a feed. Only the page parameter varies the key.
    pub fn key(prefix: &str, page: Option<&str>) -> String {
        format!("{prefix}:{}", page.map(str::trim).unwrap_or("1"))
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let hit = self.inner.get(key).await;
        debug!(key, hit = hit.is_some(), "feed cache lookup");
        hit
    }

    pub async fn insert(&self, key: String, html: String) {
        debug!(key, ttl = ?self.ttl, "feed cache store");
        self.inner.insert(key, html).await;
    }

    pub fn invalidate_all(&self) {
        debug!("feed cache cleared");
        self.inner.invalidate_all();
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
