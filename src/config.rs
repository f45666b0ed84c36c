//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded first by
//! `main`). Anything unset falls back to [`Config::default`]; anything set but
//! unparsable is an error.
use std::{fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Origin the OAuth providers redirect back to.
    pub public_url: String,
    /// JSON file with the OAuth provider keys.
    pub client_secret_path: PathBuf,
    pub media_root: PathBuf,
    /// Page size of the global, profile and following feeds.
    pub posts_per_page: usize,
    /// Page size of group feeds.
    pub posts_per_group: usize,
    pub index_cache_ttl: Duration,
    pub session_inactivity: time::Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            database_url: "sqlite://yatube.db".to_owned(),
            max_connections: 16,
            public_url: "http://localhost:8080".to_owned(),
            client_secret_path: PathBuf::from("client_secret.json"),
            media_root: PathBuf::from("media"),
            posts_per_page: 10,
            posts_per_group: 10,
            index_cache_ttl: crate::cache::DEFAULT_TTL,
            session_inactivity: time::Duration::minutes(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            host: var("APP_HOST").unwrap_or(defaults.host),
            port: parsed("PORT")?.unwrap_or(defaults.port),
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parsed("DB_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections),
            public_url: var("PUBLIC_URL").unwrap_or(defaults.public_url),
            client_secret_path: var("CLIENT_SECRET_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.client_secret_path),
            media_root: var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            posts_per_page: parsed("POSTS_PER_PAGE")?.unwrap_or(defaults.posts_per_page),
            posts_per_group: parsed("POSTS_PER_GROUP")?.unwrap_or(defaults.posts_per_group),
            index_cache_ttl: parsed("INDEX_CACHE_SECONDS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.index_cache_ttl),
            session_inactivity: parsed("SESSION_INACTIVITY_MINUTES")?
                .map(time::Duration::minutes)
                .unwrap_or(defaults.session_inactivity),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn var(key: &str) -> Option<String> {
    match dotenv::var(key) {
        Ok(value) => Some(value),
        Err(_) => {
            info!("{key} not set, using default");
            None
        }
    }
}

fn parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    var(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("invalid {key} value {raw:?}"))
        })
        .transpose()
}
