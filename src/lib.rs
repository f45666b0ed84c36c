pub mod about;
pub mod appresult;
pub mod auth;
pub mod cache;
pub mod comments;
pub mod config;
pub mod db;
pub mod feed;
pub mod follows;
pub mod groups;
pub mod paginate;
pub mod posts;
pub mod profiles;
pub mod render;
pub mod res;
pub mod session;
pub mod users;

use std::sync::Arc;

use anyhow::anyhow;
use axum::{extract::FromRef, response::{Html, IntoResponse}, routing::get, Router};
use serde_json::Value;
use sqlx::SqlitePool;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

pub use appresult::{AppError, AppResult};
use cache::FeedCache;
use config::Config;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub clients: auth::Clients,
    pub feed_cache: FeedCache,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, clients: auth::Clients, config: Config) -> Self {
        Self {
            db_pool,
            clients,
            feed_cache: FeedCache::new(config.index_cache_ttl),
            config: Arc::new(config),
        }
    }
}

/// Every route of the site. Needs a session layer on top, see [`app`].
pub fn router(app_state: AppState) -> Router {
    let media = ServeDir::new(&app_state.config.media_root);

    Router::new()
        .merge(posts::router())
        .merge(profiles::router())
        .route("/group/{slug}/", get(groups::group_posts))
        .nest("/auth", auth::router())
        .nest("/about", about::router())
        .nest_service("/media", media)
        .fallback(not_found)
        .with_state(app_state)
}

pub fn app(app_state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(app_state.config.session_inactivity));

    router(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> AppError {
    AppError::NotFound("page")
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String>;
    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String> {
        Ok(
            self.get(field)
            .ok_or_else(|| anyhow!("expected {field} in {self}"))?
            .as_str()
            .ok_or_else(|| anyhow!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value> {
        self.get(field)
        .ok_or_else(|| anyhow!("expected {field} in {self}"))
    }
}

/// A static Markdown page rendered into the site layout.
pub struct Markdown<T>(pub &'static str, pub T);

impl<T> IntoResponse for Markdown<T>
where
    T: std::ops::Deref<Target = str>
{
    fn into_response(self) -> axum::response::Response {
        let Markdown(title, source) = self;
        Html(render::layout(title, &render::markdown(&source))).into_response()
    }
}
