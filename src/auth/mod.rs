use anyhow::anyhow;
use axum::{
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::request::Parts,
    routing::get,
    Router,
};
use rand::{seq::IndexedRandom, Rng};
use sqlx::SqlitePool;
use thiserror::Error;
use tower_sessions::Session;
use tracing::info;

use crate::{
    db::User,
    session::USER_ID,
    users::{self, NewUser},
    AppError, AppState,
};

mod clients;
mod lockin;
mod login;
mod logout;

pub use clients::{ClientProvider, Clients};
pub(crate) use lockin::lockin;
pub(crate) use login::login;
pub(crate) use logout::logout;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("OAuth callback without {0}")]
    MissingParam(&'static str),
    #[error("no {0} in the session")]
    MissingSessionValue(&'static str),
    #[error("csrf tokens don't match")]
    CsrfMismatch,
    #[error("OAuth provider {0} keys not supplied")]
    ProviderNotConfigured(ClientProvider),
    #[error("could not find a free username for {0}")]
    UsernameExhausted(String),
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login/", get(login::login_page))
        .route("/login/{provider}", get(login))
        .route("/lockin/{provider}", get(lockin))
        .route("/logout/", get(logout))
}

/// The visitor, if logged in.
pub struct Viewer(pub Option<User>);

/// A logged-in visitor. Anonymous requests are sent to the login page with a
/// link back to where they came from.
pub struct LoggedIn(pub User);

impl<S> FromRequestParts<S> for Viewer
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, msg)| anyhow!(msg))?;

        let Some(user_id) = session.get::<i64>(USER_ID).await? else {
            return Ok(Viewer(None));
        };

        let db_pool = SqlitePool::from_ref(state);
        let user = users::by_id(&db_pool, user_id).await?;
        if user.is_none() {
            session.remove::<i64>(USER_ID).await?;
        }

        Ok(Viewer(user))
    }
}

impl<S> FromRequestParts<S> for LoggedIn
where
    SqlitePool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Viewer(user) = Viewer::from_request_parts(parts, state).await?;

        user.map(LoggedIn).ok_or_else(|| {
            let uri = parts
                .extensions
                .get::<OriginalUri>()
                .map(|OriginalUri(uri)| uri)
                .unwrap_or(&parts.uri);
            AppError::Unauthorized {
                next: uri
                    .path_and_query()
                    .map_or("/", |path| path.as_str())
                    .to_owned(),
            }
        })
    }
}

/// Only same-site paths are accepted as places to return to after login.
pub(crate) fn safe_return_url(return_url: Option<String>) -> String {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/".to_owned(),
    }
}

/// What the identity provider told us about the person logging in.
#[derive(Debug, Clone, Default)]
pub(crate) struct Identity {
    pub(crate) external_id: String,
    pub(crate) email: Option<String>,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) display_name: Option<String>,
}

pub(crate) async fn find_or_create_user(db_pool: &SqlitePool, identity: Identity) -> Result<User, AppError> {
    if let Some(user) = users::by_external_id(db_pool, &identity.external_id).await? {
        return Ok(user);
    }

    let username = free_username(db_pool, identity.email.as_deref()).await?;
    let (first_name, last_name) = match (identity.first_name, identity.last_name, identity.display_name) {
        (Some(first), last, _) => (first, last.unwrap_or_default()),
        (None, _, Some(display)) if !display.trim().is_empty() => {
            let display = display.trim();
            match display.split_once(char::is_whitespace) {
                Some((first, last)) => (first.to_owned(), last.trim().to_owned()),
                None => (display.to_owned(), String::new()),
            }
        }
        _ => random_alias(),
    };

    info!("adding @{username}#{}, {first_name} {last_name}", identity.external_id);
    let user = users::create(
        db_pool,
        NewUser {
            username,
            email: identity.email.unwrap_or_default(),
            first_name,
            last_name,
            external_id: Some(identity.external_id),
        },
    )
    .await?;

    Ok(user)
}

fn username_base(email: Option<&str>) -> String {
    let local = email
        .and_then(|email| email.split('@').next())
        .unwrap_or_default();
    let base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(30)
        .collect();

    if base.is_empty() { "user".to_owned() } else { base }
}

async fn free_username(db_pool: &SqlitePool, email: Option<&str>) -> Result<String, AppError> {
    let base = username_base(email);
    let mut candidate = base.clone();

    for _ in 0..20 {
        if users::by_username(db_pool, &candidate).await?.is_none() {
            return Ok(candidate);
        }
        candidate = format!("{base}{}", rand::rng().random_range(1000..10000));
    }

    Err(AuthError::UsernameExhausted(base).into())
}

fn random_alias() -> (String, String) {
    let adjectives = [
        "Quick", "Lazy", "Mysterious", "Jolly", "Brave", "Silent", "Witty", "Fierce",
        "Clever", "Gentle", "Wild", "Calm", "Bold", "Shy", "Proud", "Happy", "Sad",
        "Eager", "Fancy", "Rusty", "Golden", "Silver", "Bright", "Dark", "Lucky",
    ];
    let nouns = [
        "Fox", "Bear", "Eagle", "Wolf", "Dragon", "Tiger", "Lion", "Owl", "Rabbit",
        "Falcon", "Hawk", "Shark", "Panda", "Kitten", "Puppy", "Phoenix", "Griffin",
        "Unicorn", "Turtle", "Dolphin", "Whale", "Elephant", "Giraffe", "Zebra",
    ];

    let mut rng = rand::rng();
    (
        adjectives.choose(&mut rng).copied().unwrap_or("Nameless").to_owned(),
        nouns.choose(&mut rng).copied().unwrap_or("Writer").to_owned(),
    )
}
