#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    body::Body,
    extract,
    http::{header, Method, Request, StatusCode},
    middleware::{self, Next},
    Router,
};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use yatube::{
    auth::Clients,
    config::Config,
    db::{self, Group, Post, User},
    groups,
    posts::{store, NewPost},
    session::USER_ID,
    users::{self, NewUser},
    AppState,
};

pub const BOUNDARY: &str = "yatube-test-boundary";

pub const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\
\xFF\xFF\xFF\x21\xF9\x04\x00\x00\x00\x00\x00\x2C\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0C\x0A\x00\x3B";

pub fn media_root() -> PathBuf {
    std::env::temp_dir().join(format!("yatube-test-media-{}", uuid::Uuid::now_v7().simple()))
}

pub async fn state() -> AppState {
    let db_pool = db::connect_in_memory().await.unwrap();
    let config = Config {
        media_root: media_root(),
        ..Config::default()
    };
    AppState::new(db_pool, Clients::default(), config)
}

/// The site router with a fresh session per request. With `user_id` set the
/// session is logged in as that user.
pub fn app(state: AppState, user_id: Option<i64>) -> Router {
    let login = middleware::from_fn(move |session: Session, request: extract::Request, next: Next| async move {
        if let Some(user_id) = user_id {
            session.insert(USER_ID, user_id).await.unwrap();
        }
        next.run(request).await
    });

    yatube::router(state)
        .layer(login)
        .layer(SessionManagerLayer::new(MemoryStore::default()))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap().to_owned());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        location,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn post_form(app: &Router, uri: &str, form: &str) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_owned()))
        .unwrap();
    send(app, request).await
}

pub struct FilePart<'a> {
    pub name: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.name, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: &Router, uri: &str, body: Vec<u8>) -> TestResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn user(db_pool: &SqlitePool, username: &str) -> User {
    users::create(db_pool, NewUser::named(username)).await.unwrap()
}

pub async fn group(db_pool: &SqlitePool, title: &str, slug: &str) -> Group {
    groups::create(db_pool, title, slug, "Test description")
        .await
        .unwrap()
}

pub async fn post(db_pool: &SqlitePool, author: &User, text: &str) -> Post {
    store::create(db_pool, NewPost::text(author.id, text)).await.unwrap()
}

pub async fn group_post(db_pool: &SqlitePool, author: &User, group: &Group, text: &str) -> Post {
    store::create(db_pool, NewPost::text(author.id, text).in_group(group.id))
        .await
        .unwrap()
}
