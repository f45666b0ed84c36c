use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{Multipart, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tracing::info;

use crate::{
    auth::LoggedIn,
    config::Config,
    groups,
    posts::{
        form::{self, render_post_form, FormErrors, FormPage, PostForm},
        store::{self, NewPost},
    },
    AppResult,
};

const HEADING: &str = "New post";
const ACTION: &str = "/create/";
const BUTTON: &str = "Save";

#[debug_handler(state = crate::AppState)]
pub(crate) async fn create_form(
    State(db_pool): State<SqlitePool>,
    LoggedIn(_): LoggedIn,
) -> AppResult<Html<String>> {
    let groups = groups::all(&db_pool).await?;

    Ok(Html(render_post_form(FormPage {
        heading: HEADING,
        action: ACTION,
        button: BUTTON,
        form: &PostForm::default(),
        errors: &FormErrors::default(),
        groups: &groups,
        current_image: None,
    })))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn create(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    LoggedIn(user): LoggedIn,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = PostForm::from_multipart(multipart).await?;
    let errors = form.validate(&db_pool).await?;

    if !errors.is_empty() {
        let groups = groups::all(&db_pool).await?;
        return Ok(Html(render_post_form(FormPage {
            heading: HEADING,
            action: ACTION,
            button: BUTTON,
            form: &form,
            errors: &errors,
            groups: &groups,
            current_image: None,
        }))
        .into_response());
    }

    let image = match &form.image {
        Some(upload) => Some(upload.save(&config.media_root).await?),
        None => None,
    };

    let created = store::create(
        &db_pool,
        NewPost {
            author_id: user.id,
            text: form.text().to_owned(),
            group_id: form.group_id(),
            image: image.clone(),
        },
    )
    .await;
    let post = match created {
        Ok(post) => post,
        Err(e) => {
            if let Some(image) = &image {
                form::discard(&config.media_root, image).await;
            }
            return Err(e.into());
        }
    };
    info!(post_id = post.id, author = %user.username, "post created");

    Ok(Redirect::to(&format!("/profile/{}/", user.username)).into_response())
}
