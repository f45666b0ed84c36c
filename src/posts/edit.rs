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
    db::{Post, User},
    groups,
    posts::{
        form::{self, render_post_form, FormErrors, FormPage, PostForm},
        store, PostId,
    },
    AppError, AppResult,
};

const HEADING: &str = "Edit post";
const BUTTON: &str = "Save";

/// Loads the post for editing. Anyone but the author is sent to the
/// read-only page.
async fn editable(db_pool: &SqlitePool, post_id: i64, user: &User) -> AppResult<Post> {
    let post = store::get(db_pool, post_id).await?;
    if post.author_id != user.id {
        return Err(AppError::Forbidden {
            redirect_to: format!("/posts/{post_id}/"),
        });
    }
    Ok(post)
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit_form(
    LoggedIn(user): LoggedIn,
    PostId(post_id): PostId,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Html<String>> {
    let post = editable(&db_pool, post_id, &user).await?;
    let groups = groups::all(&db_pool).await?;

    let form = PostForm {
        text: post.text.clone(),
        group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
        image: None,
    };

    Ok(Html(render_post_form(FormPage {
        heading: HEADING,
        action: &format!("/posts/{post_id}/edit/"),
        button: BUTTON,
        form: &form,
        errors: &FormErrors::default(),
        groups: &groups,
        current_image: post.image.as_deref(),
    })))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn edit(
    LoggedIn(user): LoggedIn,
    PostId(post_id): PostId,
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    multipart: Multipart,
) -> AppResult<Response> {
    let post = editable(&db_pool, post_id, &user).await?;
    let form = PostForm::from_multipart(multipart).await?;
    let errors = form.validate(&db_pool).await?;

    if !errors.is_empty() {
        let groups = groups::all(&db_pool).await?;
        return Ok(Html(render_post_form(FormPage {
            heading: HEADING,
            action: &format!("/posts/{post_id}/edit/"),
            button: BUTTON,
            form: &form,
            errors: &errors,
            groups: &groups,
            current_image: post.image.as_deref(),
        }))
        .into_response());
    }

    let uploaded = match &form.image {
        Some(upload) => Some(upload.save(&config.media_root).await?),
        None => None,
    };
    let image = uploaded.as_deref().or(post.image.as_deref());

    if let Err(e) = store::update(&db_pool, post_id, form.text(), form.group_id(), image).await {
        if let Some(uploaded) = &uploaded {
            form::discard(&config.media_root, uploaded).await;
        }
        return Err(e.into());
    }
    info!(post_id, author = %user.username, "post edited");

    Ok(Redirect::to(&format!("/posts/{post_id}/")).into_response())
}
