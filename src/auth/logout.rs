use axum::{debug_handler, extract::Query, response::{Html, IntoResponse, Redirect, Response}};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{include_res, render, AppResult};

use super::safe_return_url;

#[derive(Deserialize)]
pub(crate) struct LogoutQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn logout(
    Query(LogoutQuery { return_url }): Query<LogoutQuery>,
    session: Session
) -> AppResult<Response> {
    session.flush().await?;

    if return_url.is_some() {
        return Ok(Redirect::to(&safe_return_url(return_url)).into_response());
    }

    Ok(Html(render::layout("Logged out", include_res!(str, "/pages/auth/logged_out.html"))).into_response())
}
