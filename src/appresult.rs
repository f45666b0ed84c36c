use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use oauth2::url::form_urlencoded;
use tracing::{debug, error};

use crate::render;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// A referenced group, user or post does not exist.
    NotFound(&'static str),
    /// Protected operation by an anonymous caller; `next` is where to return
    /// after logging in.
    Unauthorized { next: String },
    /// Operation on someone else's resource; the caller is sent to the
    /// read-only view instead.
    Forbidden { redirect_to: String },
    Internal(anyhow::Error),
}

pub const LOGIN_PATH: &str = "/auth/login/";

pub fn login_url(next: &str) -> String {
    let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={next}")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(what) => {
                debug!("{what} not found");
                (StatusCode::NOT_FOUND, Html(render::not_found(what))).into_response()
            }
            AppError::Unauthorized { next } => Redirect::to(&login_url(&next)).into_response(),
            AppError::Forbidden { redirect_to } => Redirect::to(&redirect_to).into_response(),
            AppError::Internal(err) => {
                error!("{err}\n\n{}", err.backtrace());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(render::internal_error()),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
