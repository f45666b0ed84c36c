use axum::{debug_handler, extract::{Path, Query, State}, response::{Html, IntoResponse, Redirect, Response}};
use oauth2::{url::form_urlencoded, CsrfToken, PkceCodeChallenge, Scope};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{include_res, render::{self, escape}, res::fill, session::{CSRF_STATE, PKCE_VERIFIER, RETURN_URL}, AppError, AppResult};

use super::{clients::ClientProvider, safe_return_url, Clients};

#[derive(Deserialize)]
pub(crate) struct LoginPageQuery {
    pub(crate) next: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    pub(crate) return_url: Option<String>,
}

#[debug_handler]
pub(crate) async fn login_page(
    Query(LoginPageQuery { next }): Query<LoginPageQuery>,
) -> impl IntoResponse {
    let next = safe_return_url(next);
    let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();

    Html(render::layout(
        "Log in",
        &fill(include_res!(str, "/pages/auth/login.html"), &[("next", &escape(&next))]),
    ))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    Path(provider): Path<ClientProvider>,
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<Response> {
    let client = clients
        .get_client(provider)
        .map_err(|_| AppError::NotFound("login provider"))?;

    let (pkce_code_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (authorize_url, csrf_state) = client.authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new("openid".to_string()))
        .set_pkce_challenge(pkce_code_challenge)
        .url();

    session.insert(CSRF_STATE, csrf_state.secret()).await?;
    session.insert(PKCE_VERIFIER, pkce_verifier.secret()).await?;
    session.insert(RETURN_URL, safe_return_url(return_url)).await?;

    Ok(Redirect::to(authorize_url.as_str()).into_response())
}
