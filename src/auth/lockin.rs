use axum::{debug_handler, extract::{Path, Query, State}, response::{IntoResponse, Redirect}};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeVerifier, TokenResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{session::{CSRF_STATE, PKCE_VERIFIER, RETURN_URL, USER_ID}, AppResult, AppState, GetField};

use super::{clients::ClientProvider, find_or_create_user, safe_return_url, AuthError, Clients, Identity};

#[derive(Deserialize)]
pub struct LockinQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

#[derive(Serialize)]
struct FirebaseRequest {
    post_body: String,
    request_uri: String,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[debug_handler(state = AppState)]
pub(crate) async fn lockin(
    Path(provider): Path<ClientProvider>,
    Query(LockinQuery { state, code }): Query<LockinQuery>,
    State(db_pool): State<SqlitePool>,
    State(clients): State<Clients>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let state = CsrfToken::new(state.ok_or(AuthError::MissingParam("state"))?);
    let code = AuthorizationCode::new(code.ok_or(AuthError::MissingParam("code"))?);

    let Some(stored_state) = session.remove::<String>(CSRF_STATE).await? else {
        return Err(AuthError::MissingSessionValue(CSRF_STATE).into());
    };

    if state.secret().as_str() != stored_state.as_str() {
        return Err(AuthError::CsrfMismatch.into());
    }

    let Some(pkce_verifier) = session.remove::<String>(PKCE_VERIFIER).await? else {
        return Err(AuthError::MissingSessionValue(PKCE_VERIFIER).into());
    };

    let client = clients.get_client(provider)?;
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let token_result = client
        .exchange_code(code)
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&http_client)
        .await?;

    let access_token = token_result.access_token().secret();
    let body: Value = http_client.post(&clients.firebase_idpurl)
        .json(&FirebaseRequest {
            post_body: format!("access_token={access_token}&providerId={}", provider.id()),
            request_uri: "http://localhost/".to_owned(),
            return_idp_credential: true,
            return_secure_token: true,
        })
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let identity = identity(&body)?;
    let user = find_or_create_user(&db_pool, identity).await?;

    let return_url = safe_return_url(session.remove::<String>(RETURN_URL).await?);
    session.cycle_id().await?;
    session.insert(USER_ID, user.id).await?;

    info!("welcome @{}#{}", user.username, user.id);

    Ok(Redirect::to(return_url.as_str()))
}

fn identity(body: &Value) -> anyhow::Result<Identity> {
    let optional = |field: &str| {
        body.get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };

    Ok(Identity {
        external_id: body.get_str_field("localId")?,
        email: optional("email"),
        first_name: optional("firstName"),
        last_name: optional("lastName"),
        display_name: optional("displayName").or_else(|| optional("fullName")),
    })
}
