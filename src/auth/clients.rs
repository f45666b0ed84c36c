use std::{fmt, path::Path};

use oauth2::{basic::BasicClient, AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::GetField;

use super::AuthError;

type HappyClient = Client<oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>, oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardTokenIntrospectionResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>, oauth2::StandardRevocableToken, oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>, oauth2::EndpointSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointNotSet, oauth2::EndpointSet>;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientProvider {
    Google,
    Github,
}

impl ClientProvider {
    pub fn id(&self) -> &str {
        use ClientProvider::*;
        match self {
            Google => "google.com",
            Github => "github.com",
        }
    }

    fn slug(&self) -> &str {
        use ClientProvider::*;
        match self {
            Google => "google",
            Github => "github",
        }
    }

    fn endpoints(&self) -> (&'static str, &'static str) {
        use ClientProvider::*;
        match self {
            Google => (
                "https://accounts.google.com/o/oauth2/auth",
                "https://oauth2.googleapis.com/token",
            ),
            Github => (
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
            ),
        }
    }
}

impl fmt::Display for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// OAuth clients of the configured identity providers plus the Firebase
/// endpoint that turns a provider token into a stable account id.
#[derive(Clone, Default)]
pub struct Clients {
    pub(crate) firebase_idpurl: String,
    google_client: Option<HappyClient>,
    github_client: Option<HappyClient>,
}

impl Clients {
    /// Reads the provider keys file. A missing file disables login instead of
    /// failing startup.
    pub fn load(path: &Path, public_url: &str) -> anyhow::Result<Clients> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("no OAuth keys at {}: {e}; login is disabled", path.display());
                return Ok(Clients::default());
            }
        };

        Clients::from_json(serde_json::from_str(&raw)?, public_url)
    }

    pub fn from_json(json: Value, public_url: &str) -> anyhow::Result<Clients> {
        let firebase_idpurl = format!(
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithIdp?key={}",
            json.get_obj_field("firebase")?.get_str_field("apikey")?
        );

        let client = |provider: ClientProvider| -> anyhow::Result<Option<HappyClient>> {
            let Some(json) = json.get(provider.slug()) else {
                return Ok(None);
            };
            let client_id = ClientId::new(json.get_str_field("client_id")?);
            let client_secret = ClientSecret::new(json.get_str_field("client_secret")?);

            let (auth_url, token_url) = provider.endpoints();
            let redirect_url = format!(
                "{}/auth/lockin/{}",
                public_url.trim_end_matches('/'),
                provider.slug()
            );

            info!("OAuth provider {provider} enabled");
            Ok(Some(
                BasicClient::new(client_id)
                    .set_client_secret(client_secret)
                    .set_auth_uri(AuthUrl::new(auth_url.to_owned())?)
                    .set_token_uri(TokenUrl::new(token_url.to_owned())?)
                    .set_redirect_uri(RedirectUrl::new(redirect_url)?),
            ))
        };

        Ok(Clients {
            google_client: client(ClientProvider::Google)?,
            github_client: client(ClientProvider::Github)?,
            firebase_idpurl,
        })
    }

    pub fn get_client(&self, provider: ClientProvider) -> Result<HappyClient, AuthError> {
        use ClientProvider::*;
        match provider {
            Google => self.google_client.clone(),
            Github => self.github_client.clone(),
        }
        .ok_or(AuthError::ProviderNotConfigured(provider))
    }
}
