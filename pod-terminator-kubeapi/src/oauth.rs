use std::collections::HashMap;
use std::time::Duration;

use reqwest::header;
use reqwest::redirect;
use reqwest::StatusCode;
use reqwest::Url;
use secrecy::ExposeSecret as _;
use serde::Deserialize;

use super::*;

const OAUTH_METADATA_PATH: &str = "/.well-known/oauth-authorization-server";
const CHALLENGING_CLIENT_ID: &str = "openshift-challenging-client";
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("invalid API endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("OAuth request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("login rejected: invalid username or password")]
    Unauthorized,

    #[error("unexpected response from the OAuth server: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("invalid OAuth redirect: {reason}")]
    InvalidRedirect { reason: String },

    #[error("OAuth redirect carried no access token")]
    MissingToken,
}

/// A bearer token issued by the OpenShift OAuth server.
#[derive(Debug)]
pub struct AccessToken {
    pub token: SecretString,
    pub expires_in: Duration,
}

/// Subset of the OAuth 2.0 authorization server metadata we care about.
#[derive(Debug, Deserialize)]
struct ServerMetadata {
    authorization_endpoint: String,
}

/// Logs in to an OpenShift cluster with a username and password.
///
/// Uses the `openshift-challenging-client` implicit flow: the authorization
/// endpoint answers a basic-auth challenge with a redirect whose fragment
/// carries the access token.
#[derive(Debug)]
pub struct OAuthClient {
    api: Url,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(api: &str, accept_invalid_certs: bool) -> Result<Self, OAuthError> {
        let api = Url::parse(api).map_err(|err| OAuthError::InvalidEndpoint {
            endpoint: api.to_string(),
            reason: err.to_string(),
        })?;
        if accept_invalid_certs {
            tracing::warn!(%api, "TLS certificate verification is disabled for OAuth login");
        }
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self { api, http })
    }

    /// Performs the full login handshake and returns a fresh token.
    pub async fn request_token(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AccessToken, OAuthError> {
        let authorize = self.authorization_endpoint().await?;
        let response = self
            .http
            .get(authorize)
            .query(&[
                ("client_id", CHALLENGING_CLIENT_ID),
                ("response_type", "token"),
            ])
            .basic_auth(username, Some(password.expose_secret()))
            .header("X-CSRF-Token", "1")
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(OAuthError::Unauthorized),
            status if status.is_redirection() => response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
                .ok_or(OAuthError::MissingToken)
                .and_then(parse_token_redirect),
            status => Err(OAuthError::UnexpectedStatus(status)),
        }
    }

    async fn authorization_endpoint(&self) -> Result<String, OAuthError> {
        let metadata = self
            .http
            .get(self.metadata_url()?)
            .send()
            .await?
            .error_for_status()?
            .json::<ServerMetadata>()
            .await?;
        tracing::debug!(
            endpoint = %metadata.authorization_endpoint,
            "Discovered OAuth authorization endpoint"
        );
        Ok(metadata.authorization_endpoint)
    }

    fn metadata_url(&self) -> Result<Url, OAuthError> {
        self.api
            .join(OAUTH_METADATA_PATH)
            .map_err(|err| OAuthError::InvalidEndpoint {
                endpoint: self.api.to_string(),
                reason: err.to_string(),
            })
    }
}

/// Extracts `access_token` and `expires_in` from the fragment of the
/// redirect location. A missing `expires_in` falls back to one day, the
/// OpenShift default.
fn parse_token_redirect(location: &str) -> Result<AccessToken, OAuthError> {
    let mut url = Url::parse(location).map_err(|err| OAuthError::InvalidRedirect {
        reason: err.to_string(),
    })?;
    let fragment = url.fragment().unwrap_or_default().to_string();
    url.set_query(Some(&fragment));
    let params = url.query_pairs().into_owned().collect::<HashMap<_, _>>();

    if let Some(error) = params.get("error") {
        return Err(OAuthError::InvalidRedirect {
            reason: error.clone(),
        });
    }

    let token = params
        .get("access_token")
        .filter(|token| !token.is_empty())
        .cloned()
        .ok_or(OAuthError::MissingToken)?;
    let expires_in = params
        .get("expires_in")
        .and_then(|secs| secs.parse().ok())
        .map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs);

    Ok(AccessToken {
        token: SecretString::from(token),
        expires_in,
    })
}
