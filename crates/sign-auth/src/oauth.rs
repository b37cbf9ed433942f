//! OAuth 2.0 token flows.
//!
//! The platform issues bearer tokens from `<base>/oauth/token`:
//! - **Client Credentials** - server-to-server access with a client secret
//! - **Refresh Token** - exchange a refresh token for a new access token
//!
//! Tokens obtained here are attached to a [`SignTuskClient`] with
//! [`OAuthClient::authorize`] or [`TokenResponse::apply_to`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use signtusk_client::{Credential, OAuthSettings, SdkConfig, SignTuskClient};
use tracing::{debug, instrument};

use crate::error::{Error, ErrorKind, Result};

/// Path of the token endpoint, relative to the API base URL.
pub const TOKEN_PATH: &str = "/oauth/token";

/// OAuth client for obtaining platform access tokens.
#[derive(Clone)]
pub struct OAuthClient {
    settings: OAuthSettings,
    token_url: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("settings", &self.settings)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Create a new OAuth client for the API at `base_url`.
    pub fn new(settings: OAuthSettings, base_url: &str) -> Self {
        Self {
            settings,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            http_client: reqwest::Client::new(),
        }
    }

    /// Create an OAuth client from an SDK configuration holding OAuth settings.
    pub fn from_config(config: &SdkConfig) -> Result<Self> {
        match config.credential() {
            Some(Credential::OAuth(settings)) => {
                Ok(Self::new(settings.clone(), config.base_url()))
            }
            other => Err(Error::new(ErrorKind::Config(format!(
                "OAuth settings required, configuration holds {}",
                other.map_or("no credential", Credential::kind_name)
            )))),
        }
    }

    /// Get the OAuth settings.
    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Get the token endpoint URL.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Obtain a token with the client credentials grant.
    #[instrument(skip(self), fields(client_id = %self.settings.client_id))]
    pub async fn client_credentials(&self) -> Result<TokenResponse> {
        let secret = self.settings.client_secret.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::Config(
                "client_secret is required for the client credentials grant".to_string(),
            ))
        })?;

        let scope = self.settings.scopes.join(" ");
        let mut params = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", secret),
        ];
        if !scope.is_empty() {
            params.push(("scope", &scope));
        }

        self.request_token(&params).await
    }

    /// Refresh an access token using a refresh token.
    ///
    /// The refresh_token parameter is not logged to prevent credential exposure.
    #[instrument(skip(self, refresh_token), fields(client_id = %self.settings.client_id))]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.settings.client_id.as_str()),
        ];

        if let Some(ref secret) = self.settings.client_secret {
            params.push(("client_secret", secret));
        }

        self.request_token(&params).await
    }

    /// Obtain a token with the client credentials grant and install it on
    /// `client`. Every request sent afterwards carries the new token.
    pub async fn authorize(&self, client: &SignTuskClient) -> Result<TokenResponse> {
        let token = self.client_credentials().await?;
        token.apply_to(client)?;
        Ok(token)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let body = serde_urlencoded::to_string(params)?;

        let response = self
            .http_client
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await?;

        self.handle_token_response(response).await
    }

    /// Handle a token response, checking for errors.
    async fn handle_token_response(&self, response: reqwest::Response) -> Result<TokenResponse> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<OAuthErrorResponse>(&text) {
                Ok(error) => Error::new(ErrorKind::OAuth {
                    error: error.error,
                    description: error.error_description,
                }),
                Err(_) => Error::new(ErrorKind::Http(format!(
                    "token endpoint returned status {}",
                    status.as_u16()
                ))),
            });
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        debug!(expires_in = token.expires_in, "Access token issued");
        Ok(token)
    }
}

/// Token response from the token endpoint.
///
/// `access_token` and `refresh_token` are redacted in Debug output.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token (if issued).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Scopes granted.
    #[serde(default)]
    pub scope: Option<String>,
    /// When the response was received.
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("received_at", &self.received_at)
            .finish()
    }
}

impl TokenResponse {
    /// Instant the access token expires, if the server reported a lifetime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        self.received_at.checked_add_signed(Duration::try_seconds(secs)?)
    }

    /// Returns true if the token expires within `leeway` of now.
    pub fn expires_within(&self, leeway: Duration) -> bool {
        match self.expires_at() {
            Some(at) => at - leeway <= Utc::now(),
            None => false,
        }
    }

    /// Returns true if the token has expired. Tokens without a reported
    /// lifetime never expire client-side.
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// Install the access token on a client.
    pub fn apply_to(&self, client: &SignTuskClient) -> Result<()> {
        client.set_auth_token(self.access_token.as_str())?;
        Ok(())
    }
}

/// OAuth error response.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}
