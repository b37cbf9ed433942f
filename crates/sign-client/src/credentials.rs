//! Credential material.
//!
//! All credential types implement custom Debug to redact sensitive data.

use serde::{Deserialize, Serialize};

/// The credential a client authenticates with. Exactly one form is held.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Platform API key, sent as a bearer token.
    ApiKey(String),
    /// OAuth client settings. The bearer token is obtained by an external
    /// flow and attached with `set_auth_token`.
    OAuth(OAuthSettings),
    /// Pre-issued JWT, sent as a bearer token.
    Jwt(JwtCredential),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::ApiKey(_) => f.debug_tuple("ApiKey").field(&"[REDACTED]").finish(),
            Credential::OAuth(settings) => f.debug_tuple("OAuth").field(settings).finish(),
            Credential::Jwt(jwt) => f.debug_tuple("Jwt").field(jwt).finish(),
        }
    }
}

impl Credential {
    /// Token to send in the `Authorization: Bearer` header, if the credential
    /// carries one directly.
    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            Credential::ApiKey(key) => Some(key),
            Credential::Jwt(jwt) => Some(&jwt.token),
            Credential::OAuth(_) => None,
        }
    }

    /// Short name of the credential form, safe to log.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Credential::ApiKey(_) => "api_key",
            Credential::OAuth(_) => "oauth",
            Credential::Jwt(_) => "jwt",
        }
    }
}

/// OAuth 2.0 client settings.
///
/// `client_secret` is redacted in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSettings {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret. Optional for public clients.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Redirect URI for authorization-code flows.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Scopes to request.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl OAuthSettings {
    /// Create settings for the given client id.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            scopes: Vec::new(),
        }
    }

    /// Set the client secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Set the redirect URI.
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Set the scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

/// A pre-issued JWT.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtCredential {
    /// The encoded token.
    pub token: String,
    /// Optional refresh token issued alongside it.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for JwtCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtCredential")
            .field("token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl JwtCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}
