//! SDK configuration and its validation.
//!
//! Configuration arrives either typed ([`SdkConfig::builder`]) or untyped
//! ([`RawConfig`], deserializable from JSON or read from the environment).
//! Both paths go through the same validation and produce one canonical
//! [`SdkConfig`]. Validation never touches the network.

use std::time::Duration;

use serde::Deserialize;

use crate::config::ClientConfig;
use crate::credentials::{Credential, JwtCredential, OAuthSettings};
use crate::error::{Error, Result};
use crate::retry::RetryConfig;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default base backoff delay in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Platform deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    /// Well-known API origin of the environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Development => "https://api-dev.docusign-alternative.com",
            Environment::Staging => "https://api-staging.docusign-alternative.com",
            Environment::Production => "https://api.docusign-alternative.com",
        }
    }

    /// Parse an environment name case-insensitively.
    ///
    /// Unknown names resolve to [`Environment::Production`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SdkConfig {
    base_url: String,
    credential: Option<Credential>,
    environment: Environment,
    timeout: Duration,
    retry_count: u32,
    retry_delay: Duration,
}

impl SdkConfig {
    /// Start building a configuration.
    pub fn builder() -> SdkConfigBuilder {
        SdkConfigBuilder::default()
    }

    /// Shorthand for an API-key configuration with all defaults.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Validate an untyped configuration.
    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        let api_key = raw.api_key.filter(|k| !k.is_empty());

        let mut forms = Vec::new();
        if let Some(key) = api_key {
            forms.push(Credential::ApiKey(key));
        }
        if let Some(oauth) = raw.oauth {
            forms.push(Credential::OAuth(oauth));
        }
        if let Some(jwt) = raw.jwt {
            forms.push(Credential::Jwt(jwt));
        }

        if forms.len() > 1 {
            let names: Vec<&str> = forms.iter().map(Credential::kind_name).collect();
            return Err(Error::config(format!(
                "exactly one credential form may be configured, found: {}",
                names.join(", ")
            )));
        }

        validate(
            forms.pop(),
            raw.base_url,
            raw.environment.as_deref().map(Environment::from_name),
            raw.timeout_ms,
            raw.retry_count,
            raw.retry_delay_ms,
        )
    }

    /// Load configuration from `SIGNTUSK_*` environment variables.
    ///
    /// - `SIGNTUSK_API_KEY` or `SIGNTUSK_JWT_TOKEN` (one is required)
    /// - `SIGNTUSK_BASE_URL`, `SIGNTUSK_ENVIRONMENT`
    /// - `SIGNTUSK_TIMEOUT_MS`, `SIGNTUSK_RETRIES`, `SIGNTUSK_RETRY_DELAY_MS`
    pub fn from_env() -> Result<Self> {
        Self::from_raw(RawConfig::from_lookup(|name| std::env::var(name).ok())?)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current credential.
    ///
    /// Always present after validation; `None` only once a client has
    /// cleared its authentication.
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    /// Copy of this configuration with the credential replaced.
    pub(crate) fn with_credential(&self, credential: Option<Credential>) -> Self {
        Self {
            credential,
            ..self.clone()
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries after the first attempt.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Base backoff delay.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Transport settings derived from this configuration.
    ///
    /// The backoff cap is raised to `retry_delay × 2^retry_count` when that
    /// exceeds the default, so a large base delay still grows per retry.
    pub fn client_config(&self) -> ClientConfig {
        let retry = RetryConfig::default();
        let growth = 2u32.saturating_pow(self.retry_count);
        let max_delay = std::cmp::max(retry.max_delay, self.retry_delay.saturating_mul(growth));

        ClientConfig::builder()
            .with_timeout(self.timeout)
            .with_retry(
                retry
                    .with_max_retries(self.retry_count)
                    .with_initial_delay(self.retry_delay)
                    .with_max_delay(max_delay),
            )
            .build()
    }
}

/// Builder for [`SdkConfig`].
#[derive(Debug, Default)]
pub struct SdkConfigBuilder {
    credential: Option<Credential>,
    base_url: Option<String>,
    environment: Option<Environment>,
    timeout_ms: Option<u64>,
    retry_count: Option<u32>,
    retry_delay_ms: Option<u64>,
}

impl SdkConfigBuilder {
    /// Authenticate with an API key.
    pub fn api_key(self, api_key: impl Into<String>) -> Self {
        self.credential(Credential::ApiKey(api_key.into()))
    }

    /// Authenticate through an OAuth flow.
    pub fn oauth(self, settings: OAuthSettings) -> Self {
        self.credential(Credential::OAuth(settings))
    }

    /// Authenticate with a pre-issued JWT.
    pub fn jwt(self, jwt: JwtCredential) -> Self {
        self.credential(Credential::Jwt(jwt))
    }

    /// Set the credential. Replaces any previously set form.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Override the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Retries after the first attempt.
    pub fn retry_count(mut self, retries: u32) -> Self {
        self.retry_count = Some(retries);
        self
    }

    /// Base backoff delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = Some(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<SdkConfig> {
        validate(
            self.credential,
            self.base_url,
            self.environment,
            self.timeout_ms,
            self.retry_count,
            self.retry_delay_ms,
        )
    }
}

/// Untyped configuration as supplied by callers, files or the environment.
///
/// Field names accept both snake_case and camelCase.
#[derive(Default, Clone, Deserialize)]
pub struct RawConfig {
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,
    #[serde(default)]
    pub oauth: Option<OAuthSettings>,
    #[serde(default)]
    pub jwt: Option<JwtCredential>,
    #[serde(default, alias = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default, alias = "timeoutMs", alias = "timeout")]
    pub timeout_ms: Option<u64>,
    #[serde(default, alias = "retryCount", alias = "retries")]
    pub retry_count: Option<u32>,
    #[serde(default, alias = "retryDelayMs", alias = "retry_delay")]
    pub retry_delay_ms: Option<u64>,
}

impl std::fmt::Debug for RawConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("oauth", &self.oauth)
            .field("jwt", &self.jwt)
            .field("base_url", &self.base_url)
            .field("environment", &self.environment)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry_count", &self.retry_count)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

impl RawConfig {
    /// Build a raw configuration from `SIGNTUSK_*` variables using `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            api_key: lookup("SIGNTUSK_API_KEY"),
            oauth: None,
            jwt: lookup("SIGNTUSK_JWT_TOKEN")
                .filter(|t| !t.is_empty())
                .map(JwtCredential::new),
            base_url: lookup("SIGNTUSK_BASE_URL"),
            environment: lookup("SIGNTUSK_ENVIRONMENT"),
            timeout_ms: parse_number(&lookup, "SIGNTUSK_TIMEOUT_MS")?,
            retry_count: parse_number(&lookup, "SIGNTUSK_RETRIES")?,
            retry_delay_ms: parse_number(&lookup, "SIGNTUSK_RETRY_DELAY_MS")?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::config(format!("{} must be a non-negative integer, got {:?}", name, value))),
        None => Ok(None),
    }
}

fn validate(
    credential: Option<Credential>,
    base_url: Option<String>,
    environment: Option<Environment>,
    timeout_ms: Option<u64>,
    retry_count: Option<u32>,
    retry_delay_ms: Option<u64>,
) -> Result<SdkConfig> {
    let credential = credential.ok_or_else(|| {
        Error::config("API key, OAuth configuration, or JWT token is required")
    })?;

    match &credential {
        Credential::ApiKey(key) if key.trim().is_empty() => {
            return Err(Error::config("API key must not be empty"));
        }
        Credential::Jwt(jwt) if jwt.token.trim().is_empty() => {
            return Err(Error::config("JWT token must not be empty"));
        }
        Credential::OAuth(settings) if settings.client_id.trim().is_empty() => {
            return Err(Error::config("OAuth client_id must not be empty"));
        }
        _ => {}
    }

    let environment = environment.unwrap_or_default();
    let base_url = match base_url.filter(|u| !u.trim().is_empty()) {
        Some(url) => normalize_base_url(&url)?,
        None => environment.base_url().to_string(),
    };

    let timeout_ms = timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(Error::config("timeout must be greater than zero"));
    }

    Ok(SdkConfig {
        base_url,
        credential: Some(credential),
        environment,
        timeout: Duration::from_millis(timeout_ms),
        retry_count: retry_count.unwrap_or(DEFAULT_RETRY_COUNT),
        retry_delay: Duration::from_millis(retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS)),
    })
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw.trim())?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::config(format!(
            "base URL must be an absolute http(s) URL, got {:?}",
            raw
        )));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
