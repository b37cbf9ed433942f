//! Error types for signtusk-client.
//!
//! Every failure the pipeline can produce is an [`Error`] whose [`ErrorKind`]
//! names the category. HTTP-derived kinds carry an [`ApiError`] with the
//! status, message and correlation id taken from the platform response.

use std::fmt;
use std::time::Duration;

use crate::response::{sanitize_error_message, ErrorPayload};

/// Result type alias for signtusk-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for signtusk-client operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config(message.into()))
    }

    /// Translate a non-success response into a typed error.
    ///
    /// 401 → `Authentication`, 403 → `Authorization`, 400/422 → `Validation`,
    /// 404 → `NotFound`, 409 → `Conflict`, 429 → `RateLimited`,
    /// 5xx → `Server`, anything else → `Api`.
    pub fn from_response(status: u16, payload: &ErrorPayload, request_id: Option<String>) -> Self {
        let api = ApiError {
            status,
            message: payload
                .message
                .clone()
                .unwrap_or_else(|| default_message(status)),
            code: payload.code.clone(),
            details: payload.details.clone(),
            request_id,
            retry_after: None,
        };

        let kind = match status {
            401 => ErrorKind::Authentication(api),
            403 => ErrorKind::Authorization(api),
            400 | 422 => ErrorKind::Validation(api),
            404 => ErrorKind::NotFound(api),
            409 => ErrorKind::Conflict(api),
            429 => ErrorKind::RateLimited(api),
            500..=599 => ErrorKind::Server(api),
            _ => ErrorKind::Api(api),
        };

        Self::new(kind)
    }

    /// Attach a `Retry-After` hint to an HTTP-derived error.
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        if let Some(api) = self.kind.api_error_mut() {
            api.retry_after = retry_after;
        }
        self
    }

    /// Returns the platform error details if this error came from an HTTP response.
    pub fn api_error(&self) -> Option<&ApiError> {
        self.kind.api_error()
    }

    /// Returns the HTTP status code, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|api| api.status)
    }

    /// Returns the `x-request-id` of the failed response, if the platform sent one.
    pub fn request_id(&self) -> Option<&str> {
        self.api_error().and_then(|api| api.request_id.as_deref())
    }

    /// Human-readable message without the category prefix.
    pub fn message(&self) -> String {
        match &self.kind {
            ErrorKind::Config(msg)
            | ErrorKind::Network(msg)
            | ErrorKind::Timeout(msg)
            | ErrorKind::InvalidRequest(msg)
            | ErrorKind::Serialization(msg)
            | ErrorKind::Json(msg) => msg.clone(),
            kind => kind
                .api_error()
                .map(|api| api.message.clone())
                .unwrap_or_default(),
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Informational only: the transport has already spent its retry budget
    /// by the time an error reaches the caller.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Returns true if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.kind, ErrorKind::RateLimited(_))
    }

    /// Returns true if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Authentication(_))
    }

    /// Returns true if the per-attempt deadline was exceeded.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ErrorKind::Timeout(_))
    }

    /// Returns true if the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self.kind, ErrorKind::Network(_))
    }

    /// Returns the retry-after duration if the platform sent one.
    pub fn retry_after(&self) -> Option<Duration> {
        self.api_error().and_then(|api| api.retry_after)
    }
}

/// Details of an error response returned by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the response body, or a generic description.
    pub message: String,
    /// Machine-readable error code, if the body carried one.
    pub code: Option<String>,
    /// Additional structured details, if the body carried any.
    pub details: Option<serde_json::Value>,
    /// Value of the `x-request-id` response header.
    pub request_id: Option<String>,
    /// Value of the `Retry-After` response header.
    pub retry_after: Option<Duration>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {}", self.message, self.status)?;
        if let Some(ref id) = self.request_id {
            write!(f, ", request id {}", id)?;
        }
        write!(f, ")")
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Invalid or missing configuration, detected before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP 401.
    #[error("Authentication error: {0}")]
    Authentication(ApiError),

    /// HTTP 403.
    #[error("Authorization error: {0}")]
    Authorization(ApiError),

    /// HTTP 400 or 422.
    #[error("Validation error: {0}")]
    Validation(ApiError),

    /// HTTP 404.
    #[error("Not found: {0}")]
    NotFound(ApiError),

    /// HTTP 409.
    #[error("Conflict: {0}")]
    Conflict(ApiError),

    /// HTTP 429.
    #[error("Rate limited: {0}")]
    RateLimited(ApiError),

    /// HTTP 5xx.
    #[error("Server error: {0}")]
    Server(ApiError),

    /// Any other non-success status.
    #[error("API error: {0}")]
    Api(ApiError),

    /// Connection failures and uncategorized transport failures.
    #[error("Network error: {0}")]
    Network(String),

    /// Per-attempt deadline exceeded after retries were exhausted.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The request could not be framed (bad header name, bad URL path).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request body serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(String),
}

impl ErrorKind {
    /// Returns true if this error kind is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::RateLimited(_) | ErrorKind::Server(_))
    }

    /// Returns the platform error details for HTTP-derived kinds.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ErrorKind::Authentication(api)
            | ErrorKind::Authorization(api)
            | ErrorKind::Validation(api)
            | ErrorKind::NotFound(api)
            | ErrorKind::Conflict(api)
            | ErrorKind::RateLimited(api)
            | ErrorKind::Server(api)
            | ErrorKind::Api(api) => Some(api),
            _ => None,
        }
    }

    fn api_error_mut(&mut self) -> Option<&mut ApiError> {
        match self {
            ErrorKind::Authentication(api)
            | ErrorKind::Authorization(api)
            | ErrorKind::Validation(api)
            | ErrorKind::NotFound(api)
            | ErrorKind::Conflict(api)
            | ErrorKind::RateLimited(api)
            | ErrorKind::Server(api)
            | ErrorKind::Api(api) => Some(api),
            _ => None,
        }
    }
}

fn default_message(status: u16) -> String {
    match reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("Request failed with status {} {}", status, reason),
        None => format!("Request failed with status {}", status),
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the URL in its message, query string and all
        let message = sanitize_error_message(&err.to_string());
        let kind = if err.is_timeout() {
            ErrorKind::Timeout(message)
        } else {
            ErrorKind::Network(message)
        };

        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::Config(format!("Invalid URL: {}", err)), err)
    }
}
