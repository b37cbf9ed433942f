//! HTTP response handling.

use std::sync::LazyLock;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Header the platform uses to correlate a response with its server-side logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A successful (2xx) response, fully read.
///
/// The pipeline hands back status, headers and body exactly as received.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub(crate) fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Get the `x-request-id` header value.
    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID_HEADER)
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response and return the body bytes.
    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(Into::into)
    }
}

/// Parse a `Retry-After` header given in seconds.
///
/// HTTP-date values are ignored; the platform sends delta-seconds.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Error payload extracted from a non-success response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorPayload {
    /// Human-readable message.
    pub message: Option<String>,
    /// Machine-readable error code.
    pub code: Option<String>,
    /// Structured details.
    pub details: Option<serde_json::Value>,
}

impl ErrorPayload {
    /// Parse an error body.
    ///
    /// A JSON object contributes its `message`, `code` and `details` fields
    /// (also when nested under `error`). Anything else becomes
    /// `{message: raw body}`, or `"Unknown error"` when the body is empty.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(map)) => Self::from_object(&map),
            _ => {
                let message = if raw.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    sanitize_error_message(raw)
                };
                Self {
                    message: Some(message),
                    ..Default::default()
                }
            }
        }
    }

    fn from_object(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let nested = map.get("error").and_then(|v| v.as_object());
        let field = |name: &str| -> Option<&serde_json::Value> {
            map.get(name).or_else(|| nested.and_then(|n| n.get(name)))
        };
        let string_field = |name: &str| field(name).and_then(|v| v.as_str()).map(str::to_string);

        let flat_error = map.get("error").and_then(|v| v.as_str()).map(str::to_string);

        let message = string_field("message")
            .or_else(|| string_field("error_description"))
            .or_else(|| flat_error.clone())
            .map(|m| sanitize_error_message(&m));

        Self {
            message,
            code: string_field("code").or(flat_error),
            details: field("details").cloned(),
        }
    }
}

static BEARER_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"(?i)bearer\s+[A-Za-z0-9\-._~+/]+=*").expect("valid bearer pattern")
});

static SECRET_PARAM_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"(?i)(api_key|apikey|access_token|refresh_token|client_secret)=[^&\s]+")
        .expect("valid secret parameter pattern")
});

/// Sanitize an error message to prevent exposing credentials.
///
/// - Bearer tokens become `Bearer [REDACTED]`
/// - `api_key=`, `access_token=` and similar parameters lose their values
/// - Messages longer than 500 bytes are truncated
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let sanitized = BEARER_PATTERN.replace_all(message, "Bearer [REDACTED]");
    let mut sanitized = SECRET_PARAM_PATTERN
        .replace_all(&sanitized, "${1}=[REDACTED]")
        .into_owned();

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
