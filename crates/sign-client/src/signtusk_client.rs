//! High-level SignTusk client: the request pipeline.
//!
//! `SignTuskClient` turns a [`LogicalRequest`] into an absolute URL and a
//! final header set, hands it to the transport session, and maps the outcome
//! into either an [`ApiResponse`] or a typed [`Error`].
//!
//! ## Security
//!
//! - Credentials are redacted in Debug output
//! - Sensitive parameters are skipped in tracing spans
//! - The Authorization header value is marked sensitive

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::client::{PreparedRequest, SignHttpClient};
use crate::config::ClientConfig;
use crate::credentials::Credential;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{FilePart, LogicalRequest};
use crate::response::{self, ApiResponse, ErrorPayload};
use crate::sdk_config::{RawConfig, SdkConfig};

const JSON_MEDIA_TYPE: &str = "application/json";

/// High-level SignTusk API client.
///
/// Cloning is cheap: clones share the transport session and the
/// authentication state, so [`set_auth_token`](Self::set_auth_token) on one
/// clone is seen by all of them.
///
/// # Example
///
/// ```rust,ignore
/// use signtusk_client::{SdkConfig, SignTuskClient};
///
/// let client = SignTuskClient::new(SdkConfig::with_api_key("sk_live_...")?)?;
///
/// let document: Document = client.get_json("/api/v1/documents/doc_1").await?;
///
/// let created: Document = client
///     .post_json("/api/v1/documents", &new_document)
///     .await?;
/// ```
#[derive(Clone)]
pub struct SignTuskClient {
    http: SignHttpClient,
    base_url: Arc<str>,
    auth: Arc<RwLock<AuthState>>,
}

/// Configuration and the session headers derived from its credential. Both
/// are replaced together on every auth change so readers always see a
/// consistent snapshot.
struct AuthState {
    config: Arc<SdkConfig>,
    headers: Arc<HeaderMap>,
}

impl std::fmt::Debug for SignTuskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = self.auth.read();
        f.debug_struct("SignTuskClient")
            .field("base_url", &self.base_url)
            .field("environment", &auth.config.environment())
            .field("credential", &auth.config.credential())
            .field("closed", &self.http.is_closed())
            .finish_non_exhaustive()
    }
}

impl SignTuskClient {
    /// Create a client from validated configuration.
    pub fn new(config: SdkConfig) -> Result<Self> {
        let client_config = config.client_config();
        Self::with_client_config(config, client_config)
    }

    /// Create a client with custom transport settings. Timeout and retry
    /// values in `client_config` take precedence over those in `config`.
    pub fn with_client_config(config: SdkConfig, client_config: ClientConfig) -> Result<Self> {
        let http = SignHttpClient::new(client_config)?;
        let headers = session_headers(config.credential())?;

        debug!(
            base_url = config.base_url(),
            environment = config.environment().as_str(),
            credential = config.credential().map_or("none", Credential::kind_name),
            "Client created"
        );

        Ok(Self {
            http,
            base_url: Arc::from(config.base_url()),
            auth: Arc::new(RwLock::new(AuthState {
                config: Arc::new(config),
                headers: Arc::new(headers),
            })),
        })
    }

    /// Validate untyped configuration and create a client from it.
    pub fn from_raw(raw: RawConfig) -> Result<Self> {
        Self::new(SdkConfig::from_raw(raw)?)
    }

    /// Create a client from `SIGNTUSK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(SdkConfig::from_env()?)
    }

    /// Snapshot of the current configuration, including any credential
    /// installed or cleared since construction.
    pub fn config(&self) -> Arc<SdkConfig> {
        Arc::clone(&self.auth.read().config)
    }

    /// Get the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a path.
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Get the underlying transport session.
    pub fn http(&self) -> &SignHttpClient {
        &self.http
    }

    // =========================================================================
    // Request pipeline
    // =========================================================================

    /// Execute a request through the full pipeline.
    ///
    /// Returns the response for any 2xx status. Every other status becomes a
    /// typed error carrying the parsed message, code, details and request id.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn execute(&self, request: LogicalRequest) -> Result<ApiResponse> {
        let url = self.request_url(&request)?;
        let headers = merge_headers(&self.header_snapshot(), &request)?;

        let LogicalRequest { method, body, .. } = request;
        let prepared = PreparedRequest {
            method,
            url,
            headers,
            body,
        };

        let response = self.http.send(&prepared).await?;
        if response.is_success() {
            return Ok(response);
        }

        Err(error_from_response(&response))
    }

    fn request_url(&self, request: &LogicalRequest) -> Result<Url> {
        let mut url = Url::parse(&self.url(request.path())).map_err(|e| {
            Error::with_source(
                ErrorKind::InvalidRequest(format!("invalid request path {:?}", request.path())),
                e,
            )
        })?;

        if !request.query_params().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query_params());
        }

        Ok(url)
    }

    fn header_snapshot(&self) -> Arc<HeaderMap> {
        Arc::clone(&self.auth.read().headers)
    }

    // =========================================================================
    // Verb helpers
    // =========================================================================

    // These cover the common shapes. Query parameters and per-call headers
    // go through a `LogicalRequest` passed to `execute`.

    /// Send a GET request.
    ///
    /// For query parameters or extra headers build the request instead:
    ///
    /// ```rust,ignore
    /// let request = LogicalRequest::get("/api/v1/documents")
    ///     .query("status", "draft")
    ///     .header("X-Request-Id", "req_1");
    /// let response = client.execute(request).await?;
    /// ```
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.execute(LogicalRequest::get(path)).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.execute(LogicalRequest::post(path).json(body)?).await
    }

    /// Send a PUT request with a JSON body.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.execute(LogicalRequest::put(path).json(body)?).await
    }

    /// Send a PATCH request with a JSON body. PATCH is never retried.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.execute(LogicalRequest::patch(path).json(body)?).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.execute(LogicalRequest::delete(path)).await
    }

    /// Upload a file as `multipart/form-data` under the field `file`, with
    /// optional extra text fields.
    #[instrument(skip(self, file, fields), fields(path = %path))]
    pub async fn upload_file<I, K, V>(
        &self,
        path: &str,
        file: FilePart,
        fields: I,
    ) -> Result<ApiResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = fields
            .into_iter()
            .fold(LogicalRequest::post(path).file("file", file), |req, (k, v)| {
                req.form_field(k, v)
            });
        self.execute(request).await
    }

    // =========================================================================
    // Typed JSON helpers
    // =========================================================================

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }

    /// POST a JSON body and deserialize the JSON response.
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.post(path, body).await?.json()
    }

    /// PUT a JSON body and deserialize the JSON response.
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.put(path, body).await?.json()
    }

    /// PATCH a JSON body and deserialize the JSON response.
    pub async fn patch_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.patch(path, body).await?.json()
    }

    /// DELETE a resource and deserialize the JSON response.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.delete(path).await?.json()
    }

    // =========================================================================
    // Authentication state
    // =========================================================================

    /// Replace the configured credential with a bearer token. Applies to
    /// every request sent after this call returns.
    pub fn set_auth_token(&self, token: impl Into<String>) -> Result<()> {
        let credential = Credential::ApiKey(token.into());
        let headers = session_headers(Some(&credential))?;

        let mut auth = self.auth.write();
        auth.config = Arc::new(auth.config.with_credential(Some(credential)));
        auth.headers = Arc::new(headers);
        debug!("Authorization token replaced");
        Ok(())
    }

    /// Remove the configured credential and the Authorization header.
    pub fn clear_auth(&self) {
        let mut auth = self.auth.write();
        auth.config = Arc::new(auth.config.with_credential(None));
        let mut headers = HeaderMap::clone(&auth.headers);
        headers.remove(AUTHORIZATION);
        auth.headers = Arc::new(headers);
        debug!("Authorization cleared");
    }

    /// Current credential, if any. Always agrees with `config().credential()`.
    pub fn credential(&self) -> Option<Credential> {
        self.auth.read().config.credential().cloned()
    }

    /// Returns true if requests currently carry an Authorization header.
    pub fn is_authenticated(&self) -> bool {
        self.auth.read().headers.contains_key(AUTHORIZATION)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the transport session. Idempotent. Pending and later requests
    /// fail with a network error.
    pub fn close(&self) {
        self.http.close();
    }

    /// Returns true once the client has been closed.
    pub fn is_closed(&self) -> bool {
        self.http.is_closed()
    }
}

/// Join a base URL and a path with exactly one `/` between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Session-level headers: JSON defaults plus the bearer token, if any.
fn session_headers(credential: Option<&Credential>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE));
    headers.insert(ACCEPT, HeaderValue::from_static(JSON_MEDIA_TYPE));

    if let Some(token) = credential.and_then(Credential::bearer_token) {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            Error::with_source(
                ErrorKind::InvalidRequest("auth token contains invalid header characters".into()),
                e,
            )
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

/// Merge session headers with per-call headers. Per-call values win; a
/// multipart body drops Content-Type so the transport can set the boundary.
pub(crate) fn merge_headers(session: &HeaderMap, request: &LogicalRequest) -> Result<HeaderMap> {
    let mut headers = session.clone();

    for (name, value) in request.headers() {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::with_source(
                ErrorKind::InvalidRequest(format!("invalid header name {name:?}")),
                e,
            )
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::with_source(
                ErrorKind::InvalidRequest(format!("invalid value for header {name}")),
                e,
            )
        })?;
        headers.insert(name, value);
    }

    if request.is_multipart() {
        headers.remove(CONTENT_TYPE);
    }

    Ok(headers)
}

fn error_from_response(response: &ApiResponse) -> Error {
    let payload = ErrorPayload::parse(&response.text());
    let request_id = response.request_id().map(str::to_string);

    Error::from_response(response.status(), &payload, request_id)
        .with_retry_after(response::retry_after(response.headers()))
}
