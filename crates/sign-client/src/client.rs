//! Transport session: pooled HTTP client with retry and timeout handling.

use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::{MultipartBody, RequestBody, RequestMethod};
use crate::response::{self, ApiResponse};
use crate::retry::{is_retryable_method, is_retryable_status, RetryPolicy};

/// A request ready for the wire: absolute URL, final headers, body.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: RequestMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// Long-lived HTTP session shared by every request of a client.
///
/// Cloning is cheap and clones share the same connection pool. The retry
/// policy runs here, invisible to callers: a call returns once it has a
/// response that is not retryable, or once the retry budget is spent.
#[derive(Debug, Clone)]
pub struct SignHttpClient {
    inner: Arc<Session>,
}

#[derive(Debug)]
struct Session {
    pool: Mutex<Option<reqwest::Client>>,
    closed: CancellationToken,
    config: ClientConfig,
}

impl SignHttpClient {
    /// Create a new transport session.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.effective_connect_timeout())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed);

        let pool = builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            inner: Arc::new(Session {
                pool: Mutex::new(Some(pool)),
                closed: CancellationToken::new(),
                config,
            }),
        })
    }

    /// Create a new transport session with default configuration.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Get the session configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Release pooled connections. Requests in flight fail with a network
    /// error; later requests fail immediately. Calling this again is a no-op.
    pub fn close(&self) {
        let pool = self.inner.pool.lock().take();
        if pool.is_some() {
            debug!("Transport session closed");
        }
        self.inner.closed.cancel();
        drop(pool);
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    /// Send a request, retrying per the configured policy.
    ///
    /// Returns the final response whatever its status; status interpretation
    /// belongs to the caller.
    pub async fn send(&self, request: &PreparedRequest) -> Result<ApiResponse> {
        let pool = self.pool()?;
        let closed = &self.inner.closed;
        let mut policy = self.inner.config.retry.clone().map(RetryPolicy::new);
        let method_retryable = is_retryable_method(request.method);
        let mut attempt: u32 = 1;

        loop {
            let outcome = tokio::select! {
                outcome = self.send_once(&pool, request, attempt) => outcome,
                _ = closed.cancelled() => return Err(closed_error()),
            };

            let (retry_after, reason) = match &outcome {
                Ok(response) if method_retryable && is_retryable_status(response.status()) => (
                    response::retry_after(response.headers()),
                    format!("status {}", response.status()),
                ),
                Err(err) if method_retryable && (err.is_network() || err.is_timeout()) => {
                    (None, err.to_string())
                }
                _ => return outcome,
            };

            let Some(delay) = policy.as_mut().and_then(|p| p.next_delay(retry_after)) else {
                return outcome;
            };

            warn!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                reason = %reason,
                "Request failed, retrying"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = closed.cancelled() => return Err(closed_error()),
            }
            attempt += 1;
        }
    }

    fn pool(&self) -> Result<reqwest::Client> {
        self.inner.pool.lock().clone().ok_or_else(closed_error)
    }

    /// Execute a single attempt and read the whole body.
    async fn send_once(
        &self,
        pool: &reqwest::Client,
        request: &PreparedRequest,
        attempt: u32,
    ) -> Result<ApiResponse> {
        let mut req = pool
            .request(request.method.to_reqwest(), request.url.clone())
            .headers(request.headers.clone());

        req = match &request.body {
            Some(RequestBody::Json(value)) => req.json(value),
            Some(RequestBody::Multipart(form)) => req.multipart(build_form(form)?),
            None => req,
        };

        let tracing_enabled = self.inner.config.enable_tracing;
        if tracing_enabled {
            debug!(
                method = %request.method,
                url = %request.url,
                attempt,
                "Sending request"
            );
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if tracing_enabled {
            if (200..300).contains(&status) {
                debug!(status, content_length = body.len(), "Response received");
            } else {
                info!(
                    status,
                    content_length = body.len(),
                    request_id = headers
                        .get(response::REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok()),
                    "Non-success response"
                );
            }
        }

        Ok(ApiResponse::new(status, headers, body))
    }
}

/// Build a fresh multipart form. Forms are consumed on send, so every
/// attempt gets its own.
fn build_form(body: &MultipartBody) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();

    for (name, value) in &body.fields {
        form = form.text(name.clone(), value.clone());
    }

    for (field, file) in &body.files {
        let mut part = reqwest::multipart::Part::bytes(file.data.to_vec());
        if let Some(ref file_name) = file.file_name {
            part = part.file_name(file_name.clone());
        }
        if let Some(ref content_type) = file.content_type {
            part = part.mime_str(content_type).map_err(|e| {
                Error::with_source(
                    ErrorKind::InvalidRequest(format!(
                        "invalid content type {:?} for file field {:?}",
                        content_type, field
                    )),
                    e,
                )
            })?;
        }
        form = form.part(field.clone(), part);
    }

    Ok(form)
}

fn closed_error() -> Error {
    Error::new(ErrorKind::Network("transport session closed".to_string()))
}
