//! # signtusk-client
//!
//! Core HTTP client for the SignTusk e-signature API.
//!
//! This crate provides:
//! - Configuration validation with per-environment defaults
//! - A typed error taxonomy for API and transport failures
//! - A pooled transport session with retry, backoff and timeouts
//! - Bearer-token authentication that can be swapped at runtime
//! - JSON and multipart request bodies
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │  (resource helpers, signtusk-auth token flows)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SignTuskClient                           │
//! │  - URL join, header merge, auth snapshot                    │
//! │  - Typed JSON methods (get_json, post_json, etc.)           │
//! │  - Error mapping from status + body                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SignHttpClient                           │
//! │  - Connection pool, timeouts, compression                   │
//! │  - Retry with exponential backoff and jitter                │
//! │  - Idempotent close                                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use signtusk_client::{SdkConfig, SignTuskClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), signtusk_client::Error> {
//!     let client = SignTuskClient::from_env()?;
//!
//!     let documents: serde_json::Value = client.get_json("/api/v1/documents").await?;
//!
//!     match client.get("/api/v1/documents/missing").await {
//!         Err(e) if e.status() == Some(404) => println!("{}", e.message()),
//!         other => println!("{:?}", other.map(|r| r.status())),
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod credentials;
mod error;
mod request;
mod response;
mod retry;
mod sdk_config;
mod signtusk_client;

pub use client::{PreparedRequest, SignHttpClient};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use credentials::{Credential, JwtCredential, OAuthSettings};
pub use error::{ApiError, Error, ErrorKind, Result};
pub use request::{FilePart, LogicalRequest, MultipartBody, RequestBody, RequestMethod};
pub use response::{ApiResponse, ErrorPayload, REQUEST_ID_HEADER};
pub use retry::{
    is_retryable_method, is_retryable_status, BackoffStrategy, RetryConfig, RetryPolicy,
    RETRYABLE_STATUSES,
};
pub use sdk_config::{
    Environment, RawConfig, SdkConfig, SdkConfigBuilder, DEFAULT_RETRY_COUNT,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_MS,
};
pub use signtusk_client::SignTuskClient;

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("signtusk-rust-sdk/", env!("CARGO_PKG_VERSION"));
