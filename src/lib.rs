//! # signtusk-sdk
//!
//! Rust SDK for the SignTusk e-signature platform API.
//!
//! The SDK validates configuration up front, keeps one pooled HTTP session
//! per client, retries transient failures, and reports every failure as a
//! typed error.
//!
//! ## Security
//!
//! - Sensitive data (API keys, tokens, secrets) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages from the platform are sanitized before they surface
//!
//! ## Crates
//!
//! - **signtusk-client** - Configuration, error taxonomy, transport session, request pipeline
//! - **signtusk-auth** - OAuth 2.0 token flows and the webhook verification interface
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use signtusk_sdk::{SdkConfig, SignTuskClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SignTuskClient::new(SdkConfig::with_api_key("sk_live_...")?)?;
//!
//!     let documents: serde_json::Value = client.get_json("/api/v1/documents").await?;
//!     println!("{documents:#}");
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

// Re-export member crates for convenient access
#[cfg(feature = "auth")]
pub use signtusk_auth as auth;
#[cfg(feature = "client")]
pub use signtusk_client as client;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use signtusk_auth::{OAuthClient, TokenResponse, WebhookVerifier};
#[cfg(feature = "client")]
pub use signtusk_client::{
    ApiResponse, Credential, Environment, Error, ErrorKind, FilePart, LogicalRequest, RawConfig,
    Result, SdkConfig, SignTuskClient,
};
