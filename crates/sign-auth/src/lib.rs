//! # signtusk-auth
//!
//! Authentication helpers for the SignTusk API.
//!
//! ## Security
//!
//! - Tokens and secrets are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages sanitize any credential data
//!
//! ## Supported Flows
//!
//! - **OAuth 2.0 Client Credentials** - server-to-server access
//! - **OAuth 2.0 Refresh Token** - renewing an expired access token
//! - **Webhook verification** - pluggable signature checks
//!
//! ## Example
//!
//! ```rust,ignore
//! use signtusk_auth::OAuthClient;
//! use signtusk_client::{OAuthSettings, SdkConfig, SignTuskClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), signtusk_auth::Error> {
//!     let config = SdkConfig::builder()
//!         .oauth(OAuthSettings::new("app_id").with_secret("app_secret"))
//!         .build()?;
//!     let client = SignTuskClient::new(config.clone())?;
//!
//!     let token = OAuthClient::from_config(&config)?.authorize(&client).await?;
//!     println!("token expires at {:?}", token.expires_at());
//!
//!     Ok(())
//! }
//! ```

mod error;
mod oauth;
mod webhook;

pub use error::{Error, ErrorKind, Result};
pub use oauth::{OAuthClient, TokenResponse, TOKEN_PATH};
pub use webhook::{verify_event, WebhookVerifier, SIGNATURE_HEADER};
