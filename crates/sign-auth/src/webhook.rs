//! Webhook verification interface.
//!
//! The platform signs webhook deliveries. This crate does not ship a signing
//! scheme; applications plug one in by implementing [`WebhookVerifier`].

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "x-signtusk-signature";

/// Checks that a webhook payload was produced by the platform.
pub trait WebhookVerifier: Send + Sync {
    /// Verify `payload` against `signature`. Returns a
    /// [`WebhookVerification`](crate::ErrorKind::WebhookVerification) error
    /// when the signature does not match.
    fn verify(&self, payload: &[u8], signature: &str) -> Result<()>;
}

/// Verify a delivery and decode its JSON body.
pub fn verify_event<T: DeserializeOwned>(
    verifier: &dyn WebhookVerifier,
    payload: &[u8],
    signature: &str,
) -> Result<T> {
    if signature.trim().is_empty() {
        return Err(Error::webhook("missing signature"));
    }

    verifier.verify(payload, signature)?;
    debug!(payload_len = payload.len(), "Webhook payload verified");
    Ok(serde_json::from_slice(payload)?)
}
