//! Port for authenticating aggregator webhook deliveries.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Reasons a webhook delivery is rejected.
    pub enum WebhookVerificationError {
        /// No verification header was sent.
        MissingSignature => "missing webhook verification header",
        /// The signature, algorithm, age or body hash did not check out.
        InvalidSignature { message: String } => "invalid webhook signature: {message}",
        /// The signing key could not be fetched.
        KeyUnavailable { message: String } => "webhook verification key unavailable: {message}",
    }
}

/// Verifies signed aggregator webhooks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaidWebhookVerifier: Send + Sync {
    /// Check the signed verification header against the raw request body.
    async fn verify(&self, header: &str, body: &[u8]) -> Result<(), WebhookVerificationError>;
}

/// Fixture verifier that rejects everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePlaidWebhookVerifier;

#[async_trait]
impl PlaidWebhookVerifier for FixturePlaidWebhookVerifier {
    async fn verify(&self, _header: &str, _body: &[u8]) -> Result<(), WebhookVerificationError> {
        Err(WebhookVerificationError::key_unavailable(
            "bank data provider not configured",
        ))
    }
}
