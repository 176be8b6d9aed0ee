//! Port for the subscription payment provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BillingEvent, CheckoutSessionRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by payment provider clients.
    pub enum PaymentsError {
        /// The provider could not be reached.
        Transport { message: String } => "payments request failed: {message}",
        /// The provider answered with an error payload.
        Upstream { status: u16, message: String } => "payments provider returned {status}: {message}",
        /// The webhook signature did not verify.
        InvalidSignature { message: String } => "invalid payments webhook signature: {message}",
        /// The webhook or response body could not be parsed.
        Decode { message: String } => "payments payload malformed: {message}",
    }
}

/// Payment provider operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentsGateway: Send + Sync {
    /// Create a hosted checkout session and return its URL.
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<String, PaymentsError>;

    /// Create a self-service billing portal session and return its URL.
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, PaymentsError>;

    /// Verify a webhook signature and decode the event.
    fn parse_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<BillingEvent, PaymentsError>;
}

/// Fixture gateway for deployments without payment credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePaymentsGateway;

#[async_trait]
impl PaymentsGateway for FixturePaymentsGateway {
    async fn create_checkout_session(
        &self,
        _request: &CheckoutSessionRequest,
    ) -> Result<String, PaymentsError> {
        Err(PaymentsError::transport("payments provider not configured"))
    }

    async fn create_portal_session(
        &self,
        _customer_id: &str,
        _return_url: &str,
    ) -> Result<String, PaymentsError> {
        Err(PaymentsError::transport("payments provider not configured"))
    }

    fn parse_webhook(
        &self,
        _payload: &[u8],
        _signature: &str,
        _now: DateTime<Utc>,
    ) -> Result<BillingEvent, PaymentsError> {
        Err(PaymentsError::invalid_signature("no webhook secret configured"))
    }
}
