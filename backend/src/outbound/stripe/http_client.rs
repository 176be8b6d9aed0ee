//! Form-encoded Stripe REST client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::events::{META_AUTH_SUBJECT, META_INTERVAL, META_PLAN, decode_event};
use super::signature;
use crate::domain::ports::{PaymentsError, PaymentsGateway};
use crate::domain::{BillingEvent, CheckoutSessionRequest};
use crate::outbound::http_body::body_preview;

pub const DEFAULT_STRIPE_BASE_URL: &str = "https://api.stripe.com";
const CHECKOUT_CURRENCY: &str = "usd";

/// Credentials for [`StripeHttpGateway`].
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: String,
}

/// Hosted checkout, billing portal and webhook verification.
pub struct StripeHttpGateway {
    client: Client,
    config: StripeConfig,
}

impl StripeHttpGateway {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: StripeConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    async fn create_session(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<String, PaymentsError> {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        debug!(%url, "stripe request");
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(form)
            .send()
            .await
            .map_err(|err| PaymentsError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| PaymentsError::transport(err.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_slice::<StripeErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or_else(|_| body_preview(&body));
            return Err(PaymentsError::upstream(status.as_u16(), message));
        }
        let session: SessionResponse =
            serde_json::from_slice(&body).map_err(|err| PaymentsError::decode(err.to_string()))?;
        session
            .url
            .ok_or_else(|| PaymentsError::decode("session has no url"))
    }
}

fn pair(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_owned(), value.into())
}

/// Form fields for a subscription-mode checkout session.
fn checkout_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let plan = request.plan;
    let interval = request.interval;
    let mut form = vec![
        pair("mode", "subscription"),
        pair("payment_method_types[0]", "card"),
        pair("line_items[0][quantity]", "1"),
        pair("line_items[0][price_data][currency]", CHECKOUT_CURRENCY),
        pair(
            "line_items[0][price_data][unit_amount]",
            plan.price(interval).get().to_string(),
        ),
        pair(
            "line_items[0][price_data][recurring][interval]",
            interval.recurring_interval(),
        ),
        pair(
            "line_items[0][price_data][product_data][name]",
            format!("Patrimony {} Plan", plan.display_name()),
        ),
        pair(
            "line_items[0][price_data][product_data][description]",
            format!("{} tier, {} billing", plan.display_name(), interval.as_str()),
        ),
        pair(
            "subscription_data[trial_period_days]",
            request.trial_days.to_string(),
        ),
        pair("allow_promotion_codes", "true"),
        pair("billing_address_collection", "required"),
        pair("success_url", request.success_url.as_str()),
        pair("cancel_url", request.cancel_url.as_str()),
    ];
    for prefix in ["metadata", "subscription_data[metadata]"] {
        form.push(pair(
            &format!("{prefix}[{META_AUTH_SUBJECT}]"),
            request.auth_subject.as_str(),
        ));
        form.push(pair(&format!("{prefix}[{META_PLAN}]"), plan.as_str()));
        form.push(pair(&format!("{prefix}[{META_INTERVAL}]"), interval.as_str()));
    }
    if let Some(email) = &request.customer_email {
        form.push(pair("customer_email", email.as_str()));
    }
    form
}

#[async_trait]
impl PaymentsGateway for StripeHttpGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<String, PaymentsError> {
        self.create_session("/v1/checkout/sessions", &checkout_form(request))
            .await
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, PaymentsError> {
        let form = [pair("customer", customer_id), pair("return_url", return_url)];
        self.create_session("/v1/billing_portal/sessions", &form)
            .await
    }

    fn parse_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<BillingEvent, PaymentsError> {
        signature::verify(
            &self.config.webhook_secret,
            payload,
            signature,
            now.timestamp(),
        )?;
        decode_event(payload)
    }
}
