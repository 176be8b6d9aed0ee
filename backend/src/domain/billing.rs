//! Checkout, billing portal and payment-provider webhook handling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use tracing::{info, warn};

use super::ports::{PaymentsError, PaymentsGateway, SubscriptionRepository, UserRepository};
use super::{
    AuthSubject, BillingInterval, Error, Plan, Subscription, SubscriptionStatus, TRIAL_DAYS, User,
};

/// Parameters for a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub plan: Plan,
    pub interval: BillingInterval,
    pub auth_subject: AuthSubject,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub trial_days: u32,
}

/// Fields read from a completed checkout session's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutCompleted {
    pub auth_subject: Option<String>,
    pub plan: Option<String>,
    pub interval: Option<String>,
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

/// Decoded payment-provider webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingEvent {
    CheckoutCompleted(CheckoutCompleted),
    SubscriptionUpdated {
        subscription_id: String,
        status: String,
        current_period_end: Option<DateTime<Utc>>,
    },
    SubscriptionDeleted {
        subscription_id: String,
    },
    PaymentFailed {
        subscription_id: Option<String>,
    },
    PaymentSucceeded {
        subscription_id: Option<String>,
    },
    Other {
        event_type: String,
    },
}

/// What a webhook did to local state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingOutcome {
    Updated,
    Ignored,
}

/// Ports and settings used by [`BillingService`].
pub struct BillingPorts {
    pub users: Arc<dyn UserRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentsGateway>,
    pub clock: Arc<dyn Clock>,
    pub app_url: String,
}

/// Subscription billing workflows.
#[derive(Clone)]
pub struct BillingService {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentsGateway>,
    clock: Arc<dyn Clock>,
    app_url: String,
}

fn map_payments_error(err: PaymentsError) -> Error {
    match err {
        PaymentsError::InvalidSignature { message } => {
            warn!(%message, "payments webhook rejected");
            Error::invalid_request("Invalid signature")
        }
        PaymentsError::Decode { message } => {
            warn!(%message, "payments payload malformed");
            Error::invalid_request("Invalid payload")
        }
        PaymentsError::Transport { message } => {
            Error::service_unavailable(format!("payments provider unavailable: {message}"))
        }
        PaymentsError::Upstream { status, message } => {
            Error::internal(format!("payments provider returned {status}: {message}"))
        }
    }
}

impl BillingService {
    /// Build the service from its ports.
    pub fn new(ports: BillingPorts) -> Self {
        let BillingPorts {
            users,
            subscriptions,
            payments,
            clock,
            app_url,
        } = ports;
        Self {
            users,
            subscriptions,
            payments,
            clock,
            app_url: app_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Start a hosted checkout for `plan`/`interval` and return its URL.
    pub async fn checkout(&self, user: &User, plan: &str, interval: &str) -> Result<String, Error> {
        let plan: Plan = plan.parse().map_err(|_| Error::invalid_request("Invalid plan"))?;
        let interval: BillingInterval = interval
            .parse()
            .map_err(|_| Error::invalid_request("Invalid billing interval"))?;
        let request = CheckoutSessionRequest {
            plan,
            interval,
            auth_subject: user.auth_subject.clone(),
            customer_email: Some(user.email.clone()).filter(|email| !email.is_empty()),
            success_url: format!(
                "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
                self.app_url
            ),
            cancel_url: format!("{}/checkout/canceled", self.app_url),
            trial_days: TRIAL_DAYS,
        };
        self.payments
            .create_checkout_session(&request)
            .await
            .map_err(map_payments_error)
    }

    /// Open the self-service billing portal for the user's customer record.
    pub async fn billing_portal(&self, user: &User) -> Result<String, Error> {
        let customer_id = self
            .subscriptions
            .find_for_user(&user.id)
            .await?
            .and_then(|subscription| subscription.stripe_customer_id)
            .ok_or_else(|| Error::invalid_request("No billing account"))?;
        self.payments
            .create_portal_session(&customer_id, &format!("{}/settings", self.app_url))
            .await
            .map_err(map_payments_error)
    }

    /// Verify and apply a payment-provider webhook.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<BillingOutcome, Error> {
        let signature = signature.ok_or_else(|| Error::invalid_request("Missing signature"))?;
        let event = self
            .payments
            .parse_webhook(payload, signature, self.clock.utc())
            .map_err(map_payments_error)?;
        self.apply_event(event).await
    }

    /// Apply a verified event to local subscription state.
    pub async fn apply_event(&self, event: BillingEvent) -> Result<BillingOutcome, Error> {
        match event {
            BillingEvent::CheckoutCompleted(completed) => self.apply_checkout(completed).await,
            BillingEvent::SubscriptionUpdated {
                subscription_id,
                status,
                current_period_end,
            } => {
                let Ok(status) = status.parse::<SubscriptionStatus>() else {
                    warn!(%subscription_id, %status, "unknown subscription status");
                    return Ok(BillingOutcome::Ignored);
                };
                self.update_subscription(&subscription_id, |subscription| {
                    subscription.status = status;
                    if current_period_end.is_some() {
                        subscription.current_period_end = current_period_end;
                    }
                })
                .await
            }
            BillingEvent::SubscriptionDeleted { subscription_id } => {
                self.update_subscription(&subscription_id, |subscription| {
                    subscription.status = SubscriptionStatus::Canceled;
                })
                .await
            }
            BillingEvent::PaymentFailed {
                subscription_id: Some(subscription_id),
            } => {
                self.update_subscription(&subscription_id, |subscription| {
                    subscription.status = SubscriptionStatus::PastDue;
                })
                .await
            }
            BillingEvent::PaymentSucceeded {
                subscription_id: Some(subscription_id),
            } => {
                self.update_subscription(&subscription_id, |subscription| {
                    if subscription.status == SubscriptionStatus::PastDue {
                        subscription.status = SubscriptionStatus::Active;
                    }
                })
                .await
            }
            BillingEvent::PaymentFailed { .. } | BillingEvent::PaymentSucceeded { .. } => {
                Ok(BillingOutcome::Ignored)
            }
            BillingEvent::Other { event_type } => {
                info!(%event_type, "ignoring payments event");
                Ok(BillingOutcome::Ignored)
            }
        }
    }

    async fn apply_checkout(&self, completed: CheckoutCompleted) -> Result<BillingOutcome, Error> {
        let Some(subject) = completed
            .auth_subject
            .as_deref()
            .and_then(|raw| AuthSubject::new(raw).ok())
        else {
            warn!("checkout completed without a usable auth subject");
            return Ok(BillingOutcome::Ignored);
        };
        let plan = completed.plan.as_deref().and_then(|raw| raw.parse::<Plan>().ok());
        let interval = completed
            .interval
            .as_deref()
            .and_then(|raw| raw.parse::<BillingInterval>().ok());
        let (Some(plan), Some(interval)) = (plan, interval) else {
            warn!(%subject, "checkout completed without plan metadata");
            return Ok(BillingOutcome::Ignored);
        };
        let Some(user) = self.users.find_by_subject(&subject).await? else {
            warn!(%subject, "checkout completed for unknown user");
            return Ok(BillingOutcome::Ignored);
        };

        let subscription = Subscription {
            user_id: user.id,
            plan,
            interval,
            status: SubscriptionStatus::Trialing,
            stripe_customer_id: completed.customer_id,
            stripe_subscription_id: completed.subscription_id,
            current_period_end: None,
        };
        self.subscriptions.upsert(&subscription).await?;
        info!(user_id = %user.id, plan = plan.as_str(), "subscription started");
        Ok(BillingOutcome::Updated)
    }

    async fn update_subscription(
        &self,
        subscription_id: &str,
        change: impl FnOnce(&mut Subscription),
    ) -> Result<BillingOutcome, Error> {
        let Some(mut subscription) = self
            .subscriptions
            .find_by_stripe_subscription(subscription_id)
            .await?
        else {
            warn!(%subscription_id, "event for unknown subscription");
            return Ok(BillingOutcome::Ignored);
        };
        change(&mut subscription);
        self.subscriptions.upsert(&subscription).await?;
        info!(
            %subscription_id,
            status = subscription.status.as_str(),
            "subscription updated"
        );
        Ok(BillingOutcome::Updated)
    }
}

#[cfg(test)]
#[path = "billing_tests.rs"]
mod tests;
