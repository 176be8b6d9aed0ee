//! Tests for checkout, portal and webhook handling.

use chrono::Utc;
use mockall::predicate::{always, eq};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockPaymentsGateway, PaymentsError};
use crate::domain::{AuthIdentity, ErrorCode, UserId};
use crate::test_support::{InMemorySubscriptions, InMemoryUsers, fixture_clock};

struct Harness {
    users: Arc<InMemoryUsers>,
    subscriptions: Arc<InMemorySubscriptions>,
}

impl Harness {
    fn service(&self, payments: MockPaymentsGateway) -> BillingService {
        BillingService::new(BillingPorts {
            users: self.users.clone(),
            subscriptions: self.subscriptions.clone(),
            payments: Arc::new(payments),
            clock: fixture_clock(),
            app_url: "https://app.example.com/".to_owned(),
        })
    }

    async fn user(&self) -> User {
        self.users
            .upsert_identity(&AuthIdentity {
                subject: AuthSubject::new("user_2abc").expect("valid subject"),
                email: Some("ada@example.com".to_owned()),
                name: None,
            })
            .await
            .expect("user stored")
    }

    async fn subscribe(&self, user_id: UserId, status: SubscriptionStatus) {
        self.subscriptions
            .upsert(&Subscription {
                user_id,
                plan: Plan::Steward,
                interval: BillingInterval::Annual,
                status,
                stripe_customer_id: Some("cus_1".to_owned()),
                stripe_subscription_id: Some("sub_1".to_owned()),
                current_period_end: None,
            })
            .await
            .expect("subscription stored");
    }

    fn status(&self) -> Option<SubscriptionStatus> {
        self.subscriptions.all().first().map(|s| s.status)
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        users: Arc::new(InMemoryUsers::default()),
        subscriptions: Arc::new(InMemorySubscriptions::default()),
    }
}

#[rstest]
#[tokio::test]
async fn checkout_builds_session_request(harness: Harness) {
    let user = harness.user().await;
    let mut payments = MockPaymentsGateway::new();
    payments
        .expect_create_checkout_session()
        .withf(|request| {
            request.plan == Plan::Dynasty
                && request.interval == BillingInterval::Annual
                && request.trial_days == TRIAL_DAYS
                && request.auth_subject.as_str() == "user_2abc"
                && request.success_url
                    == "https://app.example.com/checkout/success?session_id={CHECKOUT_SESSION_ID}"
                && request.cancel_url == "https://app.example.com/checkout/canceled"
        })
        .times(1)
        .return_once(|_| Ok("https://checkout.example/s/1".to_owned()));

    let url = harness
        .service(payments)
        .checkout(&user, "dynasty", "annual")
        .await
        .expect("checkout created");
    assert_eq!(url, "https://checkout.example/s/1");
}

#[rstest]
#[case("platinum", "monthly")]
#[case("steward", "weekly")]
#[tokio::test]
async fn checkout_rejects_unknown_plan_or_interval(
    harness: Harness,
    #[case] plan: &str,
    #[case] interval: &str,
) {
    let user = harness.user().await;
    let mut payments = MockPaymentsGateway::new();
    payments.expect_create_checkout_session().never();
    let err = harness
        .service(payments)
        .checkout(&user, plan, interval)
        .await
        .expect_err("invalid selection");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn portal_requires_customer(harness: Harness) {
    let user = harness.user().await;
    let err = harness
        .service(MockPaymentsGateway::new())
        .billing_portal(&user)
        .await
        .expect_err("no customer");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "No billing account");
}

#[rstest]
#[tokio::test]
async fn portal_returns_to_settings(harness: Harness) {
    let user = harness.user().await;
    harness.subscribe(user.id, SubscriptionStatus::Active).await;
    let mut payments = MockPaymentsGateway::new();
    payments
        .expect_create_portal_session()
        .with(eq("cus_1"), eq("https://app.example.com/settings"))
        .return_once(|_, _| Ok("https://billing.example/p/1".to_owned()));

    let url = harness
        .service(payments)
        .billing_portal(&user)
        .await
        .expect("portal created");
    assert_eq!(url, "https://billing.example/p/1");
}

#[rstest]
#[tokio::test]
async fn missing_signature_is_rejected(harness: Harness) {
    let mut payments = MockPaymentsGateway::new();
    payments.expect_parse_webhook().never();
    let err = harness
        .service(payments)
        .handle_webhook(b"{}", None)
        .await
        .expect_err("unsigned webhook");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn bad_signature_is_rejected(harness: Harness) {
    let mut payments = MockPaymentsGateway::new();
    payments
        .expect_parse_webhook()
        .with(always(), eq("t=1,v1=00"), always())
        .return_once(|_, _, _| Err(PaymentsError::invalid_signature("mismatch")));
    let err = harness
        .service(payments)
        .handle_webhook(b"{}", Some("t=1,v1=00"))
        .await
        .expect_err("forged webhook");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Invalid signature");
}

#[rstest]
#[tokio::test]
async fn checkout_completion_starts_trial(harness: Harness) {
    let user = harness.user().await;
    let outcome = harness
        .service(MockPaymentsGateway::new())
        .apply_event(BillingEvent::CheckoutCompleted(CheckoutCompleted {
            auth_subject: Some("user_2abc".to_owned()),
            plan: Some("principal".to_owned()),
            interval: Some("monthly".to_owned()),
            customer_id: Some("cus_9".to_owned()),
            subscription_id: Some("sub_9".to_owned()),
        }))
        .await
        .expect("event applied");

    assert_eq!(outcome, BillingOutcome::Updated);
    let stored = harness.subscriptions.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_id, user.id);
    assert_eq!(stored[0].status, SubscriptionStatus::Trialing);
    assert_eq!(stored[0].plan, Plan::Principal);
    assert_eq!(stored[0].stripe_customer_id.as_deref(), Some("cus_9"));
}

#[rstest]
#[tokio::test]
async fn checkout_completion_for_unknown_user_is_ignored(harness: Harness) {
    let outcome = harness
        .service(MockPaymentsGateway::new())
        .apply_event(BillingEvent::CheckoutCompleted(CheckoutCompleted {
            auth_subject: Some("user_missing".to_owned()),
            plan: Some("steward".to_owned()),
            interval: Some("monthly".to_owned()),
            ..CheckoutCompleted::default()
        }))
        .await
        .expect("event applied");
    assert_eq!(outcome, BillingOutcome::Ignored);
    assert!(harness.subscriptions.all().is_empty());
}

#[rstest]
#[case(
    SubscriptionStatus::Trialing,
    BillingEvent::SubscriptionUpdated {
        subscription_id: "sub_1".to_owned(),
        status: "active".to_owned(),
        current_period_end: Some(Utc::now()),
    },
    SubscriptionStatus::Active
)]
#[case(
    SubscriptionStatus::Active,
    BillingEvent::SubscriptionDeleted { subscription_id: "sub_1".to_owned() },
    SubscriptionStatus::Canceled
)]
#[case(
    SubscriptionStatus::Active,
    BillingEvent::PaymentFailed { subscription_id: Some("sub_1".to_owned()) },
    SubscriptionStatus::PastDue
)]
#[case(
    SubscriptionStatus::PastDue,
    BillingEvent::PaymentSucceeded { subscription_id: Some("sub_1".to_owned()) },
    SubscriptionStatus::Active
)]
#[case(
    SubscriptionStatus::Trialing,
    BillingEvent::PaymentSucceeded { subscription_id: Some("sub_1".to_owned()) },
    SubscriptionStatus::Trialing
)]
#[case(
    SubscriptionStatus::Active,
    BillingEvent::Other { event_type: "customer.created".to_owned() },
    SubscriptionStatus::Active
)]
#[tokio::test]
async fn lifecycle_events_move_status(
    harness: Harness,
    #[case] initial: SubscriptionStatus,
    #[case] event: BillingEvent,
    #[case] expected: SubscriptionStatus,
) {
    let user = harness.user().await;
    harness.subscribe(user.id, initial).await;

    harness
        .service(MockPaymentsGateway::new())
        .apply_event(event)
        .await
        .expect("event applied");

    assert_eq!(harness.status(), Some(expected));
}
