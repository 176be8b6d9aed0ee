//! Test helpers for inbound HTTP components.
//!
//! [`TestPorts`] wires [`HttpState`] over in-memory repositories and fixture
//! vendor adapters. Tests reach into the stores to seed rows and inspect
//! what a handler wrote.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

use crate::domain::ports::{
    FixtureBankDataSource, FixtureBlobStore, FixtureDocumentRepository, FixtureInsightModel,
    FixturePaymentsGateway, FixturePlaidWebhookVerifier, FixtureTokenCipher, IdentityError,
    IdentityProvider, SubscriptionRepository, UserRepository,
};
use crate::domain::{
    AuthIdentity, AuthSubject, BillingInterval, Plan, Subscription, SubscriptionStatus, User,
};
use crate::inbound::http::api_routes;
use crate::inbound::http::state::{HttpState, HttpStatePorts, HttpStateSettings};
use crate::test_support::{
    InMemoryAssets, InMemoryEntities, InMemoryInsights, InMemoryPlaidAccounts, InMemoryPlaidItems,
    InMemorySubscriptions, InMemoryUsers, fixture_clock,
};

/// Cron secret configured by [`TestPorts::state`].
pub const CRON_SECRET: &str = "cron-test-secret";

const TOKEN_PREFIX: &str = "test-token:";

/// Session token accepted by [`StubIdentityProvider`] for `subject`.
pub fn session_token(subject: &str) -> String {
    format!("{TOKEN_PREFIX}{subject}")
}

/// Accepts `test-token:<subject>` and rejects everything else.
pub struct StubIdentityProvider;

impl IdentityProvider for StubIdentityProvider {
    fn verify(&self, token: &str) -> Result<AuthIdentity, IdentityError> {
        let subject = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| IdentityError::invalid_token("unknown test token"))?;
        Ok(AuthIdentity {
            subject: AuthSubject::new(subject).map_err(|_| IdentityError::missing_subject())?,
            email: Some(format!("{subject}@example.com")),
            name: None,
        })
    }
}

/// In-memory stores behind a test [`HttpState`].
#[derive(Default)]
pub struct TestPorts {
    pub users: Arc<InMemoryUsers>,
    pub subscriptions: Arc<InMemorySubscriptions>,
    pub assets: Arc<InMemoryAssets>,
    pub entities: Arc<InMemoryEntities>,
    pub insights: Arc<InMemoryInsights>,
    pub plaid_items: Arc<InMemoryPlaidItems>,
    pub plaid_accounts: Arc<InMemoryPlaidAccounts>,
}

impl TestPorts {
    /// Port bundle over the stores with fixture vendor adapters.
    pub fn ports(&self) -> HttpStatePorts {
        HttpStatePorts {
            users: self.users.clone(),
            subscriptions: self.subscriptions.clone(),
            assets: self.assets.clone(),
            entities: self.entities.clone(),
            documents: Arc::new(FixtureDocumentRepository),
            insights: self.insights.clone(),
            plaid_items: self.plaid_items.clone(),
            plaid_accounts: self.plaid_accounts.clone(),
            bank: Arc::new(FixtureBankDataSource),
            plaid_webhooks: Arc::new(FixturePlaidWebhookVerifier),
            cipher: Arc::new(FixtureTokenCipher),
            model: Arc::new(FixtureInsightModel),
            payments: Arc::new(FixturePaymentsGateway),
            blobs: Arc::new(FixtureBlobStore),
            identity: Arc::new(StubIdentityProvider),
            clock: fixture_clock(),
        }
    }

    /// State with the cron secret set to [`CRON_SECRET`].
    pub fn state(&self) -> HttpState {
        HttpState::new(self.ports(), settings())
    }

    /// Create a local user for `subject`.
    pub async fn user(&self, subject: &str) -> User {
        let identity = StubIdentityProvider
            .verify(&session_token(subject))
            .expect("valid test subject");
        self.users
            .upsert_identity(&identity)
            .await
            .expect("in-memory upsert")
    }

    /// Create a local user with a subscription in `status`.
    pub async fn subscriber(&self, subject: &str, status: SubscriptionStatus) -> User {
        let user = self.user(subject).await;
        self.subscriptions
            .upsert(&Subscription {
                user_id: user.id,
                plan: Plan::Principal,
                interval: BillingInterval::Monthly,
                status,
                stripe_customer_id: Some(format!("cus_{subject}")),
                stripe_subscription_id: Some(format!("sub_{subject}")),
                current_period_end: None,
            })
            .await
            .expect("in-memory upsert");
        user
    }
}

/// Settings used by test state.
pub fn settings() -> HttpStateSettings {
    HttpStateSettings {
        app_url: "https://app.test".to_owned(),
        cron_secret: Some(CRON_SECRET.to_owned()),
    }
}

/// Attach a session token for `subject` to `req`.
pub fn as_user(req: actix_test::TestRequest, subject: &str) -> actix_test::TestRequest {
    req.insert_header((AUTHORIZATION, format!("Bearer {}", session_token(subject))))
}

/// Run `req` against the `/api/v1` scope and decode the JSON body.
///
/// Bodies that are not JSON decode to [`Value::Null`].
pub async fn send(state: HttpState, req: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api/v1").configure(api_routes)),
    )
    .await;
    let res = actix_test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body = actix_test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}
