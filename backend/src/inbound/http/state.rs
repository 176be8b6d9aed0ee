//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data<HttpState>`. It holds the domain
//! services wired over port trait objects, so tests can swap any port for an
//! in-memory double or a mock.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AssetRepository, BankDataSource, BlobStore, DocumentRepository, EntityRepository,
    IdentityProvider, InsightModel, InsightRepository, PaymentsGateway, PlaidAccountRepository,
    PlaidItemRepository, PlaidWebhookVerifier, SubscriptionRepository, TokenCipher,
    UserRepository,
};
use crate::domain::{
    AccessGate, AccountService, AssetService, BillingPorts, BillingService, DemoPortfolioSeeder,
    DocumentService, EntityService, InsightPorts, InsightService, PlaidSyncPorts,
    PlaidSyncService, PortfolioService,
};

/// Every port implementation the HTTP surface depends on.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub assets: Arc<dyn AssetRepository>,
    pub entities: Arc<dyn EntityRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub insights: Arc<dyn InsightRepository>,
    pub plaid_items: Arc<dyn PlaidItemRepository>,
    pub plaid_accounts: Arc<dyn PlaidAccountRepository>,
    pub bank: Arc<dyn BankDataSource>,
    pub plaid_webhooks: Arc<dyn PlaidWebhookVerifier>,
    pub cipher: Arc<dyn TokenCipher>,
    pub model: Arc<dyn InsightModel>,
    pub payments: Arc<dyn PaymentsGateway>,
    pub blobs: Arc<dyn BlobStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub clock: Arc<dyn Clock>,
}

/// Deployment values the handlers need besides ports.
#[derive(Debug, Clone, Default)]
pub struct HttpStateSettings {
    /// Public base URL used for checkout and portal redirects.
    pub app_url: String,
    /// Bearer secret for cron endpoints; cron is refused when unset.
    pub cron_secret: Option<String>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityProvider>,
    pub gate: AccessGate,
    pub accounts: AccountService,
    pub assets: AssetService,
    pub entities: EntityService,
    pub documents: DocumentService,
    pub portfolio: PortfolioService,
    pub insights: InsightService,
    pub plaid: PlaidSyncService,
    pub plaid_webhooks: Arc<dyn PlaidWebhookVerifier>,
    pub billing: BillingService,
    pub cron_secret: Option<String>,
}

impl HttpState {
    /// Wire the domain services over `ports`.
    pub fn new(ports: HttpStatePorts, settings: HttpStateSettings) -> Self {
        let HttpStatePorts {
            users,
            subscriptions,
            assets,
            entities,
            documents,
            insights,
            plaid_items,
            plaid_accounts,
            bank,
            plaid_webhooks,
            cipher,
            model,
            payments,
            blobs,
            identity,
            clock,
        } = ports;
        let portfolio = PortfolioService::new(assets.clone(), entities.clone());
        let seeder = DemoPortfolioSeeder::new(
            assets.clone(),
            entities.clone(),
            insights.clone(),
            clock.clone(),
        );
        Self {
            identity,
            gate: AccessGate::new(users.clone(), subscriptions.clone()),
            accounts: AccountService::new(users.clone(), seeder),
            assets: AssetService::new(assets.clone(), entities.clone()),
            entities: EntityService::new(entities.clone(), assets.clone()),
            documents: DocumentService::new(documents, entities, blobs),
            insights: InsightService::new(InsightPorts {
                portfolio: portfolio.clone(),
                insights,
                subscriptions: subscriptions.clone(),
                model,
                clock: clock.clone(),
            }),
            portfolio,
            plaid: PlaidSyncService::new(PlaidSyncPorts {
                items: plaid_items,
                accounts: plaid_accounts,
                assets,
                bank,
                cipher,
                clock: clock.clone(),
            }),
            plaid_webhooks,
            billing: BillingService::new(BillingPorts {
                users,
                subscriptions,
                payments,
                clock,
                app_url: settings.app_url,
            }),
            cron_secret: settings.cron_secret.filter(|secret| !secret.is_empty()),
        }
    }
}
