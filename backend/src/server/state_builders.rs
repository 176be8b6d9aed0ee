//! Builders for HTTP state ports.
//!
//! Repositories are Diesel-backed when a pool is configured and fixtures
//! otherwise. Each vendor adapter is built only when its credentials are
//! present; a missing credential logs a warning and keeps the fixture.

use std::path::Path;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::warn;

use patrimony::domain::ports::{
    BankDataSource, BlobStore, FixtureAssetRepository, FixtureBankDataSource, FixtureBlobStore,
    FixtureDocumentRepository, FixtureEntityRepository, FixtureIdentityProvider,
    FixtureInsightModel, FixtureInsightRepository, FixturePaymentsGateway,
    FixturePlaidAccountRepository, FixturePlaidItemRepository, FixturePlaidWebhookVerifier,
    FixtureSubscriptionRepository, FixtureTokenCipher, FixtureUserRepository, IdentityProvider,
    InsightModel, PaymentsGateway, PlaidWebhookVerifier, TokenCipher,
};
use patrimony::inbound::http::state::{HttpState, HttpStatePorts, HttpStateSettings};
use patrimony::outbound::anthropic::{AnthropicConfig, AnthropicInsightModel};
use patrimony::outbound::blob::HttpBlobStore;
use patrimony::outbound::crypto::AesGcmTokenCipher;
use patrimony::outbound::identity::JwtIdentityProvider;
use patrimony::outbound::persistence::{
    DbPool, DieselAssetRepository, DieselDocumentRepository, DieselEntityRepository,
    DieselInsightRepository, DieselPlaidAccountRepository, DieselPlaidItemRepository,
    DieselSubscriptionRepository, DieselUserRepository,
};
use patrimony::outbound::plaid::{PlaidCredentials, PlaidHttpClient, PlaidJwtWebhookVerifier};
use patrimony::outbound::stripe::{DEFAULT_STRIPE_BASE_URL, StripeConfig, StripeHttpGateway};
use patrimony::settings::AppSettings;

use super::ServerConfig;

fn startup_error(what: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{what}: {err}"))
}

/// Aggregator client and webhook verifier sharing one set of credentials.
fn build_plaid(
    settings: &AppSettings,
    clock: &Arc<dyn Clock>,
) -> std::io::Result<(Arc<dyn BankDataSource>, Arc<dyn PlaidWebhookVerifier>)> {
    let Some((client_id, secret)) = settings.plaid_credentials() else {
        warn!("Plaid credentials missing; bank linking uses fixtures");
        return Ok((
            Arc::new(FixtureBankDataSource),
            Arc::new(FixturePlaidWebhookVerifier),
        ));
    };
    let credentials = PlaidCredentials {
        client_id: client_id.to_owned(),
        secret: secret.to_owned(),
        environment: settings
            .plaid_env()
            .parse()
            .map_err(|err: String| startup_error("Plaid environment", err))?,
        webhook_url: settings.plaid_webhook_url().map(str::to_owned),
    };
    let client = PlaidHttpClient::new(credentials, settings.http_timeout())
        .map_err(|err| startup_error("Plaid client", err))?;
    Ok((
        Arc::new(client.clone()),
        Arc::new(PlaidJwtWebhookVerifier::new(client, clock.clone())),
    ))
}

fn build_cipher(settings: &AppSettings) -> std::io::Result<Arc<dyn TokenCipher>> {
    match settings.plaid_encryption_key() {
        Some(key) => Ok(Arc::new(
            AesGcmTokenCipher::from_hex(key)
                .map_err(|err| startup_error("Plaid encryption key", err))?,
        )),
        None => {
            warn!("Plaid encryption key missing; access tokens cannot be stored");
            Ok(Arc::new(FixtureTokenCipher))
        }
    }
}

fn build_model(settings: &AppSettings) -> std::io::Result<Arc<dyn InsightModel>> {
    let Some(api_key) = settings.anthropic_api_key() else {
        warn!("Anthropic API key missing; insight generation returns nothing");
        return Ok(Arc::new(FixtureInsightModel));
    };
    let mut config = AnthropicConfig::new(api_key);
    if let Some(base_url) = settings.anthropic_base_url.clone() {
        config.base_url = base_url;
    }
    if let Some(model) = settings.anthropic_model.clone() {
        config.model = model;
    }
    if let Some(max_tokens) = settings.anthropic_max_tokens {
        config.max_tokens = max_tokens;
    }
    let model = AnthropicInsightModel::new(config, settings.http_timeout())
        .map_err(|err| startup_error("Anthropic client", err))?;
    Ok(Arc::new(model))
}

fn build_payments(settings: &AppSettings) -> std::io::Result<Arc<dyn PaymentsGateway>> {
    let Some((secret_key, webhook_secret)) = settings.stripe_credentials() else {
        warn!("Stripe credentials missing; checkout is unavailable");
        return Ok(Arc::new(FixturePaymentsGateway));
    };
    let config = StripeConfig {
        secret_key: secret_key.to_owned(),
        webhook_secret: webhook_secret.to_owned(),
        base_url: settings
            .stripe_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_STRIPE_BASE_URL.to_owned()),
    };
    let gateway = StripeHttpGateway::new(config, settings.http_timeout())
        .map_err(|err| startup_error("Stripe client", err))?;
    Ok(Arc::new(gateway))
}

fn build_blobs(settings: &AppSettings) -> std::io::Result<Arc<dyn BlobStore>> {
    let Some((base_url, token)) = settings.blob_store() else {
        warn!("blob store not configured; document uploads are unavailable");
        return Ok(Arc::new(FixtureBlobStore));
    };
    let store = HttpBlobStore::new(base_url, token, settings.http_timeout())
        .map_err(|err| startup_error("blob store client", err))?;
    Ok(Arc::new(store))
}

fn build_identity(settings: &AppSettings) -> std::io::Result<Arc<dyn IdentityProvider>> {
    let Some(path) = settings.identity_public_key_path.as_deref() else {
        warn!("identity public key missing; every session is rejected");
        return Ok(Arc::new(FixtureIdentityProvider));
    };
    Ok(Arc::new(load_identity_key(path)?))
}

fn load_identity_key(path: &Path) -> std::io::Result<JwtIdentityProvider> {
    let pem = std::fs::read(path)
        .map_err(|err| startup_error(&format!("reading {}", path.display()), err))?;
    JwtIdentityProvider::from_rsa_pem(&pem).map_err(|err| startup_error("identity public key", err))
}

/// Select every port implementation for `pool` and `settings`.
pub(super) fn build_ports(
    pool: Option<&DbPool>,
    settings: &AppSettings,
) -> std::io::Result<HttpStatePorts> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let (bank, plaid_webhooks) = build_plaid(settings, &clock)?;
    let cipher = build_cipher(settings)?;
    let model = build_model(settings)?;
    let payments = build_payments(settings)?;
    let blobs = build_blobs(settings)?;
    let identity = build_identity(settings)?;

    let ports = match pool {
        Some(pool) => HttpStatePorts {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            subscriptions: Arc::new(DieselSubscriptionRepository::new(pool.clone())),
            assets: Arc::new(DieselAssetRepository::new(pool.clone())),
            entities: Arc::new(DieselEntityRepository::new(pool.clone())),
            documents: Arc::new(DieselDocumentRepository::new(pool.clone())),
            insights: Arc::new(DieselInsightRepository::new(pool.clone())),
            plaid_items: Arc::new(DieselPlaidItemRepository::new(pool.clone())),
            plaid_accounts: Arc::new(DieselPlaidAccountRepository::new(pool.clone())),
            bank,
            plaid_webhooks,
            cipher,
            model,
            payments,
            blobs,
            identity,
            clock,
        },
        None => HttpStatePorts {
            users: Arc::new(FixtureUserRepository),
            subscriptions: Arc::new(FixtureSubscriptionRepository),
            assets: Arc::new(FixtureAssetRepository),
            entities: Arc::new(FixtureEntityRepository),
            documents: Arc::new(FixtureDocumentRepository),
            insights: Arc::new(FixtureInsightRepository),
            plaid_items: Arc::new(FixturePlaidItemRepository),
            plaid_accounts: Arc::new(FixturePlaidAccountRepository),
            bank,
            plaid_webhooks,
            cipher,
            model,
            payments,
            blobs,
            identity,
            clock,
        },
    };
    Ok(ports)
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let ports = build_ports(config.db_pool.as_ref(), &config.settings)?;
    let app_url = config
        .settings
        .app_url()
        .map_err(|err| startup_error("app URL", err))?;
    let settings = HttpStateSettings {
        app_url: app_url.as_str().to_owned(),
        cron_secret: config.settings.cron_secret().map(str::to_owned),
    };
    Ok(web::Data::new(HttpState::new(ports, settings)))
}

#[cfg(test)]
mod tests {
    //! Port selection from configuration.

    use super::*;
    use rstest::rstest;

    const KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[rstest]
    fn unconfigured_vendors_fall_back_to_fixtures() {
        let ports = build_ports(None, &AppSettings::default()).expect("fixtures always build");
        assert!(ports.cipher.seal("access-sandbox-1").is_err());
        assert!(ports.identity.verify("any-token").is_err());
    }

    #[rstest]
    fn configured_key_seals_tokens() {
        let settings = AppSettings {
            plaid_encryption_key: Some(KEY_HEX.to_owned()),
            ..AppSettings::default()
        };
        let ports = build_ports(None, &settings).expect("ports build");
        let sealed = ports.cipher.seal("access-sandbox-1").expect("sealing works");
        assert_eq!(
            ports.cipher.open(&sealed).expect("opening works"),
            "access-sandbox-1"
        );
    }

    #[rstest]
    #[case(AppSettings { plaid_encryption_key: Some("abc".to_owned()), ..AppSettings::default() })]
    #[case(AppSettings {
        plaid_client_id: Some("client".to_owned()),
        plaid_secret: Some("secret".to_owned()),
        plaid_env: Some("staging".to_owned()),
        ..AppSettings::default()
    })]
    #[case(AppSettings {
        identity_public_key_path: Some("/nonexistent/identity.pem".into()),
        ..AppSettings::default()
    })]
    fn malformed_settings_stop_startup(#[case] settings: AppSettings) {
        assert!(build_ports(None, &settings).is_err());
    }
}
