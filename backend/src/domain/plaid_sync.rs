//! Bank-account reconciliation: link items, mirror their accounts and keep
//! the derived assets in step.
//!
//! Reconciliation is keyed on the aggregator's account id at both levels, so
//! replaying a sync against unchanged upstream data rewrites the same rows
//! instead of adding new ones.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::ports::{
    AssetRepository, BankDataError, BankDataSource, PlaidAccountRepository, PlaidItemRepository,
    TokenCipher, TokenCipherError,
};
use super::{
    AssetSource, AssetUpdate, Cents, DEFAULT_ITEM_ERROR_CODE, Error, FALLBACK_ISO_CURRENCY,
    LinkedInstitution, NewAsset, NewPlaidItem, PlaidAccountRecord, PlaidItem, PlaidWebhook,
    SyncReport, UpstreamAccount, UserId,
};

/// Webhook types that trigger a resync of the item.
const SYNC_WEBHOOK_TYPES: [&str; 3] = ["HOLDINGS", "TRANSACTIONS", "INVESTMENTS_TRANSACTIONS"];

/// What a webhook delivery led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// No item id, or the item is unknown.
    Ignored,
    /// The item was flagged as failed.
    MarkedError,
    /// The item was resynced.
    Synced,
    /// A resync was attempted and failed.
    SyncFailed,
    /// Known item, but nothing to do for this webhook type.
    Acknowledged,
}

/// Ports used by [`PlaidSyncService`].
pub struct PlaidSyncPorts {
    pub items: Arc<dyn PlaidItemRepository>,
    pub accounts: Arc<dyn PlaidAccountRepository>,
    pub assets: Arc<dyn AssetRepository>,
    pub bank: Arc<dyn BankDataSource>,
    pub cipher: Arc<dyn TokenCipher>,
    pub clock: Arc<dyn Clock>,
}

/// Links bank items and reconciles their accounts into assets.
#[derive(Clone)]
pub struct PlaidSyncService {
    items: Arc<dyn PlaidItemRepository>,
    accounts: Arc<dyn PlaidAccountRepository>,
    assets: Arc<dyn AssetRepository>,
    bank: Arc<dyn BankDataSource>,
    cipher: Arc<dyn TokenCipher>,
    clock: Arc<dyn Clock>,
}

fn map_bank_error(err: BankDataError) -> Error {
    match err {
        BankDataError::Transport { message } => {
            Error::service_unavailable(format!("bank data provider unavailable: {message}"))
        }
        other => Error::internal(other.to_string()),
    }
}

fn map_cipher_error(err: TokenCipherError) -> Error {
    Error::internal(err.to_string())
}

fn account_record(account: UpstreamAccount) -> Result<PlaidAccountRecord, Error> {
    let to_cents = |dollars: Option<f64>| {
        Cents::from_optional_dollars(dollars).map_err(|err| {
            Error::internal(format!(
                "balance for account {} unusable: {err}",
                account.account_id
            ))
        })
    };
    let current_balance = to_cents(account.balances.current)?;
    let available_balance = to_cents(account.balances.available)?;
    Ok(PlaidAccountRecord {
        plaid_account_id: account.account_id,
        name: account.name,
        official_name: account.official_name.filter(|name| !name.is_empty()),
        account_type: account.account_type,
        subtype: account.subtype,
        mask: account.mask,
        current_balance,
        available_balance,
        iso_currency_code: account
            .balances
            .iso_currency_code
            .unwrap_or_else(|| FALLBACK_ISO_CURRENCY.to_owned()),
    })
}

impl PlaidSyncService {
    /// Build the service from its ports.
    pub fn new(ports: PlaidSyncPorts) -> Self {
        let PlaidSyncPorts {
            items,
            accounts,
            assets,
            bank,
            cipher,
            clock,
        } = ports;
        Self {
            items,
            accounts,
            assets,
            bank,
            cipher,
            clock,
        }
    }

    /// Token that opens the client-side link flow for `user_id`.
    pub async fn create_link_token(&self, user_id: &UserId) -> Result<String, Error> {
        self.bank
            .create_link_token(user_id)
            .await
            .map_err(map_bank_error)
    }

    /// Exchange a public token, store the sealed credential and sync it.
    pub async fn link_item(
        &self,
        user_id: &UserId,
        public_token: &str,
        institution: LinkedInstitution,
    ) -> Result<PlaidItem, Error> {
        if public_token.trim().is_empty() {
            return Err(Error::invalid_request("Public token is required"));
        }
        let exchanged = self
            .bank
            .exchange_public_token(public_token)
            .await
            .map_err(map_bank_error)?;
        let access_token = self
            .cipher
            .seal(&exchanged.access_token)
            .map_err(map_cipher_error)?;
        let item = self
            .items
            .upsert(&NewPlaidItem {
                user_id: *user_id,
                plaid_item_id: exchanged.item_id,
                access_token,
                institution_id: institution.id,
                institution_name: institution.name,
            })
            .await?;
        info!(item_id = %item.id, %user_id, "linked bank item");
        self.sync_item(&item).await?;
        Ok(item)
    }

    /// Mirror every account of `item` and reconcile its derived asset.
    ///
    /// Returns the number of accounts processed.
    pub async fn sync_item(&self, item: &PlaidItem) -> Result<usize, Error> {
        let access_token = self
            .cipher
            .open(&item.access_token)
            .map_err(map_cipher_error)?;
        let upstream = self
            .bank
            .fetch_accounts(&access_token)
            .await
            .map_err(map_bank_error)?;
        let synced_at = self.clock.utc();
        let count = upstream.len();

        for account in upstream {
            let record = account_record(account)?;
            self.accounts.upsert(&item.id, &record, synced_at).await?;
            self.reconcile_asset(item, &record).await?;
        }

        self.items.mark_synced(&item.id, synced_at).await?;
        debug!(item_id = %item.id, accounts = count, "synced bank item");
        Ok(count)
    }

    async fn reconcile_asset(
        &self,
        item: &PlaidItem,
        record: &PlaidAccountRecord,
    ) -> Result<(), Error> {
        let existing = self
            .assets
            .find_by_plaid_account(&item.user_id, &record.plaid_account_id)
            .await?;
        match existing {
            Some(asset) => {
                let update = AssetUpdate {
                    name: Some(record.asset_name().to_owned()),
                    value: Some(record.asset_value()),
                    institution: item.institution_name.clone(),
                    account_mask: record.mask.clone(),
                    ..AssetUpdate::default()
                };
                self.assets.update(&item.user_id, &asset.id, &update).await?;
            }
            None => {
                let asset = NewAsset {
                    currency: record.iso_currency_code.clone(),
                    institution: item.institution_name.clone(),
                    account_mask: record.mask.clone(),
                    source: AssetSource::Plaid,
                    plaid_account_id: Some(record.plaid_account_id.clone()),
                    ..NewAsset::manual(
                        item.user_id,
                        record.asset_name().to_owned(),
                        record.asset_category(),
                        record.asset_value(),
                    )
                };
                self.assets.insert(&asset).await?;
            }
        }
        Ok(())
    }

    /// Sync each of `items` in turn; failures flag the item and the batch
    /// moves on.
    async fn sync_batch(&self, items: Vec<PlaidItem>) -> SyncReport {
        let mut report = SyncReport {
            total: items.len(),
            ..SyncReport::default()
        };
        for item in &items {
            match self.sync_item(item).await {
                Ok(_) => report.synced += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(item_id = %item.id, error = %err, "bank item sync failed");
                    if let Err(mark_err) = self.items.mark_error(&item.id, err.message()).await {
                        warn!(item_id = %item.id, error = %mark_err, "could not flag failed item");
                    }
                }
            }
        }
        report
    }

    /// Sync all active items belonging to `user_id`.
    pub async fn sync_user_items(&self, user_id: &UserId) -> Result<SyncReport, Error> {
        let items = self.items.list_active_for_user(user_id).await?;
        Ok(self.sync_batch(items).await)
    }

    /// Sync every active item across all users.
    pub async fn sync_all_active(&self) -> Result<SyncReport, Error> {
        let items = self.items.list_active().await?;
        let report = self.sync_batch(items).await;
        info!(
            synced = report.synced,
            failed = report.failed,
            total = report.total,
            "bank sync batch finished"
        );
        Ok(report)
    }

    /// Route a verified aggregator webhook.
    pub async fn handle_webhook(&self, webhook: &PlaidWebhook) -> Result<WebhookOutcome, Error> {
        let Some(plaid_item_id) = webhook.item_id.as_deref() else {
            return Ok(WebhookOutcome::Ignored);
        };
        let Some(item) = self.items.find_by_plaid_item_id(plaid_item_id).await? else {
            debug!(%plaid_item_id, "webhook for unknown item");
            return Ok(WebhookOutcome::Ignored);
        };

        if webhook.webhook_type == "ITEM" && webhook.webhook_code == "ERROR" {
            let code = webhook
                .error
                .as_ref()
                .and_then(|error| error.error_code.as_deref())
                .unwrap_or(DEFAULT_ITEM_ERROR_CODE);
            self.items.mark_error(&item.id, code).await?;
            warn!(item_id = %item.id, error_code = code, "bank item reported an error");
            return Ok(WebhookOutcome::MarkedError);
        }

        if SYNC_WEBHOOK_TYPES.contains(&webhook.webhook_type.as_str()) {
            return match self.sync_item(&item).await {
                Ok(_) => Ok(WebhookOutcome::Synced),
                Err(err) => {
                    warn!(item_id = %item.id, error = %err, "webhook-triggered sync failed");
                    Ok(WebhookOutcome::SyncFailed)
                }
            };
        }

        Ok(WebhookOutcome::Acknowledged)
    }
}

#[cfg(test)]
#[path = "plaid_sync_tests.rs"]
mod tests;
