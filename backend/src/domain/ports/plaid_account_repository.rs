//! Port for bank accounts mirrored from linked items.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{PlaidAccount, PlaidAccountRecord};

use super::RepositoryError;

/// Reads and writes mirrored accounts, keyed by aggregator account id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaidAccountRepository: Send + Sync {
    /// Insert or refresh the account row for `record.plaid_account_id`.
    async fn upsert(
        &self,
        item_id: &Uuid,
        record: &PlaidAccountRecord,
        synced_at: DateTime<Utc>,
    ) -> Result<PlaidAccount, RepositoryError>;

    /// Accounts under one item.
    async fn list_for_item(&self, item_id: &Uuid) -> Result<Vec<PlaidAccount>, RepositoryError>;
}

/// Fixture implementation that echoes upserts without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePlaidAccountRepository;

#[async_trait]
impl PlaidAccountRepository for FixturePlaidAccountRepository {
    async fn upsert(
        &self,
        item_id: &Uuid,
        record: &PlaidAccountRecord,
        synced_at: DateTime<Utc>,
    ) -> Result<PlaidAccount, RepositoryError> {
        Ok(PlaidAccount {
            id: Uuid::new_v4(),
            item_id: *item_id,
            record: record.clone(),
            last_synced_at: synced_at,
        })
    }

    async fn list_for_item(&self, _item_id: &Uuid) -> Result<Vec<PlaidAccount>, RepositoryError> {
        Ok(Vec::new())
    }
}
