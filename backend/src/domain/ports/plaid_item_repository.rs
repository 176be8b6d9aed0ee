//! Port for linked bank items.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewPlaidItem, PlaidItem, UserId};

use super::RepositoryError;

/// Reads and writes linked items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaidItemRepository: Send + Sync {
    /// Insert an item, or refresh token and institution and reactivate it
    /// when the aggregator item id is already known.
    async fn upsert(&self, item: &NewPlaidItem) -> Result<PlaidItem, RepositoryError>;

    /// Item by aggregator item id.
    async fn find_by_plaid_item_id(
        &self,
        plaid_item_id: &str,
    ) -> Result<Option<PlaidItem>, RepositoryError>;

    /// Active items for one user.
    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PlaidItem>, RepositoryError>;

    /// Active items across all users.
    async fn list_active(&self) -> Result<Vec<PlaidItem>, RepositoryError>;

    /// Flag an item as failed with a provider error code.
    async fn mark_error(&self, item_id: &Uuid, error_code: &str) -> Result<(), RepositoryError>;

    /// Record a successful sync.
    async fn mark_synced(
        &self,
        item_id: &Uuid,
        synced_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Fixture implementation with no linked items.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePlaidItemRepository;

#[async_trait]
impl PlaidItemRepository for FixturePlaidItemRepository {
    async fn upsert(&self, _item: &NewPlaidItem) -> Result<PlaidItem, RepositoryError> {
        Err(RepositoryError::connection("no database configured"))
    }

    async fn find_by_plaid_item_id(
        &self,
        _plaid_item_id: &str,
    ) -> Result<Option<PlaidItem>, RepositoryError> {
        Ok(None)
    }

    async fn list_active_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<PlaidItem>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn list_active(&self) -> Result<Vec<PlaidItem>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn mark_error(&self, _item_id: &Uuid, _error_code: &str) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn mark_synced(
        &self,
        _item_id: &Uuid,
        _synced_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }
}
