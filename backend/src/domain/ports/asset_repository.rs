//! Port for asset persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Asset, AssetSource, AssetUpdate, NewAsset, UserId};

use super::RepositoryError;

/// Reads and writes assets. Every call is scoped to one owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Assets for a user ordered by value, largest first, with entity names
    /// joined in.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Asset>, RepositoryError>;

    /// Asset derived from a bank account.
    async fn find_by_plaid_account(
        &self,
        user_id: &UserId,
        plaid_account_id: &str,
    ) -> Result<Option<Asset>, RepositoryError>;

    /// Insert a new asset.
    async fn insert(&self, asset: &NewAsset) -> Result<Asset, RepositoryError>;

    /// Apply `update` to the user's asset. `None` when no such asset exists.
    async fn update(
        &self,
        user_id: &UserId,
        asset_id: &Uuid,
        update: &AssetUpdate,
    ) -> Result<Option<Asset>, RepositoryError>;

    /// Delete the user's asset. Returns whether a row was removed.
    async fn delete(&self, user_id: &UserId, asset_id: &Uuid) -> Result<bool, RepositoryError>;

    /// Delete every asset of a given provenance, returning the count.
    async fn delete_by_source(
        &self,
        user_id: &UserId,
        source: AssetSource,
    ) -> Result<u64, RepositoryError>;

    /// Number of assets the user holds.
    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError>;
}

/// Fixture implementation holding no assets.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssetRepository;

#[async_trait]
impl AssetRepository for FixtureAssetRepository {
    async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Asset>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_plaid_account(
        &self,
        _user_id: &UserId,
        _plaid_account_id: &str,
    ) -> Result<Option<Asset>, RepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _asset: &NewAsset) -> Result<Asset, RepositoryError> {
        Err(RepositoryError::connection("no database configured"))
    }

    async fn update(
        &self,
        _user_id: &UserId,
        _asset_id: &Uuid,
        _update: &AssetUpdate,
    ) -> Result<Option<Asset>, RepositoryError> {
        Ok(None)
    }

    async fn delete(&self, _user_id: &UserId, _asset_id: &Uuid) -> Result<bool, RepositoryError> {
        Ok(false)
    }

    async fn delete_by_source(
        &self,
        _user_id: &UserId,
        _source: AssetSource,
    ) -> Result<u64, RepositoryError> {
        Ok(0)
    }

    async fn count_for_user(&self, _user_id: &UserId) -> Result<u64, RepositoryError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetCategory, Cents};

    #[tokio::test]
    async fn fixture_insert_reports_missing_database() {
        let asset = NewAsset::manual(
            UserId::random(),
            "Cash".to_owned(),
            AssetCategory::Cash,
            Cents::new(100),
        );
        let err = FixtureAssetRepository
            .insert(&asset)
            .await
            .expect_err("fixture cannot store");
        assert!(matches!(err, RepositoryError::Connection { .. }));
    }
}
