//! PostgreSQL-backed `AssetRepository` implementation.
//!
//! Reads left-join `entities` so every asset carries its owner's name.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AssetRepository, RepositoryError};
use crate::domain::{Asset, AssetSource, AssetUpdate, NewAsset, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{AssetChangeset, AssetRow, NewAssetRow};
use super::pool::DbPool;
use super::schema::{assets, entities};

type AssetWithEntity = (AssetRow, Option<String>);

fn into_domain(rows: Vec<AssetWithEntity>) -> Result<Vec<Asset>, RepositoryError> {
    rows.into_iter()
        .map(|(row, entity_name)| row.into_domain(entity_name))
        .collect()
}

/// Diesel-backed asset store.
#[derive(Clone)]
pub struct DieselAssetRepository {
    pool: DbPool,
}

impl DieselAssetRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
        asset_id: &Uuid,
    ) -> Result<Option<Asset>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AssetWithEntity> = assets::table
            .left_join(entities::table)
            .filter(assets::user_id.eq(user_id.as_uuid()))
            .filter(assets::id.eq(asset_id))
            .select((AssetRow::as_select(), entities::name.nullable()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(row, entity_name)| row.into_domain(entity_name))
            .transpose()
    }
}

#[async_trait]
impl AssetRepository for DieselAssetRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Asset>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AssetWithEntity> = assets::table
            .left_join(entities::table)
            .filter(assets::user_id.eq(user_id.as_uuid()))
            .order(assets::value_cents.desc())
            .select((AssetRow::as_select(), entities::name.nullable()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_domain(rows)
    }

    async fn find_by_plaid_account(
        &self,
        user_id: &UserId,
        plaid_account_id: &str,
    ) -> Result<Option<Asset>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AssetWithEntity> = assets::table
            .left_join(entities::table)
            .filter(assets::user_id.eq(user_id.as_uuid()))
            .filter(assets::plaid_account_id.eq(plaid_account_id))
            .select((AssetRow::as_select(), entities::name.nullable()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(row, entity_name)| row.into_domain(entity_name))
            .transpose()
    }

    async fn insert(&self, asset: &NewAsset) -> Result<Asset, RepositoryError> {
        let id = Uuid::new_v4();
        {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let row = NewAssetRow {
                id,
                user_id: *asset.user_id.as_uuid(),
                entity_id: asset.entity_id,
                name: &asset.name,
                category: asset.category.as_str(),
                value_cents: asset.value.get(),
                currency: &asset.currency,
                change_24h: asset.change_24h,
                change_30d: asset.change_30d,
                institution: asset.institution.as_deref(),
                account_mask: asset.account_mask.as_deref(),
                notes: asset.notes.as_deref(),
                source: asset.source.as_str(),
                plaid_account_id: asset.plaid_account_id.as_deref(),
            };
            diesel::insert_into(assets::table)
                .values(&row)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        }
        self.find_by_id(&asset.user_id, &id)
            .await?
            .ok_or_else(|| RepositoryError::query("inserted asset not readable"))
    }

    async fn update(
        &self,
        user_id: &UserId,
        asset_id: &Uuid,
        update: &AssetUpdate,
    ) -> Result<Option<Asset>, RepositoryError> {
        let updated = {
            let mut conn = self.pool.get().await.map_err(map_pool_error)?;
            let changes = AssetChangeset {
                name: update.name.as_deref(),
                category: update.category.map(|category| category.as_str()),
                value_cents: update.value.map(|value| value.get()),
                entity_id: update.entity_id,
                institution: update.institution.as_deref(),
                account_mask: update.account_mask.as_deref(),
                notes: update.notes.as_deref(),
                updated_at: Utc::now(),
            };
            diesel::update(
                assets::table
                    .filter(assets::user_id.eq(user_id.as_uuid()))
                    .filter(assets::id.eq(asset_id)),
            )
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?
        };
        if updated == 0 {
            return Ok(None);
        }
        self.find_by_id(user_id, asset_id).await
    }

    async fn delete(&self, user_id: &UserId, asset_id: &Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            assets::table
                .filter(assets::user_id.eq(user_id.as_uuid()))
                .filter(assets::id.eq(asset_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn delete_by_source(
        &self,
        user_id: &UserId,
        source: AssetSource,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            assets::table
                .filter(assets::user_id.eq(user_id.as_uuid()))
                .filter(assets::source.eq(source.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted as u64)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = assets::table
            .filter(assets::user_id.eq(user_id.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}
