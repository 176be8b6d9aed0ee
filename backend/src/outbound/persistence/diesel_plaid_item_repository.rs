//! PostgreSQL-backed `PlaidItemRepository` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PlaidItemRepository, RepositoryError};
use crate::domain::{NewPlaidItem, PlaidItem, PlaidItemStatus, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewPlaidItemRow, PlaidItemRelink, PlaidItemRow};
use super::pool::DbPool;
use super::schema::plaid_items;

/// Diesel-backed store of linked institutions.
#[derive(Clone)]
pub struct DieselPlaidItemRepository {
    pool: DbPool,
}

impl DieselPlaidItemRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_items(rows: Vec<PlaidItemRow>) -> Result<Vec<PlaidItem>, RepositoryError> {
    rows.into_iter().map(PlaidItemRow::into_domain).collect()
}

#[async_trait]
impl PlaidItemRepository for DieselPlaidItemRepository {
    async fn upsert(&self, item: &NewPlaidItem) -> Result<PlaidItem, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let active = PlaidItemStatus::Active.as_str();
        let row = NewPlaidItemRow {
            id: Uuid::new_v4(),
            user_id: *item.user_id.as_uuid(),
            plaid_item_id: &item.plaid_item_id,
            access_token_ciphertext: &item.access_token.ciphertext,
            access_token_nonce: &item.access_token.nonce,
            institution_id: item.institution_id.as_deref(),
            institution_name: item.institution_name.as_deref(),
            status: active,
        };
        let relink = PlaidItemRelink {
            access_token_ciphertext: &item.access_token.ciphertext,
            access_token_nonce: &item.access_token.nonce,
            institution_id: item.institution_id.as_deref(),
            institution_name: item.institution_name.as_deref(),
            status: active,
            error_code: None,
        };
        let stored: PlaidItemRow = diesel::insert_into(plaid_items::table)
            .values(&row)
            .on_conflict(plaid_items::plaid_item_id)
            .do_update()
            .set(&relink)
            .returning(PlaidItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        stored.into_domain()
    }

    async fn find_by_plaid_item_id(
        &self,
        plaid_item_id: &str,
    ) -> Result<Option<PlaidItem>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PlaidItemRow> = plaid_items::table
            .filter(plaid_items::plaid_item_id.eq(plaid_item_id))
            .select(PlaidItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PlaidItemRow::into_domain).transpose()
    }

    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PlaidItem>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlaidItemRow> = plaid_items::table
            .filter(plaid_items::user_id.eq(user_id.as_uuid()))
            .filter(plaid_items::status.eq(PlaidItemStatus::Active.as_str()))
            .order(plaid_items::created_at.asc())
            .select(PlaidItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_items(rows)
    }

    async fn list_active(&self) -> Result<Vec<PlaidItem>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlaidItemRow> = plaid_items::table
            .filter(plaid_items::status.eq(PlaidItemStatus::Active.as_str()))
            .order(plaid_items::created_at.asc())
            .select(PlaidItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_items(rows)
    }

    async fn mark_error(&self, item_id: &Uuid, error_code: &str) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(plaid_items::table.find(item_id))
            .set((
                plaid_items::status.eq(PlaidItemStatus::Error.as_str()),
                plaid_items::error_code.eq(error_code),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn mark_synced(
        &self,
        item_id: &Uuid,
        synced_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(plaid_items::table.find(item_id))
            .set(plaid_items::last_synced_at.eq(synced_at))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
