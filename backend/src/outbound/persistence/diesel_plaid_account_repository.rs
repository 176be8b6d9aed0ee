//! PostgreSQL-backed `PlaidAccountRepository` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{PlaidAccountRepository, RepositoryError};
use crate::domain::{PlaidAccount, PlaidAccountRecord};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewPlaidAccountRow, PlaidAccountRefresh, PlaidAccountRow};
use super::pool::DbPool;
use super::schema::plaid_accounts;

/// Diesel-backed account store keyed by the aggregator's account id.
#[derive(Clone)]
pub struct DieselPlaidAccountRepository {
    pool: DbPool,
}

impl DieselPlaidAccountRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaidAccountRepository for DieselPlaidAccountRepository {
    async fn upsert(
        &self,
        item_id: &Uuid,
        record: &PlaidAccountRecord,
        synced_at: DateTime<Utc>,
    ) -> Result<PlaidAccount, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let current = record.current_balance.map(|cents| cents.get());
        let available = record.available_balance.map(|cents| cents.get());
        let row = NewPlaidAccountRow {
            id: Uuid::new_v4(),
            item_id: *item_id,
            plaid_account_id: &record.plaid_account_id,
            name: &record.name,
            official_name: record.official_name.as_deref(),
            account_type: &record.account_type,
            subtype: record.subtype.as_deref(),
            mask: record.mask.as_deref(),
            current_balance_cents: current,
            available_balance_cents: available,
            iso_currency_code: &record.iso_currency_code,
            last_synced_at: synced_at,
        };
        let refresh = PlaidAccountRefresh {
            name: &record.name,
            official_name: record.official_name.as_deref(),
            current_balance_cents: current,
            available_balance_cents: available,
            iso_currency_code: &record.iso_currency_code,
            last_synced_at: synced_at,
        };
        let stored: PlaidAccountRow = diesel::insert_into(plaid_accounts::table)
            .values(&row)
            .on_conflict(plaid_accounts::plaid_account_id)
            .do_update()
            .set(&refresh)
            .returning(PlaidAccountRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(stored.into())
    }

    async fn list_for_item(&self, item_id: &Uuid) -> Result<Vec<PlaidAccount>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlaidAccountRow> = plaid_accounts::table
            .filter(plaid_accounts::item_id.eq(item_id))
            .order(plaid_accounts::name.asc())
            .select(PlaidAccountRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(PlaidAccount::from).collect())
    }
}
