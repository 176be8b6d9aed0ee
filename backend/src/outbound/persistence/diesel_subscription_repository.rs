//! PostgreSQL-backed `SubscriptionRepository` implementation.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, SubscriptionRepository};
use crate::domain::{Subscription, SubscriptionStatus, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{SubscriptionRow, SubscriptionWrite};
use super::pool::DbPool;
use super::schema::subscriptions;

/// Statuses that grant access, as stored.
const ENTITLED_STATUSES: [&str; 2] = [
    SubscriptionStatus::Active.as_str(),
    SubscriptionStatus::Trialing.as_str(),
];

/// Diesel-backed subscription store; one row per user.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn find_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SubscriptionRow> = subscriptions::table
            .find(user_id.as_uuid())
            .select(SubscriptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(SubscriptionRow::into_domain).transpose()
    }

    async fn find_by_stripe_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SubscriptionRow> = subscriptions::table
            .filter(subscriptions::stripe_subscription_id.eq(stripe_subscription_id))
            .select(SubscriptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(SubscriptionRow::into_domain).transpose()
    }

    async fn upsert(&self, subscription: &Subscription) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let write = SubscriptionWrite {
            user_id: *subscription.user_id.as_uuid(),
            plan: subscription.plan.as_str(),
            billing_interval: subscription.interval.as_str(),
            status: subscription.status.as_str(),
            stripe_customer_id: subscription.stripe_customer_id.as_deref(),
            stripe_subscription_id: subscription.stripe_subscription_id.as_deref(),
            current_period_end: subscription.current_period_end,
            updated_at: Utc::now(),
        };
        diesel::insert_into(subscriptions::table)
            .values(&write)
            .on_conflict(subscriptions::user_id)
            .do_update()
            .set(&write)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_entitled_user_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<Uuid> = subscriptions::table
            .filter(subscriptions::status.eq_any(ENTITLED_STATUSES))
            .select(subscriptions::user_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}
