//! PostgreSQL-backed `InsightRepository` implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{InsightRepository, RepositoryError};
use crate::domain::{Insight, NewInsight, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{InsightRow, NewInsightRow};
use super::pool::DbPool;
use super::schema::insights;

/// Diesel-backed insight store.
#[derive(Clone)]
pub struct DieselInsightRepository {
    pool: DbPool,
}

impl DieselInsightRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InsightRepository for DieselInsightRepository {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Insight>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InsightRow> = insights::table
            .filter(insights::user_id.eq(user_id.as_uuid()))
            .order(insights::created_at.desc())
            .select(InsightRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(InsightRow::into_domain).collect()
    }

    async fn insert(
        &self,
        user_id: &UserId,
        insight: &NewInsight,
        created_at: DateTime<Utc>,
    ) -> Result<Insight, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewInsightRow {
            id: Uuid::new_v4(),
            user_id: *user_id.as_uuid(),
            title: &insight.title,
            description: &insight.description,
            category: insight.category.as_str(),
            priority: insight.priority.as_str(),
            actionable: insight.actionable,
            created_at,
        };
        let stored: InsightRow = diesel::insert_into(insights::table)
            .values(&row)
            .returning(InsightRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        stored.into_domain()
    }

    async fn delete_created_before(
        &self,
        user_id: &UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(
            insights::table
                .filter(insights::user_id.eq(user_id.as_uuid()))
                .filter(insights::created_at.lt(cutoff)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(deleted as u64)
    }
}
