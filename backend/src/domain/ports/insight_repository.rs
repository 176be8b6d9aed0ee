//! Port for insight persistence and retention.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Insight, NewInsight, UserId};

use super::RepositoryError;

/// Reads and writes insights.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InsightRepository: Send + Sync {
    /// Insights for a user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Insight>, RepositoryError>;

    /// Insert one insight stamped with `created_at`.
    async fn insert(
        &self,
        user_id: &UserId,
        insight: &NewInsight,
        created_at: DateTime<Utc>,
    ) -> Result<Insight, RepositoryError>;

    /// Delete the user's insights created strictly before `cutoff`.
    async fn delete_created_before(
        &self,
        user_id: &UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;
}

/// Fixture implementation holding no insights.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureInsightRepository;

#[async_trait]
impl InsightRepository for FixtureInsightRepository {
    async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Insight>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn insert(
        &self,
        _user_id: &UserId,
        _insight: &NewInsight,
        _created_at: DateTime<Utc>,
    ) -> Result<Insight, RepositoryError> {
        Err(RepositoryError::connection("no database configured"))
    }

    async fn delete_created_before(
        &self,
        _user_id: &UserId,
        _cutoff: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        Ok(0)
    }
}
