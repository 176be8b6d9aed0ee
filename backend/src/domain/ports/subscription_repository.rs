//! Port for subscription rows kept in sync with the payment provider.

use async_trait::async_trait;

use crate::domain::{Subscription, UserId};

use super::RepositoryError;

/// Reads and writes the one-per-user subscription row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Subscription for a user, if any.
    async fn find_for_user(&self, user_id: &UserId)
    -> Result<Option<Subscription>, RepositoryError>;

    /// Subscription carrying a provider subscription id.
    async fn find_by_stripe_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, RepositoryError>;

    /// Insert or replace the row keyed by `subscription.user_id`.
    async fn upsert(&self, subscription: &Subscription) -> Result<(), RepositoryError>;

    /// Users whose subscription is active or trialing.
    async fn list_entitled_user_ids(&self) -> Result<Vec<UserId>, RepositoryError>;
}

/// Fixture implementation that holds no subscriptions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSubscriptionRepository;

#[async_trait]
impl SubscriptionRepository for FixtureSubscriptionRepository {
    async fn find_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(None)
    }

    async fn find_by_stripe_subscription(
        &self,
        _stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(None)
    }

    async fn upsert(&self, _subscription: &Subscription) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn list_entitled_user_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        Ok(Vec::new())
    }
}
