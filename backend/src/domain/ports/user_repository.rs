//! Port for the local user mirror of the identity provider.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    AuthIdentity, AuthSubject, NotificationSettings, OnboardingProfile, User, UserId,
};

use super::RepositoryError;

/// Reads and writes local user rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the user mirrored for an identity-provider subject.
    async fn find_by_subject(&self, subject: &AuthSubject)
    -> Result<Option<User>, RepositoryError>;

    /// Create the user for `identity`, or refresh its e-mail and name when a
    /// row for the subject already exists.
    async fn upsert_identity(&self, identity: &AuthIdentity) -> Result<User, RepositoryError>;

    /// Store questionnaire answers.
    async fn save_onboarding(
        &self,
        user_id: &UserId,
        profile: &OnboardingProfile,
    ) -> Result<(), RepositoryError>;

    /// Replace the notification switches.
    async fn update_notifications(
        &self,
        user_id: &UserId,
        settings: NotificationSettings,
    ) -> Result<(), RepositoryError>;
}

/// Fixture implementation used when no database is configured.
///
/// Lookups miss and upserts echo a fresh user, so the gate always routes to
/// onboarding.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_subject(
        &self,
        _subject: &AuthSubject,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(None)
    }

    async fn upsert_identity(&self, identity: &AuthIdentity) -> Result<User, RepositoryError> {
        Ok(User {
            id: UserId::random(),
            auth_subject: identity.subject.clone(),
            email: identity.email.clone().unwrap_or_default(),
            name: identity.name.clone(),
            onboarding: OnboardingProfile::default(),
            notifications: NotificationSettings::default(),
            created_at: Utc::now(),
        })
    }

    async fn save_onboarding(
        &self,
        _user_id: &UserId,
        _profile: &OnboardingProfile,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn update_notifications(
        &self,
        _user_id: &UserId,
        _settings: NotificationSettings,
    ) -> Result<(), RepositoryError> {
        Ok(())
    }
}
