//! Onboarding and per-user settings.

use std::sync::Arc;

use tracing::info;

use super::ports::UserRepository;
use super::{
    AuthIdentity, DemoPortfolioSeeder, Error, NotificationSettings, NotificationSettingsPatch,
    OnboardingProfile, SeedOutcome, User,
};

/// Onboarding submission: questionnaire answers plus optional contact
/// details used when the session token carries none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingSubmission {
    pub profile: OnboardingProfile,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Account lifecycle for signed-in users.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    seeder: DemoPortfolioSeeder,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, seeder: DemoPortfolioSeeder) -> Self {
        Self { users, seeder }
    }

    /// Mirror the identity locally, store the answers and seed demo data
    /// for users with an empty portfolio.
    pub async fn onboard(
        &self,
        identity: &AuthIdentity,
        submission: OnboardingSubmission,
    ) -> Result<User, Error> {
        let identity = AuthIdentity {
            subject: identity.subject.clone(),
            email: identity.email.clone().or(submission.email),
            name: identity.name.clone().or(submission.name),
        };
        let mut user = self.users.upsert_identity(&identity).await?;
        self.users
            .save_onboarding(&user.id, &submission.profile)
            .await?;
        user.onboarding = submission.profile;

        if let SeedOutcome::Seeded { assets, .. } = self.seeder.seed(&user.id).await? {
            info!(user_id = %user.id, assets, "onboarding seeded demo portfolio");
        }
        Ok(user)
    }

    async fn existing_user(&self, identity: &AuthIdentity) -> Result<User, Error> {
        self.users
            .find_by_subject(&identity.subject)
            .await?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Current notification switches.
    pub async fn notifications(
        &self,
        identity: &AuthIdentity,
    ) -> Result<NotificationSettings, Error> {
        Ok(self.existing_user(identity).await?.notifications)
    }

    /// Apply `patch` and return the resulting switches.
    pub async fn update_notifications(
        &self,
        identity: &AuthIdentity,
        patch: NotificationSettingsPatch,
    ) -> Result<NotificationSettings, Error> {
        let user = self.existing_user(identity).await?;
        let updated = patch.apply(user.notifications);
        if !patch.is_empty() {
            self.users.update_notifications(&user.id, updated).await?;
        }
        Ok(updated)
    }
}
