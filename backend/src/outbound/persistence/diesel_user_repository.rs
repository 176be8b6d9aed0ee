//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{
    AuthIdentity, AuthSubject, NotificationSettings, OnboardingProfile, User, UserId,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, NotificationUpdate, OnboardingUpdate, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed user store keyed by the auth provider's subject.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_subject(
        &self,
        subject: &AuthSubject,
    ) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::auth_subject.eq(subject.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_domain).transpose()
    }

    async fn upsert_identity(&self, identity: &AuthIdentity) -> Result<User, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            auth_subject: identity.subject.as_str(),
            email: identity.email.as_deref().unwrap_or_default(),
            name: identity.name.as_deref(),
        };
        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .on_conflict(users::auth_subject)
            .do_update()
            .set((
                users::email.eq(excluded(users::email)),
                users::name.eq(excluded(users::name)),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row.into_domain()
    }

    async fn save_onboarding(
        &self,
        user_id: &UserId,
        profile: &OnboardingProfile,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = OnboardingUpdate {
            onboarding_goal: profile.goal.as_deref(),
            net_worth_range: profile.net_worth_range.as_deref(),
            institution_count: profile.institution_count.as_deref(),
            entity_count: profile.entity_count.as_deref(),
            primary_concern: profile.primary_concern.as_deref(),
            updated_at: Utc::now(),
        };
        diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
            .set(&update)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_notifications(
        &self,
        user_id: &UserId,
        settings: NotificationSettings,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = NotificationUpdate {
            weekly_digest: settings.weekly_digest,
            insight_alerts: settings.insight_alerts,
            tax_alerts: settings.tax_alerts,
            updated_at: Utc::now(),
        };
        diesel::update(users::table.filter(users::id.eq(user_id.as_uuid())))
            .set(&update)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn row(auth_subject: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            auth_subject: auth_subject.to_owned(),
            email: "ada@example.com".to_owned(),
            name: Some("Ada".to_owned()),
            onboarding_goal: Some("preserve".to_owned()),
            net_worth_range: None,
            institution_count: None,
            entity_count: None,
            primary_concern: None,
            weekly_digest: true,
            insight_alerts: false,
            tax_alerts: true,
            created_at: Utc
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    fn row_maps_onboarding_and_notification_columns() {
        let user = row("user_2abc").into_domain().expect("valid row");
        assert_eq!(user.onboarding.goal.as_deref(), Some("preserve"));
        assert!(!user.notifications.insight_alerts);
        assert_eq!(user.auth_subject.as_str(), "user_2abc");
    }

    #[rstest]
    fn blank_subject_is_query_error() {
        let err = row("").into_domain().expect_err("blank subject");
        assert!(matches!(err, RepositoryError::Query { .. }));
    }
}
