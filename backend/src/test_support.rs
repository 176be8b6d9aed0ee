//! Test doubles shared by unit tests across the crate.
//!
//! The in-memory repositories keep rows in a `Mutex<Vec<_>>` and honour the
//! same keys and scoping rules as the Diesel adapters, so workflow tests can
//! assert on state after repeated calls instead of scripting every mock call.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AssetRepository, EntityRepository, InsightRepository, PlaidAccountRepository,
    PlaidItemRepository, RepositoryError, SubscriptionRepository, UserRepository,
};
use crate::domain::{
    Asset, AssetSource, AssetUpdate, AuthIdentity, AuthSubject, Entity, Insight, NewAsset,
    NewEntity, NewInsight, NewPlaidItem, NotificationSettings, OnboardingProfile, PlaidAccount,
    PlaidAccountRecord, PlaidItem, PlaidItemStatus, Subscription, User, UserId,
};

/// Instant used by fixture clocks unless a test picks another.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Clock frozen at a fixed instant.
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock frozen at `utc_now`.
pub fn fixture_clock_at(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now })
}

/// Clock frozen at [`fixture_now`].
pub fn fixture_clock() -> Arc<dyn Clock> {
    fixture_clock_at(fixture_now())
}

fn lock<T>(rows: &Mutex<T>) -> MutexGuard<'_, T> {
    rows.lock().expect("test store lock poisoned")
}

/// User repository backed by a vector.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    /// Snapshot of all users.
    pub fn all(&self) -> Vec<User> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_subject(
        &self,
        subject: &AuthSubject,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|user| &user.auth_subject == subject)
            .cloned())
    }

    async fn upsert_identity(&self, identity: &AuthIdentity) -> Result<User, RepositoryError> {
        let mut rows = lock(&self.rows);
        let email = identity.email.clone().unwrap_or_default();
        if let Some(user) = rows
            .iter_mut()
            .find(|user| user.auth_subject == identity.subject)
        {
            user.email = email;
            user.name.clone_from(&identity.name);
            return Ok(user.clone());
        }
        let user = User {
            id: UserId::random(),
            auth_subject: identity.subject.clone(),
            email,
            name: identity.name.clone(),
            onboarding: OnboardingProfile::default(),
            notifications: NotificationSettings::default(),
            created_at: fixture_now(),
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn save_onboarding(
        &self,
        user_id: &UserId,
        profile: &OnboardingProfile,
    ) -> Result<(), RepositoryError> {
        if let Some(user) = lock(&self.rows).iter_mut().find(|user| &user.id == user_id) {
            user.onboarding = profile.clone();
        }
        Ok(())
    }

    async fn update_notifications(
        &self,
        user_id: &UserId,
        settings: NotificationSettings,
    ) -> Result<(), RepositoryError> {
        if let Some(user) = lock(&self.rows).iter_mut().find(|user| &user.id == user_id) {
            user.notifications = settings;
        }
        Ok(())
    }
}

/// Subscription repository backed by a vector.
#[derive(Default)]
pub struct InMemorySubscriptions {
    rows: Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptions {
    /// Store seeded with `rows`.
    pub fn with_rows(rows: Vec<Subscription>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    /// Snapshot of all subscriptions.
    pub fn all(&self) -> Vec<Subscription> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptions {
    async fn find_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|row| &row.user_id == user_id)
            .cloned())
    }

    async fn find_by_stripe_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|row| row.stripe_subscription_id.as_deref() == Some(stripe_subscription_id))
            .cloned())
    }

    async fn upsert(&self, subscription: &Subscription) -> Result<(), RepositoryError> {
        let mut rows = lock(&self.rows);
        match rows
            .iter_mut()
            .find(|row| row.user_id == subscription.user_id)
        {
            Some(row) => *row = subscription.clone(),
            None => rows.push(subscription.clone()),
        }
        Ok(())
    }

    async fn list_entitled_user_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|row| row.status.is_entitled())
            .map(|row| row.user_id)
            .collect())
    }
}

/// Asset repository backed by a vector.
#[derive(Default)]
pub struct InMemoryAssets {
    rows: Mutex<Vec<Asset>>,
}

impl InMemoryAssets {
    /// Snapshot of all assets.
    pub fn all(&self) -> Vec<Asset> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssets {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Asset>, RepositoryError> {
        let mut assets: Vec<Asset> = lock(&self.rows)
            .iter()
            .filter(|asset| &asset.user_id == user_id)
            .cloned()
            .collect();
        assets.sort_by(|a, b| b.value.cmp(&a.value));
        Ok(assets)
    }

    async fn find_by_plaid_account(
        &self,
        user_id: &UserId,
        plaid_account_id: &str,
    ) -> Result<Option<Asset>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|asset| {
                &asset.user_id == user_id
                    && asset.plaid_account_id.as_deref() == Some(plaid_account_id)
            })
            .cloned())
    }

    async fn insert(&self, asset: &NewAsset) -> Result<Asset, RepositoryError> {
        let mut rows = lock(&self.rows);
        let duplicate = asset.plaid_account_id.as_deref().is_some_and(|plaid_account_id| {
            rows.iter()
                .any(|row| row.plaid_account_id.as_deref() == Some(plaid_account_id))
        });
        if duplicate {
            return Err(RepositoryError::query(
                "duplicate key value violates unique constraint \"assets_plaid_account_id_key\"",
            ));
        }
        let now = fixture_now();
        let row = Asset {
            id: Uuid::new_v4(),
            user_id: asset.user_id,
            entity_id: asset.entity_id,
            entity_name: None,
            name: asset.name.clone(),
            category: asset.category,
            value: asset.value,
            currency: asset.currency.clone(),
            change_24h: asset.change_24h,
            change_30d: asset.change_30d,
            institution: asset.institution.clone(),
            account_mask: asset.account_mask.clone(),
            notes: asset.notes.clone(),
            source: asset.source,
            plaid_account_id: asset.plaid_account_id.clone(),
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        user_id: &UserId,
        asset_id: &Uuid,
        update: &AssetUpdate,
    ) -> Result<Option<Asset>, RepositoryError> {
        let mut rows = lock(&self.rows);
        let Some(asset) = rows
            .iter_mut()
            .find(|asset| &asset.user_id == user_id && &asset.id == asset_id)
        else {
            return Ok(None);
        };
        update.apply_to(asset);
        Ok(Some(asset.clone()))
    }

    async fn delete(&self, user_id: &UserId, asset_id: &Uuid) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|asset| !(&asset.user_id == user_id && &asset.id == asset_id));
        Ok(rows.len() < before)
    }

    async fn delete_by_source(
        &self,
        user_id: &UserId,
        source: AssetSource,
    ) -> Result<u64, RepositoryError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|asset| !(&asset.user_id == user_id && asset.source == source));
        Ok((before - rows.len()) as u64)
    }

    async fn count_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|asset| &asset.user_id == user_id)
            .count() as u64)
    }
}

/// Entity repository backed by a vector.
#[derive(Default)]
pub struct InMemoryEntities {
    rows: Mutex<Vec<Entity>>,
}

impl InMemoryEntities {
    /// Snapshot of all entities.
    pub fn all(&self) -> Vec<Entity> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl EntityRepository for InMemoryEntities {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Entity>, RepositoryError> {
        let mut entities: Vec<Entity> = lock(&self.rows)
            .iter()
            .filter(|entity| &entity.user_id == user_id)
            .cloned()
            .collect();
        entities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entities)
    }

    async fn insert(&self, entity: &NewEntity) -> Result<Entity, RepositoryError> {
        let row = Entity {
            id: Uuid::new_v4(),
            user_id: entity.user_id,
            name: entity.name.clone(),
            kind: entity.kind,
            jurisdiction: entity.jurisdiction.clone(),
            parent_id: entity.parent_id,
        };
        lock(&self.rows).push(row.clone());
        Ok(row)
    }

    async fn set_parent(
        &self,
        user_id: &UserId,
        entity_id: &Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        let Some(entity) = rows
            .iter_mut()
            .find(|entity| &entity.user_id == user_id && &entity.id == entity_id)
        else {
            return Ok(false);
        };
        entity.parent_id = parent_id;
        Ok(true)
    }

    async fn delete(&self, user_id: &UserId, entity_id: &Uuid) -> Result<bool, RepositoryError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|entity| !(&entity.user_id == user_id && &entity.id == entity_id));
        Ok(rows.len() < before)
    }
}

/// Insight repository backed by a vector.
#[derive(Default)]
pub struct InMemoryInsights {
    rows: Mutex<Vec<Insight>>,
}

impl InMemoryInsights {
    /// Snapshot of all insights.
    pub fn all(&self) -> Vec<Insight> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl InsightRepository for InMemoryInsights {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Insight>, RepositoryError> {
        let mut insights: Vec<Insight> = lock(&self.rows)
            .iter()
            .filter(|insight| &insight.user_id == user_id)
            .cloned()
            .collect();
        insights.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(insights)
    }

    async fn insert(
        &self,
        user_id: &UserId,
        insight: &NewInsight,
        created_at: DateTime<Utc>,
    ) -> Result<Insight, RepositoryError> {
        let row = Insight {
            id: Uuid::new_v4(),
            user_id: *user_id,
            title: insight.title.clone(),
            description: insight.description.clone(),
            category: insight.category,
            priority: insight.priority,
            actionable: insight.actionable,
            dismissed: false,
            created_at,
        };
        lock(&self.rows).push(row.clone());
        Ok(row)
    }

    async fn delete_created_before(
        &self,
        user_id: &UserId,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|insight| !(&insight.user_id == user_id && insight.created_at < cutoff));
        Ok((before - rows.len()) as u64)
    }
}

/// Linked-item repository backed by a vector.
#[derive(Default)]
pub struct InMemoryPlaidItems {
    rows: Mutex<Vec<PlaidItem>>,
}

impl InMemoryPlaidItems {
    /// Snapshot of all items.
    pub fn all(&self) -> Vec<PlaidItem> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl PlaidItemRepository for InMemoryPlaidItems {
    async fn upsert(&self, item: &NewPlaidItem) -> Result<PlaidItem, RepositoryError> {
        let mut rows = lock(&self.rows);
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.plaid_item_id == item.plaid_item_id)
        {
            row.access_token = item.access_token.clone();
            row.institution_id.clone_from(&item.institution_id);
            row.institution_name.clone_from(&item.institution_name);
            row.status = PlaidItemStatus::Active;
            row.error_code = None;
            return Ok(row.clone());
        }
        let row = PlaidItem {
            id: Uuid::new_v4(),
            user_id: item.user_id,
            plaid_item_id: item.plaid_item_id.clone(),
            access_token: item.access_token.clone(),
            institution_id: item.institution_id.clone(),
            institution_name: item.institution_name.clone(),
            status: PlaidItemStatus::Active,
            error_code: None,
            last_synced_at: None,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_plaid_item_id(
        &self,
        plaid_item_id: &str,
    ) -> Result<Option<PlaidItem>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .find(|row| row.plaid_item_id == plaid_item_id)
            .cloned())
    }

    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PlaidItem>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|row| &row.user_id == user_id && row.status == PlaidItemStatus::Active)
            .cloned()
            .collect())
    }

    async fn list_active(&self) -> Result<Vec<PlaidItem>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|row| row.status == PlaidItemStatus::Active)
            .cloned()
            .collect())
    }

    async fn mark_error(&self, item_id: &Uuid, error_code: &str) -> Result<(), RepositoryError> {
        if let Some(row) = lock(&self.rows).iter_mut().find(|row| &row.id == item_id) {
            row.status = PlaidItemStatus::Error;
            row.error_code = Some(error_code.to_owned());
        }
        Ok(())
    }

    async fn mark_synced(
        &self,
        item_id: &Uuid,
        synced_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        if let Some(row) = lock(&self.rows).iter_mut().find(|row| &row.id == item_id) {
            row.last_synced_at = Some(synced_at);
        }
        Ok(())
    }
}

/// Account repository backed by a vector.
#[derive(Default)]
pub struct InMemoryPlaidAccounts {
    rows: Mutex<Vec<PlaidAccount>>,
}

impl InMemoryPlaidAccounts {
    /// Snapshot of all accounts.
    pub fn all(&self) -> Vec<PlaidAccount> {
        lock(&self.rows).clone()
    }
}

#[async_trait]
impl PlaidAccountRepository for InMemoryPlaidAccounts {
    async fn upsert(
        &self,
        item_id: &Uuid,
        record: &PlaidAccountRecord,
        synced_at: DateTime<Utc>,
    ) -> Result<PlaidAccount, RepositoryError> {
        let mut rows = lock(&self.rows);
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.record.plaid_account_id == record.plaid_account_id)
        {
            row.record.name.clone_from(&record.name);
            row.record.official_name.clone_from(&record.official_name);
            row.record.current_balance = record.current_balance;
            row.record.available_balance = record.available_balance;
            row.record
                .iso_currency_code
                .clone_from(&record.iso_currency_code);
            row.last_synced_at = synced_at;
            return Ok(row.clone());
        }
        let row = PlaidAccount {
            id: Uuid::new_v4(),
            item_id: *item_id,
            record: record.clone(),
            last_synced_at: synced_at,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_for_item(&self, item_id: &Uuid) -> Result<Vec<PlaidAccount>, RepositoryError> {
        Ok(lock(&self.rows)
            .iter()
            .filter(|row| &row.item_id == item_id)
            .cloned()
            .collect())
    }
}
