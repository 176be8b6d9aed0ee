//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each `into_domain` parses text enum
//! columns and reports unknown values as query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    Asset, AuthSubject, Cents, Document, DocumentCategory, Entity, Insight, NotificationSettings,
    OnboardingProfile, PlaidAccount, PlaidAccountRecord, PlaidItem, SealedToken, Subscription,
    User, UserId,
};

use super::diesel_helpers::{cast_size, parse_column};
use super::schema::{
    assets, documents, entities, insights, plaid_accounts, plaid_items, subscriptions, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub auth_subject: String,
    pub email: String,
    pub name: Option<String>,
    pub onboarding_goal: Option<String>,
    pub net_worth_range: Option<String>,
    pub institution_count: Option<String>,
    pub entity_count: Option<String>,
    pub primary_concern: Option<String>,
    pub weekly_digest: bool,
    pub insight_alerts: bool,
    pub tax_alerts: bool,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_domain(self) -> Result<User, RepositoryError> {
        let auth_subject = AuthSubject::new(self.auth_subject)
            .map_err(|err| RepositoryError::query(format!("invalid auth_subject: {err}")))?;
        Ok(User {
            id: UserId::from_uuid(self.id),
            auth_subject,
            email: self.email,
            name: self.name,
            onboarding: OnboardingProfile {
                goal: self.onboarding_goal,
                net_worth_range: self.net_worth_range,
                institution_count: self.institution_count,
                entity_count: self.entity_count,
                primary_concern: self.primary_concern,
            },
            notifications: NotificationSettings {
                weekly_digest: self.weekly_digest,
                insight_alerts: self.insight_alerts,
                tax_alerts: self.tax_alerts,
            },
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub auth_subject: &'a str,
    pub email: &'a str,
    pub name: Option<&'a str>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct OnboardingUpdate<'a> {
    pub onboarding_goal: Option<&'a str>,
    pub net_worth_range: Option<&'a str>,
    pub institution_count: Option<&'a str>,
    pub entity_count: Option<&'a str>,
    pub primary_concern: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct NotificationUpdate {
    pub weekly_digest: bool,
    pub insight_alerts: bool,
    pub tax_alerts: bool,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriptionRow {
    pub user_id: Uuid,
    pub plan: String,
    pub billing_interval: String,
    pub status: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
}

impl SubscriptionRow {
    pub fn into_domain(self) -> Result<Subscription, RepositoryError> {
        Ok(Subscription {
            user_id: UserId::from_uuid(self.user_id),
            plan: parse_column(&self.plan, "plan")?,
            interval: parse_column(&self.billing_interval, "billing_interval")?,
            status: parse_column(&self.status, "status")?,
            stripe_customer_id: self.stripe_customer_id,
            stripe_subscription_id: self.stripe_subscription_id,
            current_period_end: self.current_period_end,
        })
    }
}

/// Insert and upsert payload; every column is overwritten on conflict.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = subscriptions)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SubscriptionWrite<'a> {
    pub user_id: Uuid,
    pub plan: &'a str,
    pub billing_interval: &'a str,
    pub status: &'a str,
    pub stripe_customer_id: Option<&'a str>,
    pub stripe_subscription_id: Option<&'a str>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = entities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EntityRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: String,
    pub jurisdiction: String,
    pub parent_id: Option<Uuid>,
}

impl EntityRow {
    pub fn into_domain(self) -> Result<Entity, RepositoryError> {
        Ok(Entity {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            kind: parse_column(&self.kind, "kind")?,
            jurisdiction: self.jurisdiction,
            parent_id: self.parent_id,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = entities)]
pub(crate) struct NewEntityRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub kind: &'a str,
    pub jurisdiction: &'a str,
    pub parent_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssetRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Option<Uuid>,
    pub name: String,
    pub category: String,
    pub value_cents: i64,
    pub currency: String,
    pub change_24h: Option<f64>,
    pub change_30d: Option<f64>,
    pub institution: Option<String>,
    pub account_mask: Option<String>,
    pub notes: Option<String>,
    pub source: String,
    pub plaid_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetRow {
    pub fn into_domain(self, entity_name: Option<String>) -> Result<Asset, RepositoryError> {
        Ok(Asset {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            entity_id: self.entity_id,
            entity_name,
            name: self.name,
            category: parse_column(&self.category, "category")?,
            value: Cents::new(self.value_cents),
            currency: self.currency,
            change_24h: self.change_24h,
            change_30d: self.change_30d,
            institution: self.institution,
            account_mask: self.account_mask,
            notes: self.notes,
            source: parse_column(&self.source, "source")?,
            plaid_account_id: self.plaid_account_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assets)]
pub(crate) struct NewAssetRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Option<Uuid>,
    pub name: &'a str,
    pub category: &'a str,
    pub value_cents: i64,
    pub currency: &'a str,
    pub change_24h: Option<f64>,
    pub change_30d: Option<f64>,
    pub institution: Option<&'a str>,
    pub account_mask: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub source: &'a str,
    pub plaid_account_id: Option<&'a str>,
}

/// Partial asset update; `None` fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = assets)]
pub(crate) struct AssetChangeset<'a> {
    pub name: Option<&'a str>,
    pub category: Option<&'a str>,
    pub value_cents: Option<i64>,
    pub entity_id: Option<Uuid>,
    pub institution: Option<&'a str>,
    pub account_mask: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Option<Uuid>,
    pub name: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub blob_url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl DocumentRow {
    pub fn into_domain(self, entity_name: Option<String>) -> Document {
        Document {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            entity_id: self.entity_id,
            entity_name,
            name: self.name,
            file_name: self.file_name,
            file_size: cast_size(self.file_size),
            mime_type: self.mime_type,
            blob_url: self.blob_url,
            category: DocumentCategory::parse_or_default(Some(&self.category)),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = documents)]
pub(crate) struct NewDocumentRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity_id: Option<Uuid>,
    pub name: &'a str,
    pub file_name: &'a str,
    pub file_size: i64,
    pub mime_type: &'a str,
    pub blob_url: &'a str,
    pub category: &'a str,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = insights)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InsightRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub actionable: bool,
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
}

impl InsightRow {
    pub fn into_domain(self) -> Result<Insight, RepositoryError> {
        Ok(Insight {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            title: self.title,
            description: self.description,
            category: parse_column(&self.category, "category")?,
            priority: parse_column(&self.priority, "priority")?,
            actionable: self.actionable,
            dismissed: self.dismissed,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = insights)]
pub(crate) struct NewInsightRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub priority: &'a str,
    pub actionable: bool,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Plaid items and accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = plaid_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlaidItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plaid_item_id: String,
    pub access_token_ciphertext: String,
    pub access_token_nonce: String,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub status: String,
    pub error_code: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl PlaidItemRow {
    pub fn into_domain(self) -> Result<PlaidItem, RepositoryError> {
        Ok(PlaidItem {
            id: self.id,
            user_id: UserId::from_uuid(self.user_id),
            plaid_item_id: self.plaid_item_id,
            access_token: SealedToken {
                ciphertext: self.access_token_ciphertext,
                nonce: self.access_token_nonce,
            },
            institution_id: self.institution_id,
            institution_name: self.institution_name,
            status: parse_column(&self.status, "status")?,
            error_code: self.error_code,
            last_synced_at: self.last_synced_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plaid_items)]
pub(crate) struct NewPlaidItemRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plaid_item_id: &'a str,
    pub access_token_ciphertext: &'a str,
    pub access_token_nonce: &'a str,
    pub institution_id: Option<&'a str>,
    pub institution_name: Option<&'a str>,
    pub status: &'a str,
}

/// Re-link payload: fresh token, institution and a cleared error.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = plaid_items)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PlaidItemRelink<'a> {
    pub access_token_ciphertext: &'a str,
    pub access_token_nonce: &'a str,
    pub institution_id: Option<&'a str>,
    pub institution_name: Option<&'a str>,
    pub status: &'a str,
    pub error_code: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = plaid_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PlaidAccountRow {
    pub id: Uuid,
    pub item_id: Uuid,
    pub plaid_account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub subtype: Option<String>,
    pub mask: Option<String>,
    pub current_balance_cents: Option<i64>,
    pub available_balance_cents: Option<i64>,
    pub iso_currency_code: String,
    pub last_synced_at: DateTime<Utc>,
}

impl From<PlaidAccountRow> for PlaidAccount {
    fn from(row: PlaidAccountRow) -> Self {
        Self {
            id: row.id,
            item_id: row.item_id,
            record: PlaidAccountRecord {
                plaid_account_id: row.plaid_account_id,
                name: row.name,
                official_name: row.official_name,
                account_type: row.account_type,
                subtype: row.subtype,
                mask: row.mask,
                current_balance: row.current_balance_cents.map(Cents::new),
                available_balance: row.available_balance_cents.map(Cents::new),
                iso_currency_code: row.iso_currency_code,
            },
            last_synced_at: row.last_synced_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plaid_accounts)]
pub(crate) struct NewPlaidAccountRow<'a> {
    pub id: Uuid,
    pub item_id: Uuid,
    pub plaid_account_id: &'a str,
    pub name: &'a str,
    pub official_name: Option<&'a str>,
    pub account_type: &'a str,
    pub subtype: Option<&'a str>,
    pub mask: Option<&'a str>,
    pub current_balance_cents: Option<i64>,
    pub available_balance_cents: Option<i64>,
    pub iso_currency_code: &'a str,
    pub last_synced_at: DateTime<Utc>,
}

/// Columns refreshed when an account is seen again.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = plaid_accounts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PlaidAccountRefresh<'a> {
    pub name: &'a str,
    pub official_name: Option<&'a str>,
    pub current_balance_cents: Option<i64>,
    pub available_balance_cents: Option<i64>,
    pub iso_currency_code: &'a str,
    pub last_synced_at: DateTime<Utc>,
}
