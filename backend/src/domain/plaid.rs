//! Bank-link items, their accounts and the account-to-asset mapping rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssetCategory, Cents, UserId};

/// Currency assumed when the aggregator omits one.
pub const FALLBACK_ISO_CURRENCY: &str = "USD";

/// Error code recorded for `ITEM`/`ERROR` webhooks without a provider code.
pub const DEFAULT_ITEM_ERROR_CODE: &str = "ITEM_ERROR";

/// Map an aggregator account type onto an allocation category.
///
/// # Examples
/// ```
/// use patrimony::domain::{category_for_account_type, AssetCategory};
///
/// assert_eq!(category_for_account_type("loan"), AssetCategory::FixedIncome);
/// assert_eq!(category_for_account_type("mystery"), AssetCategory::Alternatives);
/// ```
pub fn category_for_account_type(account_type: &str) -> AssetCategory {
    match account_type {
        "depository" | "credit" => AssetCategory::Cash,
        "investment" | "brokerage" => AssetCategory::Equities,
        "loan" => AssetCategory::FixedIncome,
        _ => AssetCategory::Alternatives,
    }
}

/// Whether balances of this account type represent money owed.
pub fn is_liability(account_type: &str) -> bool {
    matches!(account_type, "credit" | "loan")
}

/// Asset value for an account balance.
///
/// A missing balance counts as zero. Liability balances reported as positive
/// are negated so they reduce net worth; non-positive ones are kept as-is.
pub fn signed_asset_value(account_type: &str, current: Option<Cents>) -> Cents {
    let value = current.unwrap_or(Cents::ZERO);
    if is_liability(account_type) && value.is_positive() {
        -value
    } else {
        value
    }
}

/// Health of a linked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaidItemStatus {
    Active,
    Error,
    Revoked,
}

impl PlaidItemStatus {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Error => "error",
            Self::Revoked => "revoked",
        }
    }
}

impl FromStr for PlaidItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "error" => Ok(Self::Error),
            "revoked" => Ok(Self::Revoked),
            other => Err(format!("unknown plaid item status: {other}")),
        }
    }
}

/// Access token sealed for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedToken {
    /// Base64 ciphertext including the authentication tag.
    pub ciphertext: String,
    /// Base64 nonce.
    pub nonce: String,
}

/// Institution metadata supplied by the link flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LinkedInstitution {
    #[serde(rename = "institution_id")]
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A linked institution credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaidItem {
    pub id: Uuid,
    pub user_id: UserId,
    pub plaid_item_id: String,
    pub access_token: SealedToken,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub status: PlaidItemStatus,
    pub error_code: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

/// Fields for inserting an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlaidItem {
    pub user_id: UserId,
    pub plaid_item_id: String,
    pub access_token: SealedToken,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
}

/// Account as reported by the aggregator, balances in dollars.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpstreamAccount {
    pub account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    pub subtype: Option<String>,
    pub mask: Option<String>,
    pub balances: UpstreamBalances,
}

/// Balance block of an [`UpstreamAccount`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpstreamBalances {
    pub current: Option<f64>,
    pub available: Option<f64>,
    pub iso_currency_code: Option<String>,
}

/// Account row ready to be upserted, balances in cents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaidAccountRecord {
    pub plaid_account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub subtype: Option<String>,
    pub mask: Option<String>,
    pub current_balance: Option<Cents>,
    pub available_balance: Option<Cents>,
    pub iso_currency_code: String,
}

impl PlaidAccountRecord {
    /// Display name for the derived asset.
    pub fn asset_name(&self) -> &str {
        self.official_name.as_deref().unwrap_or(&self.name)
    }

    /// Signed value for the derived asset.
    pub fn asset_value(&self) -> Cents {
        signed_asset_value(&self.account_type, self.current_balance)
    }

    /// Category for the derived asset.
    pub fn asset_category(&self) -> AssetCategory {
        category_for_account_type(&self.account_type)
    }
}

/// Persisted account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaidAccount {
    pub id: Uuid,
    pub item_id: Uuid,
    pub record: PlaidAccountRecord,
    pub last_synced_at: DateTime<Utc>,
}

/// Aggregator webhook body; only the fields used for routing are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaidWebhook {
    pub webhook_type: String,
    pub webhook_code: String,
    pub item_id: Option<String>,
    pub error: Option<PlaidWebhookError>,
}

/// Error block attached to `ITEM`/`ERROR` webhooks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaidWebhookError {
    pub error_code: Option<String>,
}

/// Outcome of a batch sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
    pub total: usize,
}
