//! Tracked holdings.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, UserId};

/// Default currency for manually entered and seeded assets.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Error returned for unrecognised asset enum values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset {kind}: {value}")]
pub struct ParseAssetError {
    kind: &'static str,
    value: String,
}

/// Asset allocation bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    Equities,
    FixedIncome,
    RealEstate,
    PrivateEquity,
    Crypto,
    Cash,
    Alternatives,
    Collectibles,
}

impl AssetCategory {
    /// Every category, in display order.
    pub const ALL: [Self; 8] = [
        Self::Equities,
        Self::FixedIncome,
        Self::RealEstate,
        Self::PrivateEquity,
        Self::Crypto,
        Self::Cash,
        Self::Alternatives,
        Self::Collectibles,
    ];

    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equities => "equities",
            Self::FixedIncome => "fixed-income",
            Self::RealEstate => "real-estate",
            Self::PrivateEquity => "private-equity",
            Self::Crypto => "crypto",
            Self::Cash => "cash",
            Self::Alternatives => "alternatives",
            Self::Collectibles => "collectibles",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Equities => "Public Equities",
            Self::FixedIncome => "Fixed Income",
            Self::RealEstate => "Real Estate",
            Self::PrivateEquity => "Private Equity",
            Self::Crypto => "Digital Assets",
            Self::Cash => "Cash & Equivalents",
            Self::Alternatives => "Alternative Assets",
            Self::Collectibles => "Collectibles & Art",
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetCategory {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ParseAssetError {
                kind: "category",
                value: s.to_owned(),
            })
    }
}

/// Where an asset row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSource {
    /// Entered by the user.
    Manual,
    /// Derived from a linked bank account.
    Plaid,
    /// Demo data created during onboarding.
    Seed,
}

impl AssetSource {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Plaid => "plaid",
            Self::Seed => "seed",
        }
    }
}

impl FromStr for AssetSource {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "plaid" => Ok(Self::Plaid),
            "seed" => Ok(Self::Seed),
            other => Err(ParseAssetError {
                kind: "source",
                value: other.to_owned(),
            }),
        }
    }
}

/// A persisted asset, joined with its owning entity's name.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: Uuid,
    pub user_id: UserId,
    pub entity_id: Option<Uuid>,
    pub entity_name: Option<String>,
    pub name: String,
    pub category: AssetCategory,
    pub value: Cents,
    pub currency: String,
    pub change_24h: Option<f64>,
    pub change_30d: Option<f64>,
    pub institution: Option<String>,
    pub account_mask: Option<String>,
    pub notes: Option<String>,
    pub source: AssetSource,
    pub plaid_account_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for inserting an asset.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub user_id: UserId,
    pub entity_id: Option<Uuid>,
    pub name: String,
    pub category: AssetCategory,
    pub value: Cents,
    pub currency: String,
    pub change_24h: Option<f64>,
    pub change_30d: Option<f64>,
    pub institution: Option<String>,
    pub account_mask: Option<String>,
    pub notes: Option<String>,
    pub source: AssetSource,
    pub plaid_account_id: Option<String>,
}

impl NewAsset {
    /// Start a manual asset with the required fields; optional ones default
    /// to `None`.
    pub fn manual(user_id: UserId, name: String, category: AssetCategory, value: Cents) -> Self {
        Self {
            user_id,
            entity_id: None,
            name,
            category,
            value,
            currency: DEFAULT_CURRENCY.to_owned(),
            change_24h: None,
            change_30d: None,
            institution: None,
            account_mask: None,
            notes: None,
            source: AssetSource::Manual,
            plaid_account_id: None,
        }
    }
}

/// Partial update of an asset. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetUpdate {
    pub name: Option<String>,
    pub category: Option<AssetCategory>,
    pub value: Option<Cents>,
    pub entity_id: Option<Uuid>,
    pub institution: Option<String>,
    pub account_mask: Option<String>,
    pub notes: Option<String>,
}

impl AssetUpdate {
    /// Apply the update to an in-memory asset.
    pub fn apply_to(&self, asset: &mut Asset) {
        if let Some(name) = &self.name {
            asset.name.clone_from(name);
        }
        if let Some(category) = self.category {
            asset.category = category;
        }
        if let Some(value) = self.value {
            asset.value = value;
        }
        if let Some(entity_id) = self.entity_id {
            asset.entity_id = Some(entity_id);
        }
        if let Some(institution) = &self.institution {
            asset.institution = Some(institution.clone());
        }
        if let Some(mask) = &self.account_mask {
            asset.account_mask = Some(mask.clone());
        }
        if let Some(notes) = &self.notes {
            asset.notes = Some(notes.clone());
        }
    }
}
