//! Advisory insights produced by the language model or seeded at onboarding.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Insights older than this many days are purged before a new batch lands.
pub const INSIGHT_RETENTION_DAYS: i64 = 30;

/// Oldest creation time kept by the retention policy.
///
/// Rows with `created_at` strictly before the cutoff are deleted.
pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(INSIGHT_RETENTION_DAYS)
}

/// Insight theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Opportunity,
    Risk,
    Tax,
    Rebalance,
}

impl InsightCategory {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opportunity => "opportunity",
            Self::Risk => "risk",
            Self::Tax => "tax",
            Self::Rebalance => "rebalance",
        }
    }
}

impl FromStr for InsightCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opportunity" => Ok(Self::Opportunity),
            "risk" => Ok(Self::Risk),
            "tax" => Ok(Self::Tax),
            "rebalance" => Ok(Self::Rebalance),
            other => Err(format!("unknown insight category: {other}")),
        }
    }
}

/// Urgency of an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

impl InsightPriority {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for InsightPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown insight priority: {other}")),
        }
    }
}

/// Insight content as produced by the model or the seed fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInsight {
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
    pub priority: InsightPriority,
    #[serde(default = "default_actionable")]
    pub actionable: bool,
}

const fn default_actionable() -> bool {
    true
}

/// A persisted insight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub id: Uuid,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
    pub priority: InsightPriority,
    pub actionable: bool,
    pub dismissed: bool,
    pub created_at: DateTime<Utc>,
}
