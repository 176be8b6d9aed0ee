//! Subscription plans, billing intervals and lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, UserId};

/// Free trial length applied to every plan at checkout.
pub const TRIAL_DAYS: u32 = 14;

/// Error returned when parsing one of the billing enums fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseBillingError {
    kind: &'static str,
    value: String,
}

impl ParseBillingError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Subscription lifecycle status, mirroring the payment provider's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    /// Stable storage and wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
        }
    }

    /// Whether the status grants access to subscriber features.
    ///
    /// # Examples
    /// ```
    /// use patrimony::domain::SubscriptionStatus;
    ///
    /// assert!(SubscriptionStatus::Trialing.is_entitled());
    /// assert!(!SubscriptionStatus::PastDue.is_entitled());
    /// ```
    pub const fn is_entitled(self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ParseBillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trialing" => Ok(Self::Trialing),
            "active" => Ok(Self::Active),
            "past_due" => Ok(Self::PastDue),
            "canceled" => Ok(Self::Canceled),
            "incomplete" => Ok(Self::Incomplete),
            "incomplete_expired" => Ok(Self::IncompleteExpired),
            "unpaid" => Ok(Self::Unpaid),
            "paused" => Ok(Self::Paused),
            other => Err(ParseBillingError::new("subscription status", other)),
        }
    }
}

/// Billing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Monthly,
    Annual,
}

impl BillingInterval {
    /// Stable storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Recurring interval understood by the payment provider.
    pub const fn recurring_interval(self) -> &'static str {
        match self {
            Self::Monthly => "month",
            Self::Annual => "year",
        }
    }
}

impl FromStr for BillingInterval {
    type Err = ParseBillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            other => Err(ParseBillingError::new("billing interval", other)),
        }
    }
}

/// Subscription tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Steward,
    Principal,
    Dynasty,
}

impl Plan {
    /// Stable plan identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Steward => "steward",
            Self::Principal => "principal",
            Self::Dynasty => "dynasty",
        }
    }

    /// Marketing name used in checkout line items.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Steward => "Steward",
            Self::Principal => "Principal",
            Self::Dynasty => "Dynasty",
        }
    }

    /// Price charged per interval.
    ///
    /// # Examples
    /// ```
    /// use patrimony::domain::{BillingInterval, Plan};
    ///
    /// assert_eq!(Plan::Steward.price(BillingInterval::Monthly).get(), 29_700);
    /// ```
    pub const fn price(self, interval: BillingInterval) -> Cents {
        let cents = match (self, interval) {
            (Self::Steward, BillingInterval::Monthly) => 29_700,
            (Self::Steward, BillingInterval::Annual) => 285_100,
            (Self::Principal, BillingInterval::Monthly) => 79_700,
            (Self::Principal, BillingInterval::Annual) => 765_100,
            (Self::Dynasty, BillingInterval::Monthly) => 199_700,
            (Self::Dynasty, BillingInterval::Annual) => 1_917_100,
        };
        Cents::new(cents)
    }
}

impl FromStr for Plan {
    type Err = ParseBillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steward" => Ok(Self::Steward),
            "principal" => Ok(Self::Principal),
            "dynasty" => Ok(Self::Dynasty),
            other => Err(ParseBillingError::new("plan", other)),
        }
    }
}

/// A user's subscription row.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub user_id: UserId,
    pub plan: Plan,
    pub interval: BillingInterval,
    pub status: SubscriptionStatus,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub current_period_end: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SubscriptionStatus::Active, true)]
    #[case(SubscriptionStatus::Trialing, true)]
    #[case(SubscriptionStatus::PastDue, false)]
    #[case(SubscriptionStatus::Canceled, false)]
    #[case(SubscriptionStatus::Incomplete, false)]
    #[case(SubscriptionStatus::IncompleteExpired, false)]
    #[case(SubscriptionStatus::Unpaid, false)]
    #[case(SubscriptionStatus::Paused, false)]
    fn only_active_and_trialing_are_entitled(
        #[case] status: SubscriptionStatus,
        #[case] entitled: bool,
    ) {
        assert_eq!(status.is_entitled(), entitled);
        assert_eq!(status.as_str().parse::<SubscriptionStatus>(), Ok(status));
    }

    #[rstest]
    #[case(Plan::Principal, BillingInterval::Annual, 765_100)]
    #[case(Plan::Dynasty, BillingInterval::Monthly, 199_700)]
    #[case(Plan::Dynasty, BillingInterval::Annual, 1_917_100)]
    fn plan_prices_are_in_cents(
        #[case] plan: Plan,
        #[case] interval: BillingInterval,
        #[case] cents: i64,
    ) {
        assert_eq!(plan.price(interval), Cents::new(cents));
    }

    #[test]
    fn rejects_unknown_plan() {
        let err = "platinum".parse::<Plan>().expect_err("unknown plan");
        assert_eq!(err.to_string(), "unknown plan: platinum");
    }
}
