//! User identity, onboarding answers and notification preferences.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for user-facing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("auth subject must not be empty")]
    EmptySubject,
    #[error("auth subject may only contain letters, numbers, and `_-:|.` characters")]
    InvalidSubject,
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Local user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a textual UUID.
    pub fn parse(value: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static SUBJECT_RE: OnceLock<Regex> = OnceLock::new();

fn subject_regex() -> &'static Regex {
    SUBJECT_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_\-:|.]+$")
            .unwrap_or_else(|error| panic!("auth subject regex failed to compile: {error}"))
    })
}

/// Identifier assigned by the external auth provider (the token `sub`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthSubject(String);

impl AuthSubject {
    /// Validate and construct a subject.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(UserValidationError::EmptySubject);
        }
        if !subject_regex().is_match(&value) {
            return Err(UserValidationError::InvalidSubject);
        }
        Ok(Self(value))
    }

    /// Borrow the raw subject.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AuthSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AuthSubject {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthSubject> for String {
    fn from(value: AuthSubject) -> Self {
        value.0
    }
}

/// Answers captured by the onboarding questionnaire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingProfile {
    pub goal: Option<String>,
    pub net_worth_range: Option<String>,
    pub institution_count: Option<String>,
    pub entity_count: Option<String>,
    pub primary_concern: Option<String>,
}

/// E-mail notification switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub weekly_digest: bool,
    pub insight_alerts: bool,
    pub tax_alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            weekly_digest: true,
            insight_alerts: true,
            tax_alerts: true,
        }
    }
}

/// Partial update; `None` leaves the stored flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationSettingsPatch {
    pub weekly_digest: Option<bool>,
    pub insight_alerts: Option<bool>,
    pub tax_alerts: Option<bool>,
}

impl NotificationSettingsPatch {
    /// Apply the patch to `settings`.
    ///
    /// # Examples
    /// ```
    /// use patrimony::domain::{NotificationSettings, NotificationSettingsPatch};
    ///
    /// let patch = NotificationSettingsPatch { tax_alerts: Some(false), ..Default::default() };
    /// let updated = patch.apply(NotificationSettings::default());
    /// assert!(updated.weekly_digest);
    /// assert!(!updated.tax_alerts);
    /// ```
    pub fn apply(self, settings: NotificationSettings) -> NotificationSettings {
        NotificationSettings {
            weekly_digest: self.weekly_digest.unwrap_or(settings.weekly_digest),
            insight_alerts: self.insight_alerts.unwrap_or(settings.insight_alerts),
            tax_alerts: self.tax_alerts.unwrap_or(settings.tax_alerts),
        }
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.weekly_digest.is_none() && self.insight_alerts.is_none() && self.tax_alerts.is_none()
    }
}

/// Local user row mirrored from the auth provider.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub auth_subject: AuthSubject,
    pub email: String,
    pub name: Option<String>,
    pub onboarding: OnboardingProfile,
    pub notifications: NotificationSettings,
    pub created_at: DateTime<Utc>,
}
