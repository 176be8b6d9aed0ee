//! Access gating: resolve the signed-in user and check their subscription.
//!
//! Every protected surface calls [`AccessGate::current_user`] or
//! [`AccessGate::require_subscription`]. A refusal carries the page the
//! client should send the visitor to next.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use super::ports::{SubscriptionRepository, UserRepository};
use super::{AuthSubject, Error, Subscription, User};

/// Identity asserted by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIdentity {
    pub subject: AuthSubject,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// No verified session.
    SignIn,
    /// Signed in but no local user row yet.
    Onboarding,
    /// No active or trialing subscription.
    Pricing,
}

impl AccessDenied {
    /// Client route to redirect to.
    pub const fn redirect(self) -> &'static str {
        match self {
            Self::SignIn => "/sign-in",
            Self::Onboarding => "/onboarding",
            Self::Pricing => "/pricing",
        }
    }
}

impl From<AccessDenied> for Error {
    fn from(denied: AccessDenied) -> Self {
        let redirect = json!({ "redirect": denied.redirect() });
        match denied {
            AccessDenied::SignIn => Error::unauthorized("Unauthorized").with_details(redirect),
            AccessDenied::Onboarding => {
                Error::forbidden("Onboarding required").with_details(redirect)
            }
            AccessDenied::Pricing => Error::forbidden("Subscription required").with_details(json!({
                "code": "subscription_required",
                "redirect": denied.redirect(),
            })),
        }
    }
}

/// A user that passed the subscription check.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribedUser {
    pub user: User,
    pub subscription: Subscription,
}

/// Resolves identities to local users and enforces entitlement.
#[derive(Clone)]
pub struct AccessGate {
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl AccessGate {
    /// Build a gate over the user and subscription repositories.
    pub fn new(
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
        }
    }

    /// Local user for the session, or a sign-in/onboarding refusal.
    pub async fn current_user(&self, identity: Option<&AuthIdentity>) -> Result<User, Error> {
        let Some(identity) = identity else {
            return Err(AccessDenied::SignIn.into());
        };
        match self.users.find_by_subject(&identity.subject).await? {
            Some(user) => Ok(user),
            None => {
                debug!(subject = %identity.subject, "no local user for subject");
                Err(AccessDenied::Onboarding.into())
            }
        }
    }

    /// [`Self::current_user`] plus an active or trialing subscription.
    pub async fn require_subscription(
        &self,
        identity: Option<&AuthIdentity>,
    ) -> Result<SubscribedUser, Error> {
        let user = self.current_user(identity).await?;
        let subscription = self.subscriptions.find_for_user(&user.id).await?;
        match subscription {
            Some(subscription) if subscription.status.is_entitled() => Ok(SubscribedUser {
                user,
                subscription,
            }),
            other => {
                debug!(
                    user_id = %user.id,
                    status = other.as_ref().map(|s| s.status.as_str()),
                    "subscription not entitled"
                );
                Err(AccessDenied::Pricing.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
