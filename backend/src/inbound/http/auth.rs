//! Request extractors that resolve the caller and apply the access gate.
//!
//! The session token comes from `Authorization: Bearer …`, falling back to
//! the `__session` cookie. Extractors fail with the gate's redirect errors,
//! so handlers only name the level of access they need:
//!
//! - [`SessionIdentity`]: verified identity, possibly absent
//! - [`CurrentUser`]: a local user row exists
//! - [`Subscriber`]: the user has an active or trialing subscription
//! - [`CronCaller`]: bearer token equals the cron secret

use actix_web::dev::Payload;
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{AccessDenied, AuthIdentity, Error, SubscribedUser, User};
use crate::inbound::http::state::HttpState;

/// Cookie carrying the identity provider's session token.
pub const SESSION_COOKIE: &str = "__session";

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn session_token(req: &HttpRequest) -> Option<String> {
    bearer_token(req.headers())
        .map(str::to_owned)
        .or_else(|| req.cookie(SESSION_COOKIE).map(|c| c.value().to_owned()))
}

fn state(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state not configured"))
}

fn resolve_identity(req: &HttpRequest, state: &HttpState) -> Option<AuthIdentity> {
    let token = session_token(req)?;
    match state.identity.verify(&token) {
        Ok(identity) => Some(identity),
        Err(err) => {
            debug!(error = %err, "session token rejected");
            None
        }
    }
}

/// Verified identity of the caller, if any.
#[derive(Debug, Clone)]
pub struct SessionIdentity(pub Option<AuthIdentity>);

impl SessionIdentity {
    /// The identity, or the sign-in refusal.
    pub fn require(self) -> Result<AuthIdentity, Error> {
        self.0.ok_or_else(|| AccessDenied::SignIn.into())
    }
}

impl FromRequest for SessionIdentity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = state(req).map(|state| Self(resolve_identity(req, &state)));
        Box::pin(async move { result })
    }
}

/// Signed-in caller with a local user row.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: AuthIdentity,
    pub user: User,
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = state(req).map(|state| {
            let identity = resolve_identity(req, &state);
            (state, identity)
        });
        Box::pin(async move {
            let (state, identity) = resolved?;
            let user = state.gate.current_user(identity.as_ref()).await?;
            let identity = identity.ok_or_else(|| Error::from(AccessDenied::SignIn))?;
            Ok(Self { identity, user })
        })
    }
}

/// Caller with an active or trialing subscription.
#[derive(Debug, Clone)]
pub struct Subscriber(pub SubscribedUser);

impl Subscriber {
    pub fn user(&self) -> &User {
        &self.0.user
    }
}

impl FromRequest for Subscriber {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let resolved = state(req).map(|state| {
            let identity = resolve_identity(req, &state);
            (state, identity)
        });
        Box::pin(async move {
            let (state, identity) = resolved?;
            let subscribed = state.gate.require_subscription(identity.as_ref()).await?;
            Ok(Self(subscribed))
        })
    }
}

/// Scheduler call carrying the cron bearer secret.
#[derive(Debug, Clone, Copy)]
pub struct CronCaller;

fn check_cron_secret(headers: &HeaderMap, secret: Option<&str>) -> Result<CronCaller, Error> {
    match (bearer_token(headers), secret) {
        (Some(token), Some(secret)) if token == secret => Ok(CronCaller),
        _ => Err(Error::unauthorized("Unauthorized")),
    }
}

impl FromRequest for CronCaller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = state(req)
            .and_then(|state| check_cron_secret(req.headers(), state.cron_secret.as_deref()));
        Box::pin(async move { result })
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
