//! Port for verifying identity-provider session tokens.

use crate::domain::AuthIdentity;

use super::define_port_error;

define_port_error! {
    /// Reasons a session token is refused.
    pub enum IdentityError {
        /// Signature, issuer or expiry checks failed.
        InvalidToken { message: String } => "invalid session token: {message}",
        /// The token verified but carried no usable subject.
        MissingSubject => "session token has no subject",
    }
}

/// Verifies session tokens issued by the identity provider.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    /// Verify `token` and return the identity it asserts.
    fn verify(&self, token: &str) -> Result<AuthIdentity, IdentityError>;
}

/// Fixture provider that refuses every token.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIdentityProvider;

impl IdentityProvider for FixtureIdentityProvider {
    fn verify(&self, _token: &str) -> Result<AuthIdentity, IdentityError> {
        Err(IdentityError::invalid_token("identity provider not configured"))
    }
}
