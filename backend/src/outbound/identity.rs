//! Session token verification against the identity provider's RS256 key.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::domain::ports::{IdentityError, IdentityProvider};
use crate::domain::{AuthIdentity, AuthSubject};

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: Option<String>,
    email: Option<String>,
    name: Option<String>,
}

/// Verifies RS256 session JWTs with a PEM public key.
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    /// Build a provider from a PEM-encoded RSA public key.
    ///
    /// # Errors
    ///
    /// Returns the decoding error when the PEM is not an RSA public key.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_rsa_pem(pem)?;
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 30;
        validation.validate_aud = false;
        Ok(Self { key, validation })
    }
}

impl IdentityProvider for JwtIdentityProvider {
    fn verify(&self, token: &str) -> Result<AuthIdentity, IdentityError> {
        let claims = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|err| IdentityError::invalid_token(err.to_string()))?
            .claims;
        let subject = claims
            .sub
            .and_then(|sub| AuthSubject::new(sub).ok())
            .ok_or_else(IdentityError::missing_subject)?;
        Ok(AuthIdentity {
            subject,
            email: claims.email,
            name: claims.name,
        })
    }
}
