//! Verification of Plaid's signed webhook header.
//!
//! Plaid signs each delivery with an ES256 JWT in `Plaid-Verification`.
//! The payload carries `iat` and the SHA-256 of the raw body; the signing
//! key is fetched by `kid` and cached.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::Jwk;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use mockable::Clock;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::warn;

use super::PlaidHttpClient;
use super::dto::{VerificationKeyRequest, VerificationKeyResponse};
use crate::domain::ports::{PlaidWebhookVerifier, WebhookVerificationError};

/// Deliveries signed longer ago than this are refused.
const MAX_TOKEN_AGE_SECONDS: i64 = 5 * 60;

/// Tolerated clock drift for tokens issued slightly ahead of local time.
const MAX_CLOCK_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Deserialize)]
struct VerificationClaims {
    iat: i64,
    request_body_sha256: String,
}

/// Checks `Plaid-Verification` headers against keys fetched from Plaid.
pub struct PlaidJwtWebhookVerifier {
    client: PlaidHttpClient,
    clock: Arc<dyn Clock>,
    keys: RwLock<HashMap<String, Jwk>>,
}

impl PlaidJwtWebhookVerifier {
    pub fn new(client: PlaidHttpClient, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            clock,
            keys: RwLock::new(HashMap::new()),
        }
    }

    async fn key_for(&self, kid: &str) -> Result<Jwk, WebhookVerificationError> {
        if let Some(key) = self.keys.read().await.get(kid) {
            return Ok(key.clone());
        }
        let response: VerificationKeyResponse = self
            .client
            .post(
                "/webhook_verification_key/get",
                &VerificationKeyRequest { key_id: kid },
            )
            .await
            .map_err(|err| WebhookVerificationError::key_unavailable(err.to_string()))?;
        self.keys
            .write()
            .await
            .insert(kid.to_owned(), response.key.clone());
        Ok(response.key)
    }
}

#[async_trait]
impl PlaidWebhookVerifier for PlaidJwtWebhookVerifier {
    async fn verify(&self, header: &str, body: &[u8]) -> Result<(), WebhookVerificationError> {
        let token = header.trim();
        if token.is_empty() {
            return Err(WebhookVerificationError::missing_signature());
        }
        let jwt_header = decode_header(token)
            .map_err(|err| WebhookVerificationError::invalid_signature(err.to_string()))?;
        if jwt_header.alg != Algorithm::ES256 {
            return Err(WebhookVerificationError::invalid_signature(format!(
                "unexpected algorithm {:?}",
                jwt_header.alg
            )));
        }
        let kid = jwt_header
            .kid
            .ok_or_else(|| WebhookVerificationError::invalid_signature("missing key id"))?;
        let jwk = self.key_for(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)
            .map_err(|err| WebhookVerificationError::key_unavailable(err.to_string()))?;
        let claims = decode::<VerificationClaims>(token, &key, &validation())
            .map_err(|err| WebhookVerificationError::invalid_signature(err.to_string()))?
            .claims;
        check_claims(&claims, body, self.clock.utc().timestamp())
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::ES256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation
}

fn check_claims(
    claims: &VerificationClaims,
    body: &[u8],
    now: i64,
) -> Result<(), WebhookVerificationError> {
    let age = now.checked_sub(claims.iat).unwrap_or(i64::MAX);
    if age > MAX_TOKEN_AGE_SECONDS {
        warn!(iat = claims.iat, "stale plaid webhook");
        return Err(WebhookVerificationError::invalid_signature(
            "verification token too old",
        ));
    }
    if age < -MAX_CLOCK_SKEW_SECONDS {
        warn!(iat = claims.iat, "future-dated plaid webhook");
        return Err(WebhookVerificationError::invalid_signature(
            "verification token issued in the future",
        ));
    }
    let digest = hex::encode(Sha256::digest(body));
    if !digest.eq_ignore_ascii_case(&claims.request_body_sha256) {
        return Err(WebhookVerificationError::invalid_signature(
            "body hash mismatch",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BODY: &[u8] = br#"{"webhook_type":"TRANSACTIONS","webhook_code":"DEFAULT_UPDATE","item_id":"item-1"}"#;

    fn claims(iat: i64, body: &[u8]) -> VerificationClaims {
        VerificationClaims {
            iat,
            request_body_sha256: hex::encode(Sha256::digest(body)),
        }
    }

    #[rstest]
    #[case(0)]
    #[case(60)]
    #[case(MAX_TOKEN_AGE_SECONDS)]
    #[case(-MAX_CLOCK_SKEW_SECONDS)]
    fn accepts_fresh_matching_claims(#[case] age: i64) {
        let now = 1_790_000_000;
        assert_eq!(check_claims(&claims(now - age, BODY), BODY, now), Ok(()));
    }

    #[test]
    fn rejects_stale_tokens() {
        let now = 1_790_000_000;
        let result = check_claims(&claims(now - MAX_TOKEN_AGE_SECONDS - 1, BODY), BODY, now);
        assert!(matches!(
            result,
            Err(WebhookVerificationError::InvalidSignature { .. })
        ));
    }

    #[rstest]
    #[case(MAX_CLOCK_SKEW_SECONDS + 1)]
    #[case(3_600)]
    fn rejects_future_dated_tokens(#[case] ahead: i64) {
        let now = 1_790_000_000;
        let result = check_claims(&claims(now + ahead, BODY), BODY, now);
        assert!(matches!(
            result,
            Err(WebhookVerificationError::InvalidSignature { .. })
        ));
    }

    #[rstest]
    #[case(i64::MIN)]
    #[case(i64::MAX)]
    fn rejects_extreme_issue_times(#[case] iat: i64) {
        let now = 1_790_000_000;
        assert!(check_claims(&claims(iat, BODY), BODY, now).is_err());
    }

    #[test]
    fn rejects_tampered_bodies() {
        let now = 1_790_000_000;
        let result = check_claims(&claims(now, BODY), b"{}", now);
        assert!(matches!(
            result,
            Err(WebhookVerificationError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn validation_skips_expiry() {
        let validation = validation();
        assert!(!validation.validate_exp);
        assert!(validation.required_spec_claims.is_empty());
    }
}
