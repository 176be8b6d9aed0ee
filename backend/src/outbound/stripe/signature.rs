//! `Stripe-Signature` header verification.
//!
//! The header carries `t=<unix seconds>` and one or more `v1=<hex>` entries.
//! Each `v1` is an HMAC-SHA256 of `"{t}.{body}"` under the endpoint secret.

use ring::hmac;

use crate::domain::ports::PaymentsError;

/// Signatures older or newer than this many seconds are refused.
pub(super) const TOLERANCE_SECONDS: i64 = 300;

#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, PaymentsError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = value.parse::<i64>().ok();
            }
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }
    let timestamp =
        timestamp.ok_or_else(|| PaymentsError::invalid_signature("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(PaymentsError::invalid_signature("no v1 signatures"));
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Check `header` against `payload` at unix time `now`.
pub(super) fn verify(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
) -> Result<(), PaymentsError> {
    let parsed = parse_header(header)?;
    if now.abs_diff(parsed.timestamp) > TOLERANCE_SECONDS.unsigned_abs() {
        return Err(PaymentsError::invalid_signature(
            "timestamp outside the tolerance zone",
        ));
    }
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let mut signed = format!("{}.", parsed.timestamp).into_bytes();
    signed.extend_from_slice(payload);
    let matched = parsed
        .signatures
        .iter()
        .any(|signature| hmac::verify(&key, &signed, signature).is_ok());
    if matched {
        Ok(())
    } else {
        Err(PaymentsError::invalid_signature(
            "no signature matched the payload",
        ))
    }
}

/// Header value for `payload` signed at `timestamp`.
#[cfg(test)]
pub(super) fn sign(secret: &str, payload: &[u8], timestamp: i64) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let mut signed = format!("{timestamp}.").into_bytes();
    signed.extend_from_slice(payload);
    let tag = hmac::sign(&key, &signed);
    format!("t={timestamp},v1={}", hex::encode(tag.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"type":"invoice.payment_failed"}"#;
    const NOW: i64 = 1_790_000_000;

    #[rstest]
    #[case(0)]
    #[case(-TOLERANCE_SECONDS)]
    #[case(TOLERANCE_SECONDS)]
    fn accepts_signatures_inside_tolerance(#[case] skew: i64) {
        let header = sign(SECRET, BODY, NOW + skew);
        assert_eq!(verify(SECRET, BODY, &header, NOW), Ok(()));
    }

    #[test]
    fn rejects_expired_signature() {
        let header = sign(SECRET, BODY, NOW - TOLERANCE_SECONDS - 1);
        assert!(verify(SECRET, BODY, &header, NOW).is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = sign("whsec_other", BODY, NOW);
        assert!(verify(SECRET, BODY, &header, NOW).is_err());
    }

    #[test]
    fn any_matching_v1_entry_is_enough() {
        let valid = sign(SECRET, BODY, NOW);
        let entry = valid.split_once(',').map_or("", |(_, v)| v);
        let header = format!("t={NOW},v1=deadbeef,{entry}");
        assert_eq!(verify(SECRET, BODY, &header, NOW), Ok(()));
    }

    #[rstest]
    #[case(i64::MIN)]
    #[case(i64::MAX)]
    fn extreme_timestamps_are_outside_tolerance(#[case] timestamp: i64) {
        let header = format!("t={timestamp},v1=00");
        assert!(matches!(
            verify(SECRET, BODY, &header, NOW),
            Err(PaymentsError::InvalidSignature { .. })
        ));
    }

    #[rstest]
    #[case("v1=abcd")]
    #[case("t=123")]
    #[case("garbage")]
    fn malformed_headers_are_invalid(#[case] header: &str) {
        assert!(matches!(
            verify(SECRET, BODY, header, NOW),
            Err(PaymentsError::InvalidSignature { .. })
        ));
    }
}
