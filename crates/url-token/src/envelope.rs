//! Timestamped, signed envelope around a text payload.
//!
//! # Format
//!
//! `{payload}.{timestamp}.{signature}`
//!
//! - `timestamp`: Unix seconds, big-endian with leading zero bytes dropped,
//!   unpadded URL-safe base64
//! - `signature`: HMAC-SHA256 over `{payload}.{timestamp}`, unpadded
//!   URL-safe base64
//!
//! The separator never appears in the base64url alphabet, so the two
//! right-most separators always split the token unambiguously.

use std::fmt;
use std::time::Duration;

use data_encoding::BASE64URL_NOPAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{Result, TokenError};
use crate::key::SIGNING_KEY_LEN;

type HmacSha256 = Hmac<Sha256>;

/// Separates payload, timestamp and signature.
pub const SEPARATOR: char = '.';

/// Length of an encoded signature.
pub const SIGNATURE_LEN: usize = 43;

/// Signs payloads and checks signed tokens.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    pub fn new(key: &[u8; SIGNING_KEY_LEN]) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|e| TokenError::KeyDerivation(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Append a timestamp and signature to `payload`.
    pub fn sign(&self, payload: &str, now: i64) -> String {
        let value = format!("{}{}{}", payload, SEPARATOR, encode_timestamp(now));
        let signature = BASE64URL_NOPAD.encode(&self.tag(value.as_bytes()));
        format!("{}{}{}", value, SEPARATOR, signature)
    }

    /// Check `token` and return its payload.
    ///
    /// Checks run in a fixed order: structure, then signature, then age.
    /// Anything wrong before the age check is reported as `BadSignature`.
    /// A timestamp ahead of `now` counts as expired.
    pub fn unsign<'a>(&self, token: &'a str, max_age: Duration, now: i64) -> Result<&'a str> {
        let (value, signature) = token
            .rsplit_once(SEPARATOR)
            .ok_or(TokenError::BadSignature("no separator found"))?;
        let (payload, timestamp) = value
            .rsplit_once(SEPARATOR)
            .ok_or(TokenError::BadSignature("timestamp missing"))?;
        let timestamp =
            decode_timestamp(timestamp).ok_or(TokenError::BadSignature("malformed timestamp"))?;
        let signature = BASE64URL_NOPAD
            .decode(signature.as_bytes())
            .map_err(|_| TokenError::BadSignature("malformed signature"))?;

        if !self.verify_tag(value.as_bytes(), &signature) {
            return Err(TokenError::BadSignature("signature does not match"));
        }

        let age = now.saturating_sub(timestamp);
        let max_secs = max_age.as_secs();
        if age < 0 || age as u64 > max_secs {
            return Err(TokenError::SignatureExpired {
                age,
                max_age: max_secs,
            });
        }

        Ok(payload)
    }

    fn tag(&self, message: &[u8]) -> [u8; 32] {
        let mut mac = self.mac.clone();
        mac.update(message);
        mac.finalize().into_bytes().into()
    }

    /// Constant-time comparison against a freshly computed tag.
    fn verify_tag(&self, message: &[u8], signature: &[u8]) -> bool {
        let expected = self.tag(message);
        expected.as_slice().ct_eq(signature).into()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Signer { .. }")
    }
}

fn encode_timestamp(now: i64) -> String {
    let bytes = (now.max(0) as u64).to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    BASE64URL_NOPAD.encode(&bytes[start..])
}

fn decode_timestamp(text: &str) -> Option<i64> {
    let bytes = BASE64URL_NOPAD.decode(text.as_bytes()).ok()?;
    if bytes.len() > 8 {
        return None;
    }
    let value = bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    i64::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const HOUR: Duration = Duration::from_secs(3600);

    fn signer() -> Signer {
        Signer::new(&[7u8; SIGNING_KEY_LEN]).unwrap()
    }

    #[test]
    fn test_sign_format() {
        let token = signer().sign("payload", NOW);
        let parts: Vec<&str> = token.split(SEPARATOR).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "payload");
        assert_eq!(parts[2].len(), SIGNATURE_LEN);
    }

    #[test]
    fn test_unsign_valid() {
        let signer = signer();
        let token = signer.sign("payload", NOW);
        assert_eq!(signer.unsign(&token, HOUR, NOW + 10).unwrap(), "payload");
    }

    #[test]
    fn test_timestamp_roundtrip() {
        for ts in [0, 1, 255, 256, NOW, i64::MAX] {
            assert_eq!(decode_timestamp(&encode_timestamp(ts)), Some(ts));
        }
    }

    #[test]
    fn test_age_boundaries() {
        let signer = signer();
        let token = signer.sign("payload", NOW);
        assert!(signer.unsign(&token, HOUR, NOW + 3600).is_ok());
        assert_eq!(
            signer.unsign(&token, HOUR, NOW + 3601),
            Err(TokenError::SignatureExpired {
                age: 3601,
                max_age: 3600
            })
        );
        assert!(matches!(
            signer.unsign(&token, Duration::ZERO, NOW + 1),
            Err(TokenError::SignatureExpired { age: 1, .. })
        ));
    }

    #[test]
    fn test_future_timestamp_is_expired() {
        let signer = signer();
        let token = signer.sign("payload", NOW + 60);
        assert!(matches!(
            signer.unsign(&token, HOUR, NOW),
            Err(TokenError::SignatureExpired { age: -60, .. })
        ));
    }

    #[test]
    fn test_wrong_key() {
        let token = signer().sign("payload", NOW);
        let other = Signer::new(&[8u8; SIGNING_KEY_LEN]).unwrap();
        assert!(matches!(
            other.unsign(&token, HOUR, NOW),
            Err(TokenError::BadSignature(_))
        ));
    }

    #[test]
    fn test_tampered_payload_and_timestamp() {
        let signer = signer();
        let token = signer.sign("payload", NOW);
        let (_, rest) = token.split_once(SEPARATOR).unwrap();

        let forged = format!("paylaod{}{}", SEPARATOR, rest);
        assert!(matches!(
            signer.unsign(&forged, HOUR, NOW),
            Err(TokenError::BadSignature(_))
        ));

        // Re-dating a stale token must not turn it into "expired" or "valid"
        let stale = signer.sign("payload", NOW - 10_000);
        let (value, signature) = stale.rsplit_once(SEPARATOR).unwrap();
        let (payload, _) = value.rsplit_once(SEPARATOR).unwrap();
        let redated = format!(
            "{}{}{}{}{}",
            payload,
            SEPARATOR,
            encode_timestamp(NOW),
            SEPARATOR,
            signature
        );
        assert!(matches!(
            signer.unsign(&redated, HOUR, NOW),
            Err(TokenError::BadSignature(_))
        ));
    }

    #[test]
    fn test_bad_signature_beats_expiry() {
        let signer = signer();
        let token = signer.sign("payload", NOW);
        let truncated = &token[..token.len() - 1];
        assert!(matches!(
            signer.unsign(truncated, Duration::ZERO, NOW + 10_000),
            Err(TokenError::BadSignature(_))
        ));
    }

    #[test]
    fn test_malformed_structure() {
        let signer = signer();
        for token in ["", "no-separators", "one.separator", "a.!!!.sig", "a.AAAAAAAAAAAA.sig"] {
            assert!(
                matches!(
                    signer.unsign(token, HOUR, NOW),
                    Err(TokenError::BadSignature(_))
                ),
                "{token:?} should be rejected"
            );
        }
    }
}
