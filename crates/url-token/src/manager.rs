//! Token generation and verification.

use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::codec::IdentifierCodec;
use crate::config::TokenConfig;
use crate::envelope::Signer;
use crate::error::{Result, TokenError};
use crate::key::DerivedKeys;

/// Result of checking a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Signature and age are fine; carries the subject id.
    Valid(u64),
    /// Signature is fine but the token is too old.
    Expired,
    /// Malformed, tampered, or signed with another key.
    Invalid,
}

impl VerifyOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyOutcome::Valid(_))
    }

    pub fn has_expired(&self) -> bool {
        matches!(self, VerifyOutcome::Expired)
    }

    pub fn subject_id(&self) -> Option<u64> {
        match self {
            VerifyOutcome::Valid(id) => Some(*id),
            _ => None,
        }
    }

    /// `(is_valid, has_expired, subject_id)`.
    pub fn into_parts(self) -> (bool, bool, Option<u64>) {
        (self.is_valid(), self.has_expired(), self.subject_id())
    }
}

/// Issues and verifies URL-safe tokens carrying an encrypted subject id.
///
/// Holds only keys derived at construction, so a single instance can be
/// shared across threads without locking.
#[derive(Debug)]
pub struct TokenManager<C = SystemClock> {
    codec: IdentifierCodec,
    signer: Signer,
    clock: C,
}

impl TokenManager<SystemClock> {
    /// Create a manager using wall-clock time.
    pub fn new(secret: impl AsRef<[u8]>, config: &TokenConfig) -> Result<Self> {
        Self::with_clock(secret, config, SystemClock)
    }
}

impl<C: Clock> TokenManager<C> {
    /// Create a manager reading time from `clock`.
    pub fn with_clock(secret: impl AsRef<[u8]>, config: &TokenConfig, clock: C) -> Result<Self> {
        let keys = DerivedKeys::derive(secret.as_ref(), config)?;
        Ok(Self {
            codec: IdentifierCodec::new(keys.cipher_key()),
            signer: Signer::new(keys.signing_key())?,
            clock,
        })
    }

    /// Issue a token for `subject_id` stamped with the current time.
    pub fn generate_token(&self, subject_id: u64) -> Result<String> {
        self.generate_token_at(subject_id, self.clock.now())
    }

    /// Issue a token for `subject_id` stamped with `now`.
    pub fn generate_token_at(&self, subject_id: u64, now: i64) -> Result<String> {
        let payload = self.codec.encode(subject_id)?;
        Ok(self.signer.sign(&payload, now))
    }

    /// Check a token against the current time.
    pub fn verify_token(&self, token: &str, max_age: Duration) -> VerifyOutcome {
        self.verify_token_at(token, max_age, self.clock.now())
    }

    /// Check a token as of `now`. Never fails: every problem with the
    /// token maps to `Expired` or `Invalid`.
    pub fn verify_token_at(&self, token: &str, max_age: Duration, now: i64) -> VerifyOutcome {
        let payload = match self.signer.unsign(token, max_age, now) {
            Ok(payload) => payload,
            Err(TokenError::SignatureExpired { age, max_age }) => {
                log::debug!("Token expired: age {}s exceeds {}s", age, max_age);
                return VerifyOutcome::Expired;
            }
            Err(e) => {
                log::debug!("Token rejected: {}", e);
                return VerifyOutcome::Invalid;
            }
        };

        match self.codec.decode(payload) {
            Some(id) => VerifyOutcome::Valid(id),
            None => {
                log::debug!("Token rejected: signed payload is not an identifier");
                VerifyOutcome::Invalid
            }
        }
    }

    /// Access the identifier codec directly.
    pub fn codec(&self) -> &IdentifierCodec {
        &self.codec
    }
}
