//! Error types for token operations.

use thiserror::Error;

/// Errors that can occur while building a token manager, issuing a token
/// or unwrapping one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Secret key is missing or empty
    #[error("Secret key must not be empty")]
    MissingSecret,

    /// Key derivation rejected the requested output length
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Subject id does not fit the fixed-width encoding
    #[error("Identifier {id} exceeds the maximum of {max}")]
    IdentifierOutOfRange { id: u64, max: u64 },

    /// Token is malformed or its signature does not match
    #[error("Bad signature: {0}")]
    BadSignature(&'static str),

    /// Signature is valid but the timestamp is outside the allowed window
    #[error("Signature expired: age {age}s, max age {max_age}s")]
    SignatureExpired { age: i64, max_age: u64 },
}

impl TokenError {
    /// Whether this error is a construction-time misconfiguration.
    pub fn is_config(&self) -> bool {
        matches!(self, TokenError::MissingSecret | TokenError::KeyDerivation(_))
    }
}

/// Result type alias for token operations.
pub type Result<T> = std::result::Result<T, TokenError>;
