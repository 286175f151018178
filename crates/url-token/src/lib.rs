//! Tamper-evident, expiring URL tokens carrying an account id.
//!
//! This crate provides functionality for:
//! - Encrypting a numeric subject id into a fixed-width, URL-safe payload
//! - Wrapping the payload in a timestamped HMAC-SHA256 envelope
//! - Verifying tokens into one of three outcomes: valid, expired, invalid
//!
//! # Token Format
//!
//! Tokens follow the format: `{encrypted_id}.{timestamp}.{signature}`
//!
//! All three parts use unpadded URL-safe base64, so tokens can be dropped
//! into a URL path or query string as they are.
//!
//! # Security Features
//!
//! - AES-128 encryption of the zero-padded id (deterministic: the same id
//!   always produces the same payload under one key)
//! - HKDF-SHA256 derivation of separate cipher and signing keys
//! - Constant-time signature comparison
//! - Memory zeroization of derived keys on drop
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use url_token::{TokenConfig, TokenManager, VerifyOutcome};
//!
//! let manager = TokenManager::new("supersecretkey16", &TokenConfig::default()).unwrap();
//!
//! // Embed the token in a confirmation link
//! let token = manager.generate_token(42).unwrap();
//!
//! // Later, when the link is followed
//! let outcome = manager.verify_token(&token, Duration::from_secs(3600));
//! assert_eq!(outcome, VerifyOutcome::Valid(42));
//! ```

mod clock;
mod codec;
mod config;
mod envelope;
mod error;
mod key;
mod manager;

// Public re-exports
pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{ENCODED_LEN, ID_WIDTH, IdentifierCodec, MAX_IDENTIFIER};
pub use config::{DEFAULT_SALT, KeyDerivation, TokenConfig};
pub use envelope::{SEPARATOR, SIGNATURE_LEN, Signer};
pub use error::{Result, TokenError};
pub use key::{CIPHER_KEY_LEN, DerivedKeys, SIGNING_KEY_LEN, padded_key};
pub use manager::{TokenManager, VerifyOutcome};
