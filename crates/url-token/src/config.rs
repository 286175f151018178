//! Configuration for token generation and validation.

use serde::Deserialize;

/// Default salt mixed into key derivation.
pub const DEFAULT_SALT: &str = "url-token.v1";

/// How the fixed-size cipher key is obtained from the secret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyDerivation {
    /// HKDF-SHA256 over the secret.
    #[default]
    Hkdf,
    /// Secret followed by a fixed filler, truncated to 16 bytes.
    /// Produces tokens compatible with the padded-key scheme.
    Padded,
}

/// Configuration for token generation and validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Salt for key derivation. Tokens only verify under the same salt.
    pub salt: String,
    /// Cipher key derivation scheme.
    pub key_derivation: KeyDerivation,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            salt: DEFAULT_SALT.to_string(),
            key_derivation: KeyDerivation::default(),
        }
    }
}

impl TokenConfig {
    /// Create a new config with the given salt.
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: salt.into(),
            ..Self::default()
        }
    }

    /// Set the cipher key derivation scheme.
    pub fn with_key_derivation(mut self, key_derivation: KeyDerivation) -> Self {
        self.key_derivation = key_derivation;
        self
    }
}
