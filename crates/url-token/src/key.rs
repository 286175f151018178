//! Key derivation from the process secret.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{KeyDerivation, TokenConfig};
use crate::error::{Result, TokenError};

/// Length of the identifier cipher key (AES-128).
pub const CIPHER_KEY_LEN: usize = 16;

/// Length of the envelope signing key (HMAC-SHA256).
pub const SIGNING_KEY_LEN: usize = 32;

/// Filler appended to short secrets by the padded scheme.
const KEY_FILLER: &[u8; CIPHER_KEY_LEN] = b"0123456789abcdef";

const CIPHER_INFO: &[u8] = b"identifier-cipher";
const SIGNING_INFO: &[u8] = b"envelope-signer";

/// Keys derived from the secret. Cleared from memory on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeys {
    cipher: [u8; CIPHER_KEY_LEN],
    signing: [u8; SIGNING_KEY_LEN],
}

impl DerivedKeys {
    /// Derive the cipher and signing keys from `secret`.
    ///
    /// The signing key always comes from HKDF. The cipher key follows
    /// `config.key_derivation`.
    pub fn derive(secret: &[u8], config: &TokenConfig) -> Result<Self> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let salt = config.salt.as_bytes();
        let signing = hkdf_expand::<SIGNING_KEY_LEN>(secret, salt, SIGNING_INFO)?;
        let cipher = match config.key_derivation {
            KeyDerivation::Hkdf => hkdf_expand::<CIPHER_KEY_LEN>(secret, salt, CIPHER_INFO)?,
            KeyDerivation::Padded => {
                if secret.len() < CIPHER_KEY_LEN {
                    log::warn!(
                        "Secret key is {} bytes; padded cipher key derivation fills the rest with a public constant",
                        secret.len()
                    );
                }
                padded_key(secret)
            }
        };

        Ok(Self { cipher, signing })
    }

    pub fn cipher_key(&self) -> &[u8; CIPHER_KEY_LEN] {
        &self.cipher
    }

    pub fn signing_key(&self) -> &[u8; SIGNING_KEY_LEN] {
        &self.signing
    }
}

impl fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKeys { .. }")
    }
}

/// First 16 bytes of `secret || KEY_FILLER`.
pub fn padded_key(secret: &[u8]) -> [u8; CIPHER_KEY_LEN] {
    let mut key = [0u8; CIPHER_KEY_LEN];
    let take = secret.len().min(CIPHER_KEY_LEN);
    key[..take].copy_from_slice(&secret[..take]);
    if take < CIPHER_KEY_LEN {
        // Filler starts right after the secret, not at its own offset.
        key[take..].copy_from_slice(&KEY_FILLER[..CIPHER_KEY_LEN - take]);
    }
    key
}

fn hkdf_expand<const N: usize>(ikm: &[u8], salt: &[u8], info: &[u8]) -> Result<[u8; N]> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = [0u8; N];
    hk.expand(info, &mut okm)
        .map_err(|e| TokenError::KeyDerivation(format!("HKDF expand failed: {}", e)))?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_rejected() {
        let result = DerivedKeys::derive(b"", &TokenConfig::default());
        assert!(matches!(result, Err(TokenError::MissingSecret)));
    }

    #[test]
    fn test_padded_short_secret() {
        assert_eq!(&padded_key(b"abc"), b"abc0123456789abc");
    }

    #[test]
    fn test_derive_padded_short_secret() {
        let config = TokenConfig::default().with_key_derivation(KeyDerivation::Padded);
        let keys = DerivedKeys::derive(b"abc", &config).unwrap();
        assert_eq!(keys.cipher_key(), b"abc0123456789abc");

        let hkdf = DerivedKeys::derive(b"abc", &TokenConfig::default()).unwrap();
        assert_eq!(keys.signing_key(), hkdf.signing_key());
    }

    #[test]
    fn test_padded_exact_and_long_secret() {
        assert_eq!(&padded_key(b"supersecretkey16"), b"supersecretkey16");
        assert_eq!(&padded_key(b"my-super-secret-key"), b"my-super-secret-");
    }

    #[test]
    fn test_hkdf_deterministic() {
        let config = TokenConfig::default();
        let a = DerivedKeys::derive(b"secret", &config).unwrap();
        let b = DerivedKeys::derive(b"secret", &config).unwrap();
        assert_eq!(a.cipher_key(), b.cipher_key());
        assert_eq!(a.signing_key(), b.signing_key());
    }

    #[test]
    fn test_hkdf_changes_with_salt() {
        let a = DerivedKeys::derive(b"secret", &TokenConfig::new("salt-a")).unwrap();
        let b = DerivedKeys::derive(b"secret", &TokenConfig::new("salt-b")).unwrap();
        assert_ne!(a.cipher_key(), b.cipher_key());
        assert_ne!(a.signing_key(), b.signing_key());
    }

    #[test]
    fn test_cipher_and_signing_keys_differ() {
        let keys = DerivedKeys::derive(b"secret", &TokenConfig::default()).unwrap();
        assert_ne!(&keys.signing_key()[..CIPHER_KEY_LEN], keys.cipher_key());
    }

    #[test]
    fn test_padded_mode_keeps_hkdf_signing_key() {
        let hkdf = DerivedKeys::derive(b"secret", &TokenConfig::default()).unwrap();
        let padded = DerivedKeys::derive(
            b"secret",
            &TokenConfig::default().with_key_derivation(KeyDerivation::Padded),
        )
        .unwrap();
        assert_eq!(padded.cipher_key(), b"secret0123456789");
        assert_eq!(hkdf.signing_key(), padded.signing_key());
    }

    #[test]
    fn test_debug_is_redacted() {
        let keys = DerivedKeys::derive(b"supersecretkey16", &TokenConfig::default()).unwrap();
        assert_eq!(format!("{:?}", keys), "DerivedKeys { .. }");
    }
}
