//! Reversible encryption of subject identifiers.
//!
//! An identifier is written as a 16-digit zero-padded decimal string, which
//! is exactly one AES block. The block is encrypted with the derived cipher
//! key and rendered as unpadded URL-safe base64 (22 characters).
//!
//! Encryption is deterministic: the same identifier under the same key
//! always yields the same text.

use std::fmt;

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use data_encoding::BASE64URL_NOPAD;

use crate::error::{Result, TokenError};
use crate::key::CIPHER_KEY_LEN;

/// Number of decimal digits an identifier is padded to.
pub const ID_WIDTH: usize = 16;

/// Largest identifier that fits in `ID_WIDTH` digits.
pub const MAX_IDENTIFIER: u64 = 9_999_999_999_999_999;

/// Length of an encoded identifier.
pub const ENCODED_LEN: usize = 22;

/// Encrypts identifiers to URL-safe text and back.
pub struct IdentifierCodec {
    cipher: Aes128,
}

impl IdentifierCodec {
    pub fn new(key: &[u8; CIPHER_KEY_LEN]) -> Self {
        Self {
            cipher: Aes128::new(GenericArray::from_slice(key)),
        }
    }

    /// Encrypt `id` to URL-safe base64 without padding.
    pub fn encode(&self, id: u64) -> Result<String> {
        if id > MAX_IDENTIFIER {
            return Err(TokenError::IdentifierOutOfRange {
                id,
                max: MAX_IDENTIFIER,
            });
        }

        let digits = format!("{:0width$}", id, width = ID_WIDTH);
        let mut block = aes::Block::clone_from_slice(digits.as_bytes());
        self.cipher.encrypt_block(&mut block);

        Ok(BASE64URL_NOPAD.encode(&block))
    }

    /// Decrypt text produced by [`encode`](Self::encode).
    ///
    /// Returns `None` for anything that is not an encoded identifier:
    /// bad base64, a wrong length, or a plaintext that is not all digits.
    pub fn decode(&self, text: &str) -> Option<u64> {
        let bytes = match BASE64URL_NOPAD.decode(text.as_bytes()) {
            Ok(bytes) if bytes.len() == ID_WIDTH => bytes,
            _ => return None,
        };

        let mut block = aes::Block::clone_from_slice(&bytes);
        self.cipher.decrypt_block(&mut block);

        if !block.iter().all(u8::is_ascii_digit) {
            return None;
        }

        std::str::from_utf8(&block).ok()?.parse().ok()
    }
}

impl fmt::Debug for IdentifierCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentifierCodec { .. }")
    }
}
