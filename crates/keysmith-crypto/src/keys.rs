//! Key and IV value types.
//!
//! Both travel as lowercase hex text outside this crate: 64 characters for a
//! key, 32 for an IV. Key bytes are wiped on drop and never printed by `Debug`.

use std::fmt;

use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Size of an AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the per-encryption IV in bytes.
pub const IV_SIZE: usize = 16;

/// A 256-bit symmetric key. Equality runs in constant time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Draws a new key from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// `RngUnavailable` when the OS source fails; there is no fallback.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; KEY_SIZE];
        fill_random(&mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!("expected {KEY_SIZE} bytes, got {}", bytes.len()))
        })?;
        Ok(Self { bytes })
    }

    /// Parses a 64-character hex key. Upper-case digits are accepted.
    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();
        if text.len() != KEY_SIZE * 2 {
            return Err(CryptoError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                KEY_SIZE * 2,
                text.len()
            )));
        }
        let mut bytes = [0u8; KEY_SIZE];
        hex::decode_to_slice(text, &mut bytes)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        Ok(Self { bytes })
    }

    /// Lowercase hex rendering, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for SymmetricKey {}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// A 128-bit initialization vector. Not secret, but must not repeat under one key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Iv {
    bytes: [u8; IV_SIZE],
}

impl Iv {
    /// Draws a fresh IV from the OS CSPRNG.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut bytes = [0u8; IV_SIZE];
        fill_random(&mut bytes)?;
        Ok(Self { bytes })
    }

    pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
        let text = text.trim();
        if text.len() != IV_SIZE * 2 {
            return Err(CryptoError::InvalidIv(format!(
                "expected {} hex characters, got {}",
                IV_SIZE * 2,
                text.len()
            )));
        }
        let mut bytes = [0u8; IV_SIZE];
        hex::decode_to_slice(text, &mut bytes).map_err(|e| CryptoError::InvalidIv(e.to_string()))?;
        Ok(Self { bytes })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.bytes
    }
}

impl From<[u8; IV_SIZE]> for Iv {
    fn from(bytes: [u8; IV_SIZE]) -> Self {
        Self { bytes }
    }
}

fn fill_random(dest: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|e| CryptoError::RngUnavailable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_key_is_64_lowercase_hex_chars() {
        let key = SymmetricKey::generate().expect("rng");
        let text = key.to_hex();

        assert_eq!(text.len(), 64);
        assert!(text
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn ten_thousand_generated_keys_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let text = SymmetricKey::generate().expect("rng").to_hex();
            assert_eq!(text.len(), 64);
            assert!(seen.insert(text), "duplicate key generated");
        }
    }

    #[test]
    fn hex_round_trip_preserves_bytes() {
        let key = SymmetricKey::generate().expect("rng");
        let parsed = SymmetricKey::from_hex(&key.to_hex()).expect("parse");
        assert_eq!(parsed, key);
    }

    #[test]
    fn from_hex_accepts_uppercase() {
        let upper = "AB".repeat(32);
        let key = SymmetricKey::from_hex(&upper).expect("parse");
        assert_eq!(key.to_hex(), "ab".repeat(32));
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = SymmetricKey::from_hex("abcd").expect_err("too short");
        assert!(matches!(err, CryptoError::InvalidKey(_)));
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let err = SymmetricKey::from_hex(&"zz".repeat(32)).expect_err("not hex");
        assert!(matches!(err, CryptoError::InvalidKey(_)));
    }

    #[test]
    fn from_bytes_rejects_short_input() {
        let err = SymmetricKey::from_bytes(&[0u8; 16]).expect_err("short key");
        assert!(matches!(err, CryptoError::InvalidKey(_)));
    }

    #[test]
    fn equality_compares_every_byte() {
        let base = SymmetricKey::from_bytes(&[0x11; KEY_SIZE]).expect("key");
        let same = SymmetricKey::from_bytes(&[0x11; KEY_SIZE]).expect("key");
        let mut last_differs = [0x11; KEY_SIZE];
        last_differs[KEY_SIZE - 1] = 0x12;
        let other = SymmetricKey::from_bytes(&last_differs).expect("key");

        assert_eq!(base, same);
        assert_ne!(base, other);
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = SymmetricKey::from_bytes(&[0x42; KEY_SIZE]).expect("key");
        let debug = format!("{key:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("42"));
    }

    #[test]
    fn iv_is_32_hex_chars_and_fresh() {
        let first = Iv::generate().expect("rng");
        let second = Iv::generate().expect("rng");

        assert_eq!(first.to_hex().len(), 32);
        assert_ne!(first, second);
    }

    #[test]
    fn iv_from_hex_rejects_key_length_input() {
        let err = Iv::from_hex(&"00".repeat(32)).expect_err("64 chars is a key, not an iv");
        assert!(matches!(err, CryptoError::InvalidIv(_)));
    }
}
