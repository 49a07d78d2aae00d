//! AES-256-GCM file cipher.
//!
//! GCM is driven with a 128-bit nonce so the IV keeps the familiar 32-hex-char
//! shape while the tag makes wrong keys, wrong IVs and tampering detectable.
//! Ciphertext layout: `encrypted bytes || tag (16 bytes)`. The IV travels
//! separately.

use aes_gcm::{
    aead::{consts::U16, Aead, KeyInit},
    aes::Aes256,
    AesGcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::{Iv, SymmetricKey};

/// Size of the GCM authentication tag appended to every ciphertext.
pub const TAG_SIZE: usize = 16;

type Aes256Gcm128 = AesGcm<Aes256, U16>;

/// Ciphertext paired with the IV it was sealed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedFile {
    pub ciphertext: Vec<u8>,
    pub iv: Iv,
}

impl EncryptedFile {
    /// IV as 32 lowercase hex characters.
    pub fn iv_hex(&self) -> String {
        self.iv.to_hex()
    }

    /// Text-safe form: `<iv hex>:<base64 ciphertext>`.
    pub fn to_armored(&self) -> String {
        format!("{}:{}", self.iv.to_hex(), STANDARD.encode(&self.ciphertext))
    }

    pub fn from_armored(text: &str) -> Result<Self, CryptoError> {
        let (iv, body) = text
            .trim()
            .split_once(':')
            .ok_or_else(|| CryptoError::InvalidArmor("missing ':' separator".to_string()))?;
        let iv = Iv::from_hex(iv)?;
        let ciphertext = STANDARD
            .decode(body)
            .map_err(|e| CryptoError::InvalidArmor(e.to_string()))?;
        Ok(Self { ciphertext, iv })
    }
}

/// Encrypts `plaintext` under `key` with a freshly generated IV.
pub fn encrypt(key: &SymmetricKey, plaintext: &[u8]) -> Result<EncryptedFile, CryptoError> {
    let iv = Iv::generate()?;
    let ciphertext = seal(key, &iv, plaintext)?;
    debug!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "sealed payload"
    );
    Ok(EncryptedFile { ciphertext, iv })
}

/// Decrypts a payload produced by [`encrypt`], returning the exact original bytes.
///
/// Any mismatch in key, IV, or ciphertext surfaces as `DecryptionFailed`.
pub fn decrypt(
    key: &SymmetricKey,
    iv: &Iv,
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if ciphertext.len() < TAG_SIZE {
        return Err(CryptoError::DecryptionFailed(
            "ciphertext too short".to_string(),
        ));
    }

    let cipher = build_cipher(key)?;
    let plaintext = cipher
        .decrypt(Nonce::<U16>::from_slice(iv.as_bytes()), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed("authentication failed".to_string()))?;

    Ok(Zeroizing::new(plaintext))
}

fn seal(key: &SymmetricKey, iv: &Iv, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = build_cipher(key)?;
    cipher
        .encrypt(Nonce::<U16>::from_slice(iv.as_bytes()), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

fn build_cipher(key: &SymmetricKey) -> Result<Aes256Gcm128, CryptoError> {
    Aes256Gcm128::new_from_slice(key.as_bytes()).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SymmetricKey {
        SymmetricKey::generate().expect("rng")
    }

    #[test]
    fn round_trip_returns_original_bytes() {
        let key = key();
        let plaintext = b"\x00\x01\xfe\xffbinary\x80payload";

        let sealed = encrypt(&key, plaintext).expect("encrypt");
        let opened = decrypt(&key, &sealed.iv, &sealed.ciphertext).expect("decrypt");

        assert_eq!(&*opened, plaintext);
    }

    #[test]
    fn ten_byte_file_round_trips() {
        let key = SymmetricKey::from_hex(
            "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90",
        )
        .expect("key");
        let file = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        let sealed = encrypt(&key, &file).expect("encrypt");
        let iv = Iv::from_hex(&sealed.iv_hex()).expect("iv");
        let opened = decrypt(&key, &iv, &sealed.ciphertext).expect("decrypt");

        assert_eq!(&*opened, &file);
    }

    #[test]
    fn empty_payload_round_trips() {
        let key = key();
        let sealed = encrypt(&key, b"").expect("encrypt");
        assert_eq!(sealed.ciphertext.len(), TAG_SIZE);

        let opened = decrypt(&key, &sealed.iv, &sealed.ciphertext).expect("decrypt");
        assert!(opened.is_empty());
    }

    #[test]
    fn ciphertext_is_plaintext_plus_tag() {
        let sealed = encrypt(&key(), b"test").expect("encrypt");
        assert_eq!(sealed.ciphertext.len(), 4 + TAG_SIZE);
    }

    #[test]
    fn each_encryption_uses_a_fresh_iv() {
        let key = key();
        let first = encrypt(&key, b"same").expect("encrypt");
        let second = encrypt(&key, b"same").expect("encrypt");

        assert_ne!(first.iv, second.iv);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = encrypt(&key(), b"secret data").expect("encrypt");
        let err = decrypt(&key(), &sealed.iv, &sealed.ciphertext).expect_err("wrong key");
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn wrong_iv_fails() {
        let key = key();
        let sealed = encrypt(&key, b"secret data").expect("encrypt");
        let other = Iv::generate().expect("rng");

        let err = decrypt(&key, &other, &sealed.ciphertext).expect_err("wrong iv");
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = key();
        let mut sealed = encrypt(&key, b"secret data").expect("encrypt");
        sealed.ciphertext[0] ^= 0xFF;

        let err = decrypt(&key, &sealed.iv, &sealed.ciphertext).expect_err("tampered");
        assert!(matches!(err, CryptoError::DecryptionFailed(_)));
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let key = key();
        let sealed = encrypt(&key, b"secret data").expect("encrypt");

        let cut = &sealed.ciphertext[..sealed.ciphertext.len() - 1];
        assert!(decrypt(&key, &sealed.iv, cut).is_err());
        assert!(decrypt(&key, &sealed.iv, &sealed.ciphertext[..4]).is_err());
    }

    #[test]
    fn armor_round_trips_through_text() {
        let key = key();
        let sealed = encrypt(&key, b"armored").expect("encrypt");

        let text = sealed.to_armored();
        assert!(text.starts_with(&sealed.iv_hex()));

        let parsed = EncryptedFile::from_armored(&text).expect("parse armor");
        assert_eq!(parsed, sealed);
        let opened = decrypt(&key, &parsed.iv, &parsed.ciphertext).expect("decrypt");
        assert_eq!(&*opened, b"armored");
    }

    #[test]
    fn armor_without_separator_is_rejected() {
        let err = EncryptedFile::from_armored("deadbeef").expect_err("no separator");
        assert!(matches!(err, CryptoError::InvalidArmor(_)));
    }
}
