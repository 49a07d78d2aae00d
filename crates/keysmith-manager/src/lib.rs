//! Key lifecycle and file encryption over an injected `KeyValueStore`.

use std::sync::Arc;

use keysmith_core::storage::{KeyValueStore, StorageError};
use keysmith_crypto::{cipher, CryptoError, EncryptedFile, Iv, SymmetricKey};
use thiserror::Error;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

/// Failures surfaced by [`KeyManager`]. Nothing is retried internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyManagerError {
    /// The OS random source failed; no weaker source is tried.
    #[error("secure random source unavailable: {0}")]
    RngUnavailable(String),
    #[error("key not found: {id}")]
    KeyNotFound { id: String },
    /// Wrong key, wrong IV, or corrupted ciphertext.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("invalid iv: {0}")]
    InvalidIv(String),
    /// Armored text that does not parse.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CryptoError> for KeyManagerError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::RngUnavailable(reason) => Self::RngUnavailable(reason),
            CryptoError::InvalidKey(reason) => Self::InvalidKey(reason),
            CryptoError::InvalidIv(reason) => Self::InvalidIv(reason),
            CryptoError::EncryptionFailed(reason) => Self::EncryptionFailed(reason),
            CryptoError::DecryptionFailed(reason) => Self::DecryptionFailed(reason),
            CryptoError::InvalidArmor(reason) => Self::InvalidPayload(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, KeyManagerError>;

/// Generates keys, encrypts and decrypts file payloads, and persists keys by id.
///
/// Keys cross this API as 64-char hex strings and IVs as 32-char hex strings.
pub struct KeyManager<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> Clone for KeyManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore> KeyManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// New random 256-bit key as 64 lowercase hex characters.
    pub fn generate_key(&self) -> Result<String> {
        Ok(SymmetricKey::generate()?.to_hex())
    }

    /// Encrypts `contents` with a fresh IV; the IV is returned alongside the ciphertext.
    pub fn encrypt_file(&self, contents: &[u8], key: &str) -> Result<EncryptedFile> {
        let key = SymmetricKey::from_hex(key)?;
        Ok(cipher::encrypt(&key, contents)?)
    }

    /// Reverses [`encrypt_file`](Self::encrypt_file) given the same key and IV.
    pub fn decrypt_file(
        &self,
        ciphertext: &[u8],
        key: &str,
        iv: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let key = SymmetricKey::from_hex(key)?;
        let iv = Iv::from_hex(iv)?;
        Ok(cipher::decrypt(&key, &iv, ciphertext)?)
    }

    /// Decrypts an `<iv hex>:<base64>` armored payload.
    pub fn decrypt_armored(&self, armored: &str, key: &str) -> Result<Zeroizing<Vec<u8>>> {
        let key = SymmetricKey::from_hex(key)?;
        let sealed = EncryptedFile::from_armored(armored)?;
        Ok(cipher::decrypt(&key, &sealed.iv, &sealed.ciphertext)?)
    }

    /// Persists `key` under `id`, overwriting any previous record.
    #[instrument(skip(self, key))]
    pub async fn store_key(&self, id: &str, key: &str) -> Result<()> {
        self.store.set(id, key).await?;
        debug!("key stored");
        Ok(())
    }

    /// Fetches the key stored under `id`. An empty record reads as missing.
    #[instrument(skip(self))]
    pub async fn get_key(&self, id: &str) -> Result<String> {
        match self.store.get(id).await? {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(KeyManagerError::KeyNotFound { id: id.to_string() }),
        }
    }

    /// Removes the key stored under `id`; absent ids are a no-op.
    #[instrument(skip(self))]
    pub async fn delete_key(&self, id: &str) -> Result<()> {
        self.store.remove(id).await?;
        debug!("key deleted");
        Ok(())
    }

    /// Encrypts with the key stored under `id`.
    pub async fn encrypt_with_stored_key(
        &self,
        id: &str,
        contents: &[u8],
    ) -> Result<EncryptedFile> {
        let key = self.get_key(id).await?;
        self.encrypt_file(contents, &key)
    }

    /// Decrypts with the key stored under `id`.
    pub async fn decrypt_with_stored_key(
        &self,
        id: &str,
        ciphertext: &[u8],
        iv: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let key = self.get_key(id).await?;
        self.decrypt_file(ciphertext, &key, iv)
    }
}
