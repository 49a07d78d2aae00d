use thiserror::Error;

/// Errors raised by key handling and the file cipher.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The OS random source could not be read. Never retried with a weaker source.
    #[error("secure random source unavailable: {0}")]
    RngUnavailable(String),

    /// Key text is not 64 hex characters.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// IV text is not 32 hex characters.
    #[error("invalid iv: {0}")]
    InvalidIv(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key, wrong IV, or a truncated/tampered payload.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    /// Armored text could not be parsed.
    #[error("invalid armor: {0}")]
    InvalidArmor(String),
}
