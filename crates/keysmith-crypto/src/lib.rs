//! Symmetric key generation and file encryption for Keysmith.
//! Keys come from the OS CSPRNG; payloads are sealed with AES-256-GCM under a
//! fresh 128-bit IV per call.

#![forbid(unsafe_code)]

pub mod cipher;
pub mod error;
pub mod keys;

pub use cipher::{decrypt, encrypt, EncryptedFile};
pub use error::CryptoError;
pub use keys::{Iv, SymmetricKey, IV_SIZE, KEY_SIZE};
