use async_trait::async_trait;
use keysmith_core::storage::{KeyValueStore, StorageError};
use tracing::instrument;

/// OS keychain-backed namespace. Each record is one keychain entry whose
/// service is `keysmith:<namespace>` and whose account is the record key.
///
/// Writes are read back through a fresh entry before `set` reports success, so
/// a keychain that accepts but does not retain credentials fails loudly.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(namespace: &str) -> Self {
        Self {
            service: format!("keysmith:{namespace}"),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, StorageError> {
        keyring::Entry::new(&self.service, key).map_err(|e| StorageError::Unavailable {
            reason: e.to_string(),
        })
    }
}

// Keyring calls are synchronous; the async signature only satisfies the trait.
#[async_trait]
impl KeyValueStore for KeyringStore {
    #[instrument(skip_all, fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(StorageError::Read {
                reason: err.to_string(),
            }),
        }
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| StorageError::Write {
                reason: e.to_string(),
            })?;
        check_read_back(self.entry(key)?.get_password(), value)
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(StorageError::Write {
                reason: err.to_string(),
            }),
        }
    }
}

fn check_read_back(
    read: Result<String, keyring::Error>,
    expected: &str,
) -> Result<(), StorageError> {
    match read {
        Ok(stored) if stored == expected => Ok(()),
        Ok(_) => Err(StorageError::Write {
            reason: "keychain returned a different value after write".to_string(),
        }),
        Err(keyring::Error::NoEntry) => Err(StorageError::Unavailable {
            reason: "keychain did not retain the entry (no persistent credential store)"
                .to_string(),
        }),
        Err(err) => Err(StorageError::Read {
            reason: err.to_string(),
        }),
    }
}
