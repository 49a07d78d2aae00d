use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

/// Errors produced by key-value store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The backend rejected a write (quota exceeded, read-only, disabled).
    #[error("storage write failed: {reason}")]
    Write { reason: String },
    /// The backend could not be read.
    #[error("storage read failed: {reason}")]
    Read { reason: String },
    /// The backend is not usable at all (missing directory, no keychain).
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Persistent string-to-string namespace, modelled on origin-scoped local storage.
///
/// Implementations decide where the namespace lives; callers only see
/// `get`/`set`/`remove` over strings. Concurrent writers to one key resolve
/// last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Look up a value. `Ok(None)` when no record exists.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Persist a value under a key, overwriting any existing entry.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key and its value (idempotent).
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key).await
    }
}

/// Process-local store backed by a `HashMap`. Nothing survives the process;
/// used by tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKeyValueStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held. A poisoned lock still reports the
    /// map's real size; the map is never left half-updated.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(map) => map.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    #[instrument(skip_all, fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.lock().map_err(|err| StorageError::Read {
            reason: format!("lock poisoned: {err}"),
        })?;
        Ok(map.get(key).cloned())
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.inner.lock().map_err(|err| StorageError::Write {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.lock().map_err(|err| StorageError::Write {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.remove(key);
        Ok(())
    }
}
