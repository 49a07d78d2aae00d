use std::{
    fs::{self, File},
    io::{ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use keysmith_core::storage::{KeyValueStore, StorageError};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

/// File-backed namespace: `<root>/<namespace>/` holds one JSON file per record,
/// named after the URL-safe base64 of the record key.
///
/// Each write goes to a temp file in the same directory and is persisted with
/// a rename. Writers on different keys never touch the same file, so separate
/// instances and processes sharing a namespace cannot drop each other's records;
/// racing writers on one key resolve last-write-wins.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    key: String,
    value: String,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            dir: root.into().join(sanitize_namespace(namespace)),
        }
    }

    /// Directory holding this namespace's records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    #[instrument(skip_all, fields(key = %key))]
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(read_record(&self.path_for(key))?.map(|record| record.value))
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let record = StoredRecord {
            key: key.to_string(),
            value: value.to_string(),
        };
        write_record(&self.dir, &self.path_for(key), &record)
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(write_err(err)),
        }
    }
}

fn read_record(path: &Path) -> Result<Option<StoredRecord>, StorageError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(read_err(err)),
    };

    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(read_err)?;
    serde_json::from_slice(&buf).map(Some).map_err(read_err)
}

fn write_record(dir: &Path, path: &Path, record: &StoredRecord) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|err| StorageError::Unavailable {
        reason: err.to_string(),
    })?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    let json = serde_json::to_vec(record).map_err(write_err)?;
    tmp.write_all(&json).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("record persisted");
    Ok(())
}

fn sanitize_key(key: &str) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

/// Keeps the namespace a single path component.
fn sanitize_namespace(namespace: &str) -> String {
    let cleaned: String = namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "default".to_string(),
        trimmed => trimmed.to_string(),
    }
}

fn read_err<E: ToString>(err: E) -> StorageError {
    StorageError::Read {
        reason: err.to_string(),
    }
}

fn write_err<E: ToString>(err: E) -> StorageError {
    StorageError::Write {
        reason: err.to_string(),
    }
}
