use std::{path::PathBuf, sync::Arc};

use color_eyre::Result;
use dirs::data_dir;
use keysmith_core::storage::KeyValueStore;
use keysmith_storage::{FileKeyValueStore, KeyringStore};
use tracing::debug;

use crate::config::{Backend, Config};

/// Store handle shared by every command.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Resolve the default data directory for Keysmith.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("keysmith"))
}

/// Build the configured backend for the configured namespace.
pub fn store_from_config(config: &Config) -> Result<SharedStore> {
    let namespace = config.namespace();
    match config.backend {
        Backend::Keyring => {
            debug!(namespace, "initializing keyring store");
            Ok(Arc::new(KeyringStore::new(namespace)))
        }
        Backend::File => {
            let root = match &config.data_dir {
                Some(root) => root.clone(),
                None => default_data_dir()?,
            };
            debug!(?root, namespace, "initializing file store");
            Ok(Arc::new(FileKeyValueStore::new(root, namespace)))
        }
    }
}
