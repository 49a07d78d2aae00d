use color_eyre::{eyre::eyre, Result};
use keysmith_core::storage::KeyValueStore;
use keysmith_manager::KeyManager;

use crate::cli::KeyCommand;

/// Generate a key, optionally persisting it. Returns the key for printing.
pub async fn keygen<S: KeyValueStore>(
    manager: &KeyManager<S>,
    save: Option<&str>,
) -> Result<String> {
    let key = manager.generate_key().map_err(|e| eyre!(e.to_string()))?;
    if let Some(id) = save {
        manager
            .store_key(id, &key)
            .await
            .map_err(|e| eyre!(e.to_string()))?;
    }
    Ok(key)
}

/// Execute a key subcommand. Returns the line to print, if any.
pub async fn handle<S: KeyValueStore>(cmd: KeyCommand, manager: &KeyManager<S>) -> Result<String> {
    match cmd {
        KeyCommand::Put { id, key } => {
            manager
                .store_key(&id, &key)
                .await
                .map_err(|e| eyre!(e.to_string()))?;
            Ok(format!("Stored key {id}"))
        }
        KeyCommand::Get { id } => manager
            .get_key(&id)
            .await
            .map_err(|e| eyre!(e.to_string())),
        KeyCommand::Delete { id } => {
            manager
                .delete_key(&id)
                .await
                .map_err(|e| eyre!(e.to_string()))?;
            Ok(format!("Deleted key {id}"))
        }
    }
}
