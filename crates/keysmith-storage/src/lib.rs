//! Persistent `KeyValueStore` backends.
//! A JSON file per namespace on disk, or one OS keychain entry per record.

pub mod file_store;
pub mod keyring_store;

pub use file_store::FileKeyValueStore;
pub use keyring_store::KeyringStore;
