//! Storage contract for persisted key records.

mod key_value_store;

pub use key_value_store::{InMemoryKeyValueStore, KeyValueStore, StorageError};
