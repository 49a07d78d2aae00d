//! Core abstractions for Keysmith: the key-value storage contract that key
//! persistence is built on, plus an in-memory implementation for tests.

pub mod storage;

pub use storage::{InMemoryKeyValueStore, KeyValueStore, StorageError};
