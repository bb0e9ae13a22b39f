//! Key-value storage abstraction for the persistence slot.
//!
//! The todo list is mirrored into a single entry of a local key-value store,
//! the same shape as a browser's `localStorage`: string keys, string values,
//! synchronous access.
//!
//! # Implementations
//!
//! - `FileStorage` (in `todo-store-runtime` crate): JSON file on local disk
//! - `InMemoryStorage` (in `todo-store-testing` crate): `HashMap` with an optional quota
//! - `FailingStorage` (in `todo-store-testing` crate): always unavailable
//!
//! # Example
//!
//! ```ignore
//! use todo_store_core::storage::{KeyValueStorage, StorageError};
//!
//! fn mirror(storage: &dyn KeyValueStorage, json: &str) -> Result<(), StorageError> {
//!     storage.set_item("todos", json)?;
//!     assert_eq!(storage.get_item("todos")?.as_deref(), Some(json));
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Errors that can occur while reading or writing the persistence slot.
///
/// None of these are fatal for the store: writes are best-effort and a
/// failed write is logged and dropped by the runtime.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store cannot be reached (disabled, locked, missing device).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the storage quota.
    #[error("Storage quota exceeded: {used} of {limit} bytes")]
    QuotaExceeded {
        /// Bytes that would be in use after the write.
        used: usize,
        /// Configured quota in bytes.
        limit: usize,
    },

    /// Underlying file system error.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file holds something other than a key-value object.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

/// Synchronous key-value storage.
///
/// Implementations must be `Send + Sync`: the store shares one instance
/// between the environment and every effect it produces.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the value cannot be written, for example
    /// when a quota is exceeded or the device is unavailable.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
