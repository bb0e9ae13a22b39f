//! File-backed key-value storage.
//!
//! [`FileStorage`] keeps every slot in one JSON object on local disk:
//!
//! ```json
//! { "todos": "[{\"id\":1,\"text\":\"Buy milk\",\"completed\":false}]" }
//! ```
//!
//! Values are stored as strings, exactly as handed over by the caller, so
//! the file mirrors what a browser's `localStorage` would hold.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use todo_store_core::storage::{KeyValueStorage, StorageError};

/// Key-value storage persisted to a single JSON file
///
/// Writes go to a sibling `.tmp` file which is then renamed over the
/// original, so a crash never leaves a half-written slot behind.
///
/// # Example
///
/// ```no_run
/// use todo_store_core::storage::KeyValueStorage;
/// use todo_store_runtime::FileStorage;
///
/// # fn example() -> Result<(), todo_store_core::storage::StorageError> {
/// let storage = FileStorage::new("todos.json");
/// storage.set_item("todos", "[]")?;
/// assert_eq!(storage.get_item("todos")?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates storage backed by the file at `path`
    ///
    /// The file is created on the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(error) => return Err(error.into()),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, StorageError> {
        self.lock
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard()?;
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.guard()?;

        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(reason)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    reason = %reason,
                    "Storage file is corrupt, replacing it"
                );
                BTreeMap::new()
            },
            Err(error) => return Err(error),
        };

        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;

        tracing::trace!(path = %self.path.display(), key, bytes = value.len(), "Slot written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests can unwrap
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("absent.json"));

        assert_eq!(storage.get_item("todos").unwrap(), None);
    }

    #[test]
    fn set_then_get_returns_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("slots.json"));

        storage.set_item("todos", r#"[{"id":1}]"#).unwrap();

        assert_eq!(
            storage.get_item("todos").unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
    }

    #[test]
    fn writes_keep_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("slots.json"));

        storage.set_item("theme", "dark").unwrap();
        storage.set_item("todos", "[]").unwrap();
        storage.set_item("todos", "[1]").unwrap();

        assert_eq!(storage.get_item("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(storage.get_item("todos").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");

        FileStorage::new(&path).set_item("todos", "[]").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/deeper/slots.json"));

        storage.set_item("todos", "[]").unwrap();

        assert!(storage.path().exists());
    }

    #[test]
    fn corrupt_file_fails_reads_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        fs::write(&path, "not json at all").unwrap();
        let storage = FileStorage::new(&path);

        assert!(matches!(
            storage.get_item("todos"),
            Err(StorageError::Serialization(_))
        ));

        storage.set_item("todos", "[]").unwrap();
        assert_eq!(storage.get_item("todos").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn unwritable_location_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        // A regular file cannot act as a parent directory
        let storage = FileStorage::new(blocker.join("slots.json"));

        assert!(matches!(
            storage.set_item("todos", "[]"),
            Err(StorageError::Io(_))
        ));
    }
}
