//! # Todo Store Testing
//!
//! Testing utilities and helpers for the todo store.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - In-memory and failing key-value storage
//! - A Given-When-Then builder for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_testing::{InMemoryStorage, SequentialIdGenerator};
//! use todo_store_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_add_flow() {
//!     let storage = Arc::new(InMemoryStorage::new());
//!     let env = TodoEnvironment::new(Arc::new(SequentialIdGenerator::new()), storage.clone());
//!     let store = Store::new(TodoState::new(), TodoReducer::new(), env);
//!
//!     store.send(TodoAction::AddTodo("Buy milk".to_string())).await?;
//!
//!     assert_eq!(store.state(TodoState::len).await, 1);
//!     assert!(storage.get("todos").is_some());
//! }
//! ```

use chrono::{DateTime, Utc};
use todo_store_core::environment::{Clock, IdGenerator};
use todo_store_core::storage::{KeyValueStorage, StorageError};


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, KeyValueStorage, StorageError, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    /// Clock stopped at one instant
    ///
    /// Drives `TimestampIdGenerator` deterministically: every id it hands out
    /// after the first is the previous one plus one.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use todo_store_core::environment::{IdGenerator, TimestampIdGenerator};
    /// use todo_store_testing::mocks::FixedClock;
    ///
    /// let ids = TimestampIdGenerator::new(Arc::new(FixedClock::at_millis(1_000)));
    /// assert_eq!(ids.next_id(), 1_000);
    /// assert_eq!(ids.next_id(), 1_001);
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Stop the clock at `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Stop the clock `millis` after the Unix epoch (negative is before)
        ///
        /// Out-of-range values clamp to the epoch.
        #[must_use]
        pub fn at_millis(millis: i64) -> Self {
            let time = DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
            Self::new(time)
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock stopped at 2025-01-01T00:00:00Z (`1_735_689_600_000` ms)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::at_millis(1_735_689_600_000)
    }

    /// Predictable ids: 1, 2, 3, ...
    ///
    /// # Example
    ///
    /// ```
    /// use todo_store_testing::mocks::SequentialIdGenerator;
    /// use todo_store_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), 1);
    /// assert_eq!(ids.next_id(), 2);
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Start counting at 1
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(1)
        }

        /// Start counting at `first`
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
            }
        }
    }

    impl Default for SequentialIdGenerator {
        fn default() -> Self {
            Self::new()
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> u64 {
            self.next.fetch_add(1, Ordering::SeqCst)
        }
    }

    /// In-memory key-value storage
    ///
    /// Counts writes and can enforce a byte quota (sum of key and value
    /// lengths across all slots), mimicking a browser storage limit.
    #[derive(Debug, Default)]
    pub struct InMemoryStorage {
        entries: Mutex<HashMap<String, String>>,
        quota: Option<usize>,
        writes: AtomicUsize,
    }

    impl InMemoryStorage {
        /// Create empty storage without a quota
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create empty storage that rejects writes beyond `limit` bytes
        #[must_use]
        pub fn with_quota(limit: usize) -> Self {
            Self {
                quota: Some(limit),
                ..Self::default()
            }
        }

        /// Seed a slot without counting it as a write
        #[must_use]
        pub fn with_item(self, key: impl Into<String>, value: impl Into<String>) -> Self {
            if let Ok(mut entries) = self.entries.lock() {
                entries.insert(key.into(), value.into());
            }
            self
        }

        /// Current value of a slot, if any
        #[must_use]
        pub fn get(&self, key: &str) -> Option<String> {
            self.entries
                .lock()
                .ok()
                .and_then(|entries| entries.get(key).cloned())
        }

        /// Number of successful `set_item` calls
        #[must_use]
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStorage for InMemoryStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            let entries = self
                .entries
                .lock()
                .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;
            Ok(entries.get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))?;

            if let Some(limit) = self.quota {
                let others: usize = entries
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                let used = others + key.len() + value.len();
                if used > limit {
                    return Err(StorageError::QuotaExceeded { used, limit });
                }
            }

            entries.insert(key.to_string(), value.to_string());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Storage that is never available
    ///
    /// Reads and writes both fail, and every attempt is counted.
    #[derive(Debug, Default)]
    pub struct FailingStorage {
        attempts: AtomicUsize,
    }

    impl FailingStorage {
        /// Create failing storage
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of read or write attempts so far
        #[must_use]
        pub fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStorage for FailingStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Unavailable("storage disabled".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Unavailable("storage disabled".to_string()))
        }
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FailingStorage, FixedClock, InMemoryStorage, SequentialIdGenerator, test_clock};
pub use reducer_test::{ReducerTest, assertions};
