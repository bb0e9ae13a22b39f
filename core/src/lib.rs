//! # Todo Store Core
//!
//! Core traits and types for the todo store.
//!
//! This crate provides the abstractions every other crate builds on:
//!
//! ## Core Concepts
//!
//! - **State**: Domain state owned by a store
//! - **Action**: The only way to request a state transition
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits (clock, ids, storage)
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_core::*;
//!
//! impl Reducer for TodoReducer {
//!     type State = TodoState;
//!     type Action = TodoAction;
//!     type Environment = TodoEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut TodoState,
//!         action: TodoAction,
//!         env: &TodoEnvironment,
//!     ) -> SmallVec<[Effect; 4]> {
//!         // Business logic goes here
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use smallvec::{SmallVec, smallvec};

/// Key-value storage abstraction backing the persistence slot
pub mod storage;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::SmallVec;
    use super::effect::Effect;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TodoReducer {
    ///     type State = TodoState;
    ///     type Action = TodoAction;
    ///     type Environment = TodoEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut TodoState,
    ///         action: TodoAction,
    ///         env: &TodoEnvironment,
    ///     ) -> SmallVec<[Effect; 4]> {
    ///         match action {
    ///             TodoAction::RemoveTodo(id) if state.remove(&id) => {
    ///                 smallvec![persist(state, env)]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// A rejected action must leave `state` untouched.
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution), so reducers stay pure and tests can
/// inspect exactly what a reducer asked for.
pub mod effect {
    use crate::storage::KeyValueStorage;
    use std::sync::Arc;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    pub enum Effect {
        /// No-op effect
        None,

        /// Write to the local key-value storage
        ///
        /// Executed by the runtime before the next action is accepted, so
        /// writes land in dispatch order. Failures are logged, never fed back.
        Storage(StorageOperation),
    }

    /// Storage operations an effect can request
    pub enum StorageOperation {
        /// Replace the value under `key` with `value`
        SetItem {
            /// Storage to write to
            storage: Arc<dyn KeyValueStorage>,
            /// Slot key
            key: String,
            /// Serialized payload
            value: String,
        },
    }

    // Manual Debug implementations since storage trait objects don't implement Debug
    impl std::fmt::Debug for StorageOperation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::SetItem { key, value, .. } => f
                    .debug_struct("StorageOperation::SetItem")
                    .field("key", key)
                    .field("value", value)
                    .finish_non_exhaustive(),
            }
        }
    }

    impl std::fmt::Debug for Effect {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Storage(op) => f.debug_tuple("Effect::Storage").field(op).finish(),
            }
        }
    }

    impl Effect {
        /// Describe a write of `value` under `key`
        #[must_use]
        pub fn set_item(
            storage: Arc<dyn KeyValueStorage>,
            key: impl Into<String>,
            value: impl Into<String>,
        ) -> Self {
            Effect::Storage(StorageOperation::SetItem {
                storage,
                key: key.into(),
                value: value.into(),
            })
        }

        /// Returns `true` for effects that do nothing
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Source of fresh numeric identifiers
    ///
    /// Every call must return a value not returned before by the same
    /// generator. Reducers still guard against collisions with ids that
    /// were loaded from storage.
    pub trait IdGenerator: Send + Sync {
        /// Produce the next identifier
        fn next_id(&self) -> u64;
    }

    /// Millisecond-timestamp ids, bumped when two calls share a millisecond
    ///
    /// Ids are strictly increasing for the lifetime of the generator even if
    /// the clock steps backwards.
    pub struct TimestampIdGenerator {
        clock: Arc<dyn Clock>,
        last: AtomicU64,
    }

    impl TimestampIdGenerator {
        /// Creates a generator reading time from `clock`
        #[must_use]
        pub fn new(clock: Arc<dyn Clock>) -> Self {
            Self {
                clock,
                last: AtomicU64::new(0),
            }
        }
    }

    impl std::fmt::Debug for TimestampIdGenerator {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TimestampIdGenerator")
                .field("last", &self.last.load(Ordering::SeqCst))
                .finish_non_exhaustive()
        }
    }

    impl IdGenerator for TimestampIdGenerator {
        fn next_id(&self) -> u64 {
            // Pre-epoch clocks map to zero and fall back to the counter
            let now = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
            let mut last = self.last.load(Ordering::SeqCst);
            loop {
                let candidate = now.max(last.saturating_add(1));
                match self.last.compare_exchange(
                    last,
                    candidate,
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                ) {
                    Ok(_) => return candidate,
                    Err(current) => last = current,
                }
            }
        }
    }
}
