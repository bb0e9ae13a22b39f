//! # Todo Store Runtime
//!
//! Runtime implementation for the todo store.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling, plus a file-backed [`KeyValueStorage`] for the
//! persistence slot.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state and is the single entry point for actions
//! - **Effect Executor**: Runs effect descriptions returned by the reducer
//! - **`FileStorage`**: Local key-value storage in a JSON file
//!
//! ## Example
//!
//! ```ignore
//! use todo_store_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```
//!
//! [`KeyValueStorage`]: todo_store_core::storage::KeyValueStorage

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use todo_store_core::{
    effect::{Effect, StorageOperation},
    reducer::Reducer,
};
use tokio::sync::RwLock;

/// File-backed key-value storage
pub mod storage;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Effect failures are not represented here: storage writes are
    /// best-effort and their failures are logged, never returned.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after `shutdown()`.
        #[error("Store is shutting down")]
        ShutdownInProgress,
    }
}

pub use error::StoreError;
pub use storage::FileStorage;

/// Store module - The runtime for reducers
pub mod store {
    use super::{Arc, AtomicBool, Effect, Ordering, Reducer, RwLock, StorageOperation, StoreError};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, mutated only by the reducer)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution
    ///
    /// # Ordering
    ///
    /// Actions are processed one at a time. Effects returned by the reducer
    /// run before the write lock is released, so two storage writes always
    /// land in the order their actions were sent (last write wins).
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(TodoState::new(), TodoReducer::new(), env);
    ///
    /// store.send(TodoAction::AddTodo("Buy milk".to_string())).await?;
    /// ```
    pub struct Store<R>
    where
        R: Reducer,
    {
        state: Arc<RwLock<R::State>>,
        reducer: R,
        environment: R::Environment,
        shutdown: Arc<AtomicBool>,
    }

    impl<R> Store<R>
    where
        R: Reducer + Send + Sync + 'static,
        R::State: Send + Sync + 'static,
        R::Action: Send + 'static,
        R::Environment: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// # Arguments
        ///
        /// - `initial_state`: The starting state for the store
        /// - `reducer`: The reducer implementation (business logic)
        /// - `environment`: Injected dependencies
        #[must_use]
        pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
            }
        }

        /// Stop accepting actions
        ///
        /// Every later `send()` (on this store or any clone) returns
        /// [`StoreError::ShutdownInProgress`]. State stays readable.
        pub fn shutdown(&self) {
            tracing::info!("Store shutting down");
            metrics::counter!("store.shutdown.initiated").increment(1);
            self.shutdown.store(true, Ordering::Release);
        }

        /// Returns `true` once `shutdown()` has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Send an action to the store
        ///
        /// This is the only way to change state:
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Executes returned effects
        /// 4. Releases the lock
        ///
        /// Concurrent callers serialize on the lock; each action runs to
        /// completion before the next one starts.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        ///
        /// # Panics
        ///
        /// If the reducer panics, the panic will propagate to the caller.
        /// Reducers should be pure functions that do not panic.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: R::Action) -> Result<(), StoreError> {
            if self.is_shutting_down() {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!("store.commands.total").increment(1);

            let mut state = self.state.write().await;
            tracing::trace!("Acquired write lock on state");

            let effects = {
                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                // Note: Precision loss acceptable for metrics (effect counts < 2^52)
                #[allow(clippy::cast_precision_loss)]
                metrics::histogram!("store.effects.count").record(effects.len() as f64);

                effects
            };

            tracing::trace!("Executing {} effects", effects.len());
            for effect in effects {
                Self::execute_effect(effect);
            }
            drop(state);

            tracing::debug!("Action processing completed");
            Ok(())
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released promptly:
        ///
        /// ```ignore
        /// let total = store.state(|s| s.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&R::State) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Execute a single effect
        ///
        /// # Error Handling Strategy
        ///
        /// **Reducer panics**: Propagate (fail fast).
        ///
        /// **Storage failures**: Log and continue. The in-memory state is
        /// already committed and is never rolled back.
        fn execute_effect(effect: Effect) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Storage(StorageOperation::SetItem {
                    storage,
                    key,
                    value,
                }) => {
                    metrics::counter!("store.effects.executed", "type" => "storage").increment(1);

                    match storage.set_item(&key, &value) {
                        Ok(()) => {
                            tracing::debug!(key = %key, bytes = value.len(), "set_item succeeded");
                        },
                        Err(error) => {
                            metrics::counter!("store.storage.write_failed").increment(1);
                            tracing::warn!(
                                key = %key,
                                error = %error,
                                "set_item failed, keeping in-memory state"
                            );
                        },
                    }
                },
            }
        }
    }

    impl<R> Clone for Store<R>
    where
        R: Reducer + Clone,
        R::Environment: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
