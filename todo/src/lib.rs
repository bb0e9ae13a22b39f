//! Todo list state store with a local persistence slot.
//!
//! A single in-memory todo list is changed only through [`TodoAction`]s sent
//! to a [`Store`](todo_store_runtime::Store). After every accepted action the
//! whole list is written as one JSON array to a local key-value slot, and at
//! startup the list can be rehydrated from that slot.
//!
//! - [`types`]: items, ids, the list and its stats, actions
//! - [`reducer`]: the pure transitions and the storage effect they emit
//! - [`persistence`]: snapshot format and lenient rehydration
//! - [`edit`]: inline edit session for the front end
//! - [`shell`]: line-oriented front end used by the `todo` binary
//! - [`config`]: environment-driven settings
//!
//! # Quick Start
//!
//! ```no_run
//! use todo::{TodoAction, TodoEnvironment, TodoReducer, persistence};
//! use todo_store_core::environment::{SystemClock, TimestampIdGenerator};
//! use todo_store_runtime::{FileStorage, Store};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStorage::new("todos.json"));
//! let ids = Arc::new(TimestampIdGenerator::new(Arc::new(SystemClock)));
//! let env = TodoEnvironment::new(ids, storage.clone());
//!
//! // Pick up where the last run left off
//! let state = persistence::load_state(storage.as_ref(), &env.storage_key);
//! let store = Store::new(state, TodoReducer::new(), env);
//!
//! store.send(TodoAction::AddTodo("Buy milk".to_string())).await?;
//!
//! let stats = store.state(|s| s.stats()).await;
//! println!("{} todos, {} done", stats.total, stats.completed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod edit;
pub mod persistence;
pub mod reducer;
pub mod shell;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use edit::EditSession;
pub use persistence::{TODOS_STORAGE_KEY, load_state};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use shell::{Shell, ShellError};
pub use types::{ActionError, TodoAction, TodoId, TodoItem, TodoState, TodoStats};
