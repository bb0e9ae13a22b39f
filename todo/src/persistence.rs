//! Persistence bridge between the todo list and local key-value storage.
//!
//! After every accepted action the reducer emits a write of the whole list
//! as a JSON array under a fixed key:
//!
//! ```json
//! [{"id": 1, "text": "Buy milk", "completed": false}]
//! ```
//!
//! Writes are best-effort: the runtime logs failures and moves on.
//! Reading back ([`load_state`]) is lenient, because the slot may have been
//! written by an older or foreign version. Anything unusable is treated as
//! absent rather than as an error.

use crate::reducer::TodoEnvironment;
use crate::types::{TodoId, TodoItem, TodoState};
use serde_json::Value;
use std::sync::Arc;
use todo_store_core::{effect::Effect, storage::KeyValueStorage};

/// Default slot key for the persisted list
pub const TODOS_STORAGE_KEY: &str = "todos";

/// Serializes the full list into its persisted form
///
/// # Errors
///
/// Returns the serializer error; with the current item types this does
/// not happen in practice.
pub fn snapshot(state: &TodoState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Builds the storage write mirroring `state`
///
/// Returns `None` (after logging) if the list cannot be serialized.
#[must_use]
pub fn persist_effect(state: &TodoState, env: &TodoEnvironment) -> Option<Effect> {
    match snapshot(state) {
        Ok(json) => Some(Effect::set_item(
            Arc::clone(&env.storage),
            env.storage_key.clone(),
            json,
        )),
        Err(error) => {
            tracing::warn!(error = %error, "Could not serialize todo list, skipping write");
            None
        },
    }
}

/// Reads the persisted list from `storage`
///
/// Never fails: a missing slot, a read error, or an unusable payload all
/// yield an empty list. See [`decode_snapshot`] for entry-level rules.
pub fn load_state(storage: &dyn KeyValueStorage, key: &str) -> TodoState {
    match storage.get_item(key) {
        Ok(Some(raw)) => {
            let state = decode_snapshot(&raw);
            tracing::info!(key, total = state.len(), "Rehydrated todo list");
            state
        },
        Ok(None) => {
            tracing::debug!(key, "No persisted todo list, starting empty");
            TodoState::new()
        },
        Err(error) => {
            tracing::warn!(key, error = %error, "Could not read persisted todo list, starting empty");
            TodoState::new()
        },
    }
}

/// Decodes a persisted list, skipping whatever does not fit
///
/// - invalid JSON or a non-array value yields an empty list
/// - entries without a usable `id` or string `text` are skipped
/// - a missing or non-boolean `completed` reads as `false`
/// - text is trimmed; blank items and repeated ids (after the first) are skipped
#[must_use]
pub fn decode_snapshot(raw: &str) -> TodoState {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(error = %error, "Persisted todo list is not valid JSON, ignoring it");
            return TodoState::new();
        },
    };

    let Value::Array(entries) = value else {
        tracing::warn!("Persisted todo list is not an array, ignoring it");
        return TodoState::new();
    };

    let found = entries.len();
    let state = TodoState::from_items(entries.into_iter().filter_map(decode_entry));

    if state.len() < found {
        tracing::warn!(
            skipped = found - state.len(),
            kept = state.len(),
            "Skipped unusable persisted todo entries"
        );
    }

    state
}

fn decode_entry(entry: Value) -> Option<TodoItem> {
    let Value::Object(mut fields) = entry else {
        return None;
    };

    let id: TodoId = serde_json::from_value(fields.remove("id")?).ok()?;
    let Value::String(text) = fields.remove("text")? else {
        return None;
    };
    let completed = fields
        .get("completed")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(TodoItem { id, text, completed })
}
