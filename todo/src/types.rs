//! Domain types for the todo list.
//!
//! A todo list is an ordered collection of items that can be added,
//! toggled, edited, and removed. Insertion order is display order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Unique identifier for a todo item
///
/// Fresh ids are always numbers. Text ids only appear when a persisted
/// list written elsewhere used them; they are kept as-is.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    /// Numeric id (timestamp or counter)
    Number(u64),
    /// Legacy string id
    Text(String),
}

impl TodoId {
    /// Returns the number this id is displayed as, if any
    ///
    /// Covers legacy text ids such as `"7"`, which the shell cannot tell
    /// apart from the number `7`. Text like `"07"` is not a number here.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.parse().ok().filter(|n: &u64| n.to_string() == *s),
        }
    }
}

impl From<u64> for TodoId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl std::str::FromStr for TodoId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<u64>()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Number))
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TodoItem {
    /// Unique identifier, fixed at creation
    pub id: TodoId,
    /// Trimmed, non-empty description
    pub text: String,
    /// Whether the todo is completed
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed, todo item
    #[must_use]
    pub const fn new(id: TodoId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }
}

/// Aggregate counts over a todo list
///
/// Always computed from the list, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoStats {
    /// Number of items
    pub total: usize,
    /// Number of completed items
    pub completed: usize,
    /// Number of items still open
    pub pending: usize,
}

/// State of the todo list
///
/// Serializes as a bare JSON array of items. Construction goes through
/// [`TodoState::new`] or [`TodoState::from_items`] so ids stay unique and
/// no item has blank text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TodoState {
    todos: Vec<TodoItem>,
}

impl TodoState {
    /// Creates a new empty todo list
    #[must_use]
    pub const fn new() -> Self {
        Self { todos: Vec::new() }
    }

    /// Builds a list from untrusted items
    ///
    /// Text is trimmed, blank items are dropped, and for repeated ids the
    /// first occurrence wins.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = TodoItem>) -> Self {
        let mut seen = HashSet::new();
        let todos = items
            .into_iter()
            .filter_map(|mut item| {
                let trimmed = item.text.trim();
                if trimmed.is_empty() || !seen.insert(item.id.clone()) {
                    return None;
                }
                if trimmed.len() != item.text.len() {
                    item.text = trimmed.to_string();
                }
                Some(item)
            })
            .collect();
        Self { todos }
    }

    /// Items in display order
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.todos
    }

    /// Returns the number of todos
    #[must_use]
    pub fn len(&self) -> usize {
        self.todos.len()
    }

    /// Returns `true` if the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// Returns total, completed, and pending counts
    #[must_use]
    pub fn stats(&self) -> TodoStats {
        let total = self.len();
        let completed = self.completed_count();
        TodoStats {
            total,
            completed,
            pending: total - completed,
        }
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Checks if a todo is displayed with the same id as `id`
    ///
    /// Stricter than [`TodoState::contains`]: the number `2` is taken by a
    /// legacy text id `"2"`.
    #[must_use]
    pub fn is_taken(&self, id: &TodoId) -> bool {
        self.find_id(&id.to_string()).is_some()
    }

    /// Looks up an id by its displayed form
    ///
    /// Lets a typed `"7"` match a legacy text id `"7"` as well as the
    /// number `7`.
    #[must_use]
    pub fn find_id(&self, displayed: &str) -> Option<TodoId> {
        let displayed = displayed.trim();
        self.todos
            .iter()
            .find(|t| t.id.to_string() == displayed)
            .map(|t| t.id.clone())
    }

    /// Smallest number above every id displayed as a number, or 1 for a
    /// list without any
    ///
    /// Returns `None` if the largest id is `u64::MAX`.
    #[must_use]
    pub fn next_free_id(&self) -> Option<u64> {
        self.todos
            .iter()
            .filter_map(|t| t.id.as_number())
            .max()
            .map_or(Some(1), |max| max.checked_add(1))
    }

    /// Appends a new item with trimmed `text`
    ///
    /// Returns `false`, leaving the list untouched, if the trimmed text is
    /// empty or `id` is already taken (see [`TodoState::is_taken`]).
    pub fn add(&mut self, id: TodoId, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.is_taken(&id) {
            return false;
        }
        self.todos.push(TodoItem::new(id, text.to_string()));
        true
    }

    /// Flips `completed` on the matching item
    ///
    /// Returns `false` for an unknown id.
    pub fn toggle(&mut self, id: &TodoId) -> bool {
        match self.todos.iter_mut().find(|t| &t.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                true
            },
            None => false,
        }
    }

    /// Replaces the text of the matching item with trimmed `text`
    ///
    /// Returns `false` for an unknown id or blank text. `completed` is
    /// left alone.
    pub fn edit(&mut self, id: &TodoId, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        match self.todos.iter_mut().find(|t| &t.id == id) {
            Some(todo) => {
                text.clone_into(&mut todo.text);
                true
            },
            None => false,
        }
    }

    /// Removes the matching item
    ///
    /// Returns `false` for an unknown id.
    pub fn remove(&mut self, id: &TodoId) -> bool {
        let before = self.todos.len();
        self.todos.retain(|t| &t.id != id);
        self.todos.len() != before
    }
}

/// Actions accepted by the todo store
///
/// This is the only way into the store. On the wire actions are tagged
/// JSON objects:
///
/// ```json
/// {"type": "EDIT_TODO", "payload": {"id": 1, "text": "Buy oat milk"}}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoAction {
    /// Append a todo with the given (untrimmed) text
    AddTodo(String),

    /// Flip the completion flag of a todo
    ToggleTodo(TodoId),

    /// Replace the text of a todo
    EditTodo {
        /// Todo to edit
        id: TodoId,
        /// New (untrimmed) text
        text: String,
    },

    /// Remove a todo
    RemoveTodo(TodoId),
}

/// Errors decoding an action from its wire form
///
/// Every variant is a contract violation between the caller and the
/// store, not a data condition. Callers should treat them as fatal.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The `type` tag names no known action
    #[error("Unrecognized action kind: {0}")]
    UnknownKind(String),

    /// The object has no string `type` tag
    #[error("Action has no `type` tag")]
    MissingKind,

    /// Invalid JSON, or a payload that does not fit its kind
    #[error("Malformed action: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl TodoAction {
    /// Wire tags of every action kind
    pub const KINDS: [&'static str; 4] = ["ADD_TODO", "TOGGLE_TODO", "EDIT_TODO", "REMOVE_TODO"];

    /// Wire tag of this action
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AddTodo(_) => "ADD_TODO",
            Self::ToggleTodo(_) => "TOGGLE_TODO",
            Self::EditTodo { .. } => "EDIT_TODO",
            Self::RemoveTodo(_) => "REMOVE_TODO",
        }
    }

    /// Decodes an action from its wire form
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::UnknownKind`] for an unrecognized `type`,
    /// [`ActionError::MissingKind`] when the tag is absent, and
    /// [`ActionError::Malformed`] for anything else that does not decode.
    pub fn from_json(raw: &str) -> Result<Self, ActionError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(ActionError::MissingKind)?;
        if !Self::KINDS.contains(&kind) {
            return Err(ActionError::UnknownKind(kind.to_string()));
        }

        Ok(serde_json::from_value(value)?)
    }
}
