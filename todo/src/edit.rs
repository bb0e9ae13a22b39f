//! Inline edit session for a single todo.
//!
//! The session lives in the presentation layer. It never touches the store
//! directly: saving produces an [`TodoAction::EditTodo`] for the caller to
//! dispatch.

use crate::types::{TodoAction, TodoId, TodoItem};

/// Which todo is being edited, and the draft text
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditSession {
    editing_id: Option<TodoId>,
    edit_text: String,
}

impl EditSession {
    /// Creates an idle session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts editing `item`, seeding the draft with its current text
    ///
    /// Replaces any edit already in progress.
    pub fn start(&mut self, item: &TodoItem) {
        self.editing_id = Some(item.id.clone());
        self.edit_text.clone_from(&item.text);
    }

    /// Replaces the draft text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.edit_text = text.into();
    }

    /// Abandons the edit
    pub fn cancel(&mut self) {
        self.editing_id = None;
        self.edit_text.clear();
    }

    /// Returns `true` while `id` is being edited
    #[must_use]
    pub fn is_editing(&self, id: &TodoId) -> bool {
        self.editing_id.as_ref() == Some(id)
    }

    /// Id under edit, if any
    #[must_use]
    pub const fn editing_id(&self) -> Option<&TodoId> {
        self.editing_id.as_ref()
    }

    /// Current draft text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.edit_text
    }

    /// Finishes the edit
    ///
    /// Returns the action to dispatch and resets the session. With no edit
    /// in progress, or a blank draft, returns `None` and leaves the session
    /// as it was.
    pub fn save(&mut self) -> Option<TodoAction> {
        if self.edit_text.trim().is_empty() {
            return None;
        }
        let id = self.editing_id.take()?;
        let text = std::mem::take(&mut self.edit_text);
        Some(TodoAction::EditTodo { id, text })
    }
}
