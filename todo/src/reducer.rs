//! Reducer logic for the todo list.
//!
//! Each action is validated and applied in place. An accepted action
//! yields one storage effect carrying a snapshot of the whole list; a
//! rejected one yields nothing and leaves the list untouched.

use crate::persistence::{self, TODOS_STORAGE_KEY};
use crate::types::{TodoAction, TodoId, TodoState};
use std::sync::Arc;
use todo_store_core::{
    SmallVec, effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec,
    storage::KeyValueStorage,
};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of fresh todo ids
    pub ids: Arc<dyn IdGenerator>,
    /// Local key-value storage holding the persisted list
    pub storage: Arc<dyn KeyValueStorage>,
    /// Slot key the list is written under
    pub storage_key: String,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment` writing under [`TODOS_STORAGE_KEY`]
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            ids,
            storage,
            storage_key: TODOS_STORAGE_KEY.to_string(),
        }
    }

    /// Write under `key` instead of the default slot
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment")
            .field("storage_key", &self.storage_key)
            .finish_non_exhaustive()
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Picks an id for a new item
    ///
    /// The generator's id is used unless a rehydrated item is already
    /// displayed with it (legacy `"2"` takes `2`), in which case the id
    /// after the largest numeric id is used.
    fn fresh_id(state: &TodoState, env: &TodoEnvironment) -> Option<TodoId> {
        let candidate = TodoId::Number(env.ids.next_id());
        if !state.is_taken(&candidate) {
            return Some(candidate);
        }
        state.next_free_id().map(TodoId::Number)
    }

    fn add(state: &mut TodoState, text: &str, env: &TodoEnvironment) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let Some(id) = Self::fresh_id(state, env) else {
            tracing::warn!("No free todo id left, dropping add");
            return false;
        };

        state.add(id, text)
    }
}

impl Default for TodoReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect; 4]> {
        let kind = action.kind();

        let accepted = match action {
            TodoAction::AddTodo(text) => Self::add(state, &text, env),
            TodoAction::ToggleTodo(id) => state.toggle(&id),
            TodoAction::EditTodo { id, text } => state.edit(&id, &text),
            TodoAction::RemoveTodo(id) => state.remove(&id),
        };

        if !accepted {
            tracing::debug!(kind, "Action rejected, list unchanged");
            return SmallVec::new();
        }

        tracing::debug!(kind, total = state.len(), "Action applied");
        persistence::persist_effect(state, env).map_or_else(SmallVec::new, |effect| smallvec![effect])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests can unwrap
mod tests {
    use super::*;
    use crate::types::TodoItem;
    use todo_store_core::environment::TimestampIdGenerator;
    use todo_store_testing::{
        InMemoryStorage, ReducerTest, SequentialIdGenerator,
        assertions::{self, storage_writes},
        test_clock,
    };

    fn create_test_env() -> TodoEnvironment {
        TodoEnvironment::new(
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(InMemoryStorage::new()),
        )
    }

    fn state_of(items: &[(u64, &str, bool)]) -> TodoState {
        TodoState::from_items(items.iter().map(|(id, text, completed)| TodoItem {
            id: TodoId::Number(*id),
            text: (*text).to_string(),
            completed: *completed,
        }))
    }

    #[test]
    fn test_add_todo_success() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTodo("  Buy milk ".to_string()))
            .then_state(|state| {
                assert_eq!(state, &state_of(&[(1, "Buy milk", false)]));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assert_eq!(
                    storage_writes(effects),
                    vec![(
                        "todos".to_string(),
                        r#"[{"id":1,"text":"Buy milk","completed":false}]"#.to_string()
                    )]
                );
            })
            .run();
    }

    #[test]
    fn test_add_todo_blank_text() {
        for text in ["", "   ", "\t\n"] {
            ReducerTest::new(TodoReducer::new())
                .with_env(create_test_env())
                .given_state(state_of(&[(1, "a", false)]))
                .when_action(TodoAction::AddTodo(text.to_string()))
                .then_state(|state| {
                    assert_eq!(state, &state_of(&[(1, "a", false)]));
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn test_add_todo_skips_ids_taken_by_rehydrated_items() {
        // Sequential ids start at 1, which the rehydrated list already uses
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_of(&[(1, "a", false), (5, "b", false)]))
            .when_action(TodoAction::AddTodo("c".to_string()))
            .then_state(|state| {
                assert_eq!(state.items()[2].id, TodoId::Number(6));
            })
            .then_effects(assertions::assert_has_storage_effect)
            .run();
    }

    #[test]
    fn test_add_todo_skips_ids_displayed_by_legacy_text_ids() {
        let state = TodoState::from_items(vec![
            TodoItem::new(TodoId::Number(1), "one".to_string()),
            TodoItem::new(TodoId::Text("2".to_string()), "legacy two".to_string()),
        ]);

        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state)
            .when_action(TodoAction::AddTodo("fresh".to_string()))
            .then_state(|state| {
                assert_eq!(state.items()[2].id, TodoId::Number(3));
                assert_eq!(state.find_id("2"), Some(TodoId::Text("2".to_string())));
                assert_eq!(state.find_id("3"), Some(TodoId::Number(3)));
            })
            .then_effects(assertions::assert_has_storage_effect)
            .run();
    }

    #[test]
    fn test_generated_id_matching_legacy_text_id_is_skipped() {
        let env = TodoEnvironment::new(
            Arc::new(SequentialIdGenerator::starting_at(2)),
            Arc::new(InMemoryStorage::new()),
        );
        let state = TodoState::from_items(vec![TodoItem::new(
            TodoId::Text("2".to_string()),
            "legacy two".to_string(),
        )]);

        ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(state)
            .when_action(TodoAction::AddTodo("fresh".to_string()))
            .then_state(|state| {
                assert_eq!(state.items()[1].id, TodoId::Number(3));
            })
            .run();
    }

    #[test]
    fn test_timestamp_ids_from_a_fixed_clock() {
        let env = TodoEnvironment::new(
            Arc::new(TimestampIdGenerator::new(Arc::new(test_clock()))),
            Arc::new(InMemoryStorage::new()),
        );

        // 2025-01-01T00:00:00Z; the second add lands in the same millisecond
        ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTodo("first".to_string()))
            .when_action(TodoAction::AddTodo("second".to_string()))
            .then_state(|state| {
                let ids: Vec<_> = state.items().iter().map(|t| t.id.clone()).collect();
                assert_eq!(
                    ids,
                    [
                        TodoId::Number(1_735_689_600_000),
                        TodoId::Number(1_735_689_600_001)
                    ]
                );
            })
            .run();
    }

    #[test]
    fn test_add_todo_without_free_ids() {
        let env = TodoEnvironment::new(
            Arc::new(SequentialIdGenerator::starting_at(u64::MAX)),
            Arc::new(InMemoryStorage::new()),
        );

        ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(state_of(&[(u64::MAX, "last", false)]))
            .when_action(TodoAction::AddTodo("one more".to_string()))
            .then_state(|state| assert_eq!(state.len(), 1))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_toggle_todo() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_of(&[(1, "a", false), (2, "b", false)]))
            .when_action(TodoAction::ToggleTodo(TodoId::Number(2)))
            .then_state(|state| {
                assert_eq!(state, &state_of(&[(1, "a", false), (2, "b", true)]));
            })
            .then_effects(assertions::assert_has_storage_effect)
            .run();
    }

    #[test]
    fn test_edit_todo_keeps_completion() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_of(&[(1, "Buy milk", true)]))
            .when_action(TodoAction::EditTodo {
                id: TodoId::Number(1),
                text: "Buy oat milk".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state, &state_of(&[(1, "Buy oat milk", true)]));
            })
            .then_effects(assertions::assert_has_storage_effect)
            .run();
    }

    #[test]
    fn test_edit_todo_blank_text_is_abandoned() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_of(&[(1, "Buy milk", false)]))
            .when_action(TodoAction::EditTodo {
                id: TodoId::Number(1),
                text: "  ".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state, &state_of(&[(1, "Buy milk", false)]));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_remove_todo() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(state_of(&[(1, "a", false), (2, "b", true)]))
            .when_action(TodoAction::RemoveTodo(TodoId::Number(1)))
            .then_state(|state| {
                assert_eq!(state, &state_of(&[(2, "b", true)]));
            })
            .then_effects(|effects| {
                assert_eq!(
                    storage_writes(effects),
                    vec![(
                        "todos".to_string(),
                        r#"[{"id":2,"text":"b","completed":true}]"#.to_string()
                    )]
                );
            })
            .run();
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        let missing = TodoId::Text("nope".to_string());
        for action in [
            TodoAction::ToggleTodo(missing.clone()),
            TodoAction::EditTodo {
                id: missing.clone(),
                text: "new".to_string(),
            },
            TodoAction::RemoveTodo(missing.clone()),
        ] {
            ReducerTest::new(TodoReducer::new())
                .with_env(create_test_env())
                .given_state(state_of(&[(1, "a", false)]))
                .when_action(action)
                .then_state(|state| {
                    assert_eq!(state, &state_of(&[(1, "a", false)]));
                })
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn test_custom_storage_key() {
        let env = create_test_env().with_storage_key("my-todos");

        ReducerTest::new(TodoReducer::new())
            .with_env(env)
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTodo("x".to_string()))
            .then_effects(|effects| {
                let writes = storage_writes(effects);
                assert_eq!(writes.len(), 1);
                assert_eq!(writes[0].0, "my-todos");
            })
            .run();
    }

    #[test]
    fn test_buy_milk_scenario() {
        ReducerTest::new(TodoReducer::new())
            .with_env(create_test_env())
            .given_state(TodoState::new())
            .when_action(TodoAction::AddTodo("Buy milk".to_string()))
            .when_action(TodoAction::ToggleTodo(TodoId::Number(1)))
            .when_action(TodoAction::EditTodo {
                id: TodoId::Number(1),
                text: "Buy oat milk".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state, &state_of(&[(1, "Buy oat milk", true)]));
            })
            .then_effects(|effects| {
                assert_eq!(
                    storage_writes(effects)[0].1,
                    r#"[{"id":1,"text":"Buy oat milk","completed":true}]"#
                );
            })
            .run();
    }
}
