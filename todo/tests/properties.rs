//! Property tests for the todo reducer.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use todo::persistence::decode_snapshot;
use todo::{TodoAction, TodoEnvironment, TodoId, TodoItem, TodoReducer, TodoState};
use todo_store_core::{effect::Effect, reducer::Reducer};
use todo_store_testing::{InMemoryStorage, SequentialIdGenerator, assertions::storage_writes};

fn env() -> TodoEnvironment {
    TodoEnvironment::new(
        Arc::new(SequentialIdGenerator::new()),
        Arc::new(InMemoryStorage::new()),
    )
}

fn apply(state: &mut TodoState, action: TodoAction, env: &TodoEnvironment) -> Vec<Effect> {
    TodoReducer::new().reduce(state, action, env).into_vec()
}

fn state_strategy() -> impl Strategy<Value = TodoState> {
    proptest::collection::vec((1u64..50, "[a-z ]{0,10}", any::<bool>()), 0..8).prop_map(|items| {
        TodoState::from_items(items.into_iter().map(|(id, text, completed)| TodoItem {
            id: TodoId::Number(id),
            text,
            completed,
        }))
    })
}

fn id_strategy() -> impl Strategy<Value = TodoId> {
    prop_oneof![
        (1u64..50).prop_map(TodoId::Number),
        "[a-z]{1,3}".prop_map(TodoId::Text),
    ]
}

fn action_strategy() -> impl Strategy<Value = TodoAction> {
    let text = "[a-z ]{0,8}";
    prop_oneof![
        text.prop_map(TodoAction::AddTodo),
        id_strategy().prop_map(TodoAction::ToggleTodo),
        (id_strategy(), text).prop_map(|(id, text)| TodoAction::EditTodo { id, text }),
        id_strategy().prop_map(TodoAction::RemoveTodo),
    ]
}

proptest! {
    #[test]
    fn unknown_ids_leave_the_list_alone(
        state in state_strategy(),
        id in id_strategy(),
        text in "[a-z]{1,5}",
    ) {
        prop_assume!(!state.contains(&id));
        let env = env();

        for action in [
            TodoAction::ToggleTodo(id.clone()),
            TodoAction::EditTodo { id: id.clone(), text: text.clone() },
            TodoAction::RemoveTodo(id.clone()),
        ] {
            let mut next = state.clone();
            let effects = apply(&mut next, action, &env);
            prop_assert_eq!(&next, &state);
            prop_assert!(effects.is_empty());
        }
    }

    #[test]
    fn blank_add_is_a_no_op(state in state_strategy(), blank in "[ \t\n]{0,4}") {
        let mut next = state.clone();
        let effects = apply(&mut next, TodoAction::AddTodo(blank), &env());
        prop_assert_eq!(next, state);
        prop_assert!(effects.is_empty());
    }

    #[test]
    fn remove_undoes_add(state in state_strategy(), text in "[a-z]{1,8}") {
        let env = env();
        let mut next = state.clone();

        apply(&mut next, TodoAction::AddTodo(text), &env);
        let new_id = next.items().last().unwrap().id.clone();
        prop_assert!(!state.contains(&new_id));
        apply(&mut next, TodoAction::RemoveTodo(new_id), &env);

        prop_assert_eq!(next, state);
    }

    #[test]
    fn add_after_legacy_ids_keeps_displayed_ids_unique(
        legacy in proptest::collection::btree_map(1u64..10, any::<bool>(), 0..8),
        start in 1u64..12,
    ) {
        // Mix numeric ids with text ids that display the same way
        let mut state = TodoState::from_items(legacy.into_iter().map(|(n, as_text)| {
            let id = if as_text { TodoId::Text(n.to_string()) } else { TodoId::Number(n) };
            TodoItem::new(id, "old".to_string())
        }));

        let env = TodoEnvironment::new(
            Arc::new(SequentialIdGenerator::starting_at(start)),
            Arc::new(InMemoryStorage::new()),
        );
        apply(&mut state, TodoAction::AddTodo("fresh".to_string()), &env);

        let shown: HashSet<String> = state.items().iter().map(|t| t.id.to_string()).collect();
        prop_assert_eq!(shown.len(), state.len());
        prop_assert_eq!(&state.items().last().unwrap().text, "fresh");
    }

    #[test]
    fn double_toggle_is_identity(state in state_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!state.is_empty());
        let id = pick.get(state.items()).id.clone();
        let env = env();
        let mut next = state.clone();

        apply(&mut next, TodoAction::ToggleTodo(id.clone()), &env);
        apply(&mut next, TodoAction::ToggleTodo(id), &env);

        prop_assert_eq!(next, state);
    }

    #[test]
    fn reachable_lists_stay_consistent(
        actions in proptest::collection::vec(action_strategy(), 0..30)
    ) {
        let env = env();
        let mut state = TodoState::new();

        for action in actions {
            let before = state.clone();
            let effects = apply(&mut state, action, &env);

            let stats = state.stats();
            prop_assert_eq!(stats.total, stats.completed + stats.pending);
            prop_assert!(state.items().iter().all(|t| !t.text.is_empty() && t.text.trim() == t.text));

            let shown: HashSet<String> = state.items().iter().map(|t| t.id.to_string()).collect();
            prop_assert_eq!(shown.len(), state.len());

            let writes = storage_writes(&effects);
            if state == before {
                // Editing to the same text is accepted without a visible change
                prop_assert!(writes.len() <= 1);
            } else {
                prop_assert_eq!(writes.len(), 1);
            }
            if let Some((_, value)) = writes.first() {
                prop_assert_eq!(&decode_snapshot(value), &state);
            }
        }
    }
}
