//! The todo list and counter state shape, driven through its own actions.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use snapstore::{create_store, SetState, Store, StoreError, Update};

type Action = Arc<dyn Fn() + Send + Sync>;
type IdAction = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Clone, Debug, PartialEq)]
struct Todo {
    id: u64,
    text: String,
    completed: bool,
}

#[derive(Clone)]
struct AppState {
    todos: Arc<Vec<Todo>>,
    count: u64,
    add_todo: Action,
    toggle_todo: IdAction,
    increment: Action,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1_000);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

fn app_store(initial: Vec<Todo>) -> Store<AppState> {
    create_store(move |set: SetState<AppState>| {
        let add = set.clone();
        let toggle = set.clone();
        AppState {
            todos: Arc::new(initial),
            count: 0,
            add_todo: Arc::new(move || {
                add.update(|s| {
                    let mut todos = (*s.todos).clone();
                    let text = format!("Todo {}", todos.len() + 1);
                    todos.push(Todo {
                        id: next_id(),
                        text,
                        completed: false,
                    });
                    AppState {
                        todos: Arc::new(todos),
                        ..s.clone()
                    }
                });
            }),
            toggle_todo: Arc::new(move |id| {
                toggle.update(move |s| AppState {
                    todos: Arc::new(
                        s.todos
                            .iter()
                            .map(|todo| {
                                if todo.id == id {
                                    Todo {
                                        completed: !todo.completed,
                                        ..todo.clone()
                                    }
                                } else {
                                    todo.clone()
                                }
                            })
                            .collect(),
                    ),
                    ..s.clone()
                });
            }),
            increment: Arc::new(move || {
                set.update(|s| AppState {
                    count: s.count + 1,
                    ..s.clone()
                });
            }),
        }
    })
}

#[test]
fn add_todo_round_trip() {
    let store = app_store(Vec::new());
    assert!(store.get_state().todos.is_empty());
    assert_eq!(store.get_state().count, 0);

    (store.get_state().add_todo)();
    let state = store.get_state();
    assert_eq!(state.todos.len(), 1);
    assert!(!state.todos[0].completed);
    assert_eq!(state.todos[0].text, "Todo 1");

    (store.get_state().add_todo)();
    let state = store.get_state();
    assert_eq!(state.todos.len(), 2);
    assert_ne!(state.todos[0].id, state.todos[1].id);
    assert_eq!(state.todos[1].text, "Todo 2");
}

#[test]
fn rapid_additions_get_unique_ids() {
    let store = app_store(Vec::new());
    let add = Arc::clone(&store.get_state().add_todo);
    for _ in 0..100 {
        add();
    }

    let ids: HashSet<u64> = store.get_state().todos.iter().map(|t| t.id).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn toggle_round_trip() {
    let store = app_store(vec![Todo {
        id: 1,
        text: String::from("Todo 1"),
        completed: false,
    }]);
    let toggle = Arc::clone(&store.get_state().toggle_todo);

    toggle(1);
    assert!(store.get_state().todos[0].completed);

    toggle(1);
    assert!(!store.get_state().todos[0].completed);
}

#[test]
fn toggle_leaves_other_todos_alone() {
    let store = app_store(vec![
        Todo {
            id: 1,
            text: String::from("a"),
            completed: false,
        },
        Todo {
            id: 2,
            text: String::from("b"),
            completed: true,
        },
    ]);

    (store.get_state().toggle_todo)(2);
    let todos = Arc::clone(&store.get_state().todos);
    assert!(!todos[0].completed);
    assert!(!todos[1].completed);
    assert_eq!(todos[0].text, "a");
}

#[test]
fn counter_counts_through_interleaving() {
    let store = app_store(Vec::new());
    let state = store.get_state();
    let (increment, add_todo) = (Arc::clone(&state.increment), Arc::clone(&state.add_todo));

    let n = 25;
    for i in 0..n {
        increment();
        if i % 3 == 0 {
            add_todo();
        }
    }

    assert_eq!(store.get_state().count, n);
    assert_eq!(store.get_state().todos.len(), 9);
}

#[test]
fn fragments_render_only_their_slice() {
    let store = app_store(Vec::new());

    // The todo list fragment and the counter fragment.
    let mut todos = store.use_store(|s| Arc::clone(&s.todos));
    let add_todo = store.use_store(|s| Arc::clone(&s.add_todo));
    let mut count = store.use_store(|s| s.count);
    let increment = store.use_store(|s| Arc::clone(&s.increment));

    (store.get_state().increment)();
    assert_eq!(count.take_pending_renders(), 1);
    assert_eq!(todos.take_pending_renders(), 0);
    assert_eq!(add_todo.take_pending_renders(), 0);
    assert_eq!(increment.take_pending_renders(), 0);
    assert_eq!(count.read(), 1);

    (store.get_state().add_todo)();
    assert_eq!(count.take_pending_renders(), 0);
    assert_eq!(todos.take_pending_renders(), 1);
    assert_eq!(todos.read().len(), 1);
}

#[test]
fn actions_do_not_keep_store_alive() {
    let store = app_store(Vec::new());
    let increment = Arc::clone(&store.get_state().increment);
    let setter = store.setter();
    drop(store);

    let result = setter.try_set_state(Update::transform(|s: &Arc<AppState>| Arc::clone(s)));
    assert!(matches!(result, Err(StoreError::Detached { .. })));

    // The store is gone; the captured action is now a no-op.
    increment();
}
