//! Two fragments sharing one store: a todo list and a counter.
//!
//! Run with `RUST_LOG=snapstore=trace` to see every transition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use snapstore::{create_store, Consumer, SetState, Store};
use tracing_subscriber::EnvFilter;

type Action = Arc<dyn Fn() + Send + Sync>;
type IdAction = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Clone, Debug)]
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

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn app_store() -> Store<AppState> {
    create_store(|set: SetState<AppState>| {
        let add = set.clone();
        let toggle = set.clone();
        AppState {
            todos: Arc::new(Vec::new()),
            count: 0,
            add_todo: Arc::new(move || {
                add.update(|s| {
                    let mut todos = (*s.todos).clone();
                    todos.push(Todo {
                        id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                        text: format!("Todo {}", todos.len() + 1),
                        completed: false,
                    });
                    AppState {
                        todos: Arc::new(todos),
                        ..s.clone()
                    }
                });
            }),
            toggle_todo: Arc::new(move |id| {
                toggle.update(move |s| {
                    let todos = s
                        .todos
                        .iter()
                        .map(|todo| Todo {
                            completed: todo.completed != (todo.id == id),
                            ..todo.clone()
                        })
                        .collect();
                    AppState {
                        todos: Arc::new(todos),
                        ..s.clone()
                    }
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

fn render_todos(todos: &mut Consumer<Arc<Vec<Todo>>>) {
    println!("   [Todos] rendered:");
    for todo in todos.read().iter() {
        let mark = if todo.completed { "x" } else { " " };
        println!("     [{mark}] {} (id {})", todo.text, todo.id);
    }
}

fn render_count(count: &mut Consumer<u64>) {
    println!("   [Count] rendered: {}", count.read());
}

/// Re-render each fragment that asked for it.
fn flush(todos: &mut Consumer<Arc<Vec<Todo>>>, count: &mut Consumer<u64>) {
    if todos.take_pending_renders() > 0 {
        render_todos(todos);
    }
    if count.take_pending_renders() > 0 {
        render_count(count);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Todo List and Counter ===\n");

    let store = app_store();
    let actions = store.get_state();

    println!("1. Mounting fragments");
    let mut todos = store.use_store(|s| Arc::clone(&s.todos));
    let mut count = store.use_store(|s| s.count);
    render_todos(&mut todos);
    render_count(&mut count);

    println!("\n2. Adding two todos (only the todo list re-renders)");
    (actions.add_todo)();
    flush(&mut todos, &mut count);
    (actions.add_todo)();
    flush(&mut todos, &mut count);

    println!("\n3. Incrementing (only the counter re-renders)");
    (actions.increment)();
    (actions.increment)();
    flush(&mut todos, &mut count);

    println!("\n4. Toggling the first todo");
    let first = todos.read()[0].id;
    (actions.toggle_todo)(first);
    flush(&mut todos, &mut count);

    println!("\n5. Unmounting");
    todos.unmount();
    count.unmount();
    println!("   Listeners left: {}", store.listener_count());
}
