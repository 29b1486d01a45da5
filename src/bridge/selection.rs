use std::borrow::Cow;
use std::sync::Arc;

use super::consumer::Consumer;
use super::external::ExternalStore;
use super::identity::Identical;
use crate::store::{Listener, Store, Subscription};

type Selector<T, S> = Arc<dyn Fn(&Arc<T>) -> S + Send + Sync>;

/// A store viewed through a selector.
///
/// Each snapshot re-runs the selector against the current state; nothing is
/// cached here. Caching and identity comparison belong to the [`Consumer`].
pub struct Selection<T, S> {
    store: Store<T>,
    selector: Selector<T, S>,
}

impl<T, S> Selection<T, S> {
    /// View `store` through `selector`.
    pub fn new<F>(store: Store<T>, selector: F) -> Self
    where
        F: Fn(&Arc<T>) -> S + Send + Sync + 'static,
    {
        Self {
            store,
            selector: Arc::new(selector),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Store<T> {
        &self.store
    }
}

impl<T, S> Clone for Selection<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<T, S> ExternalStore<S> for Selection<T, S>
where
    T: Send + Sync,
{
    fn subscribe(&self, on_change: Listener) -> Subscription {
        self.store.subscribe_listener(on_change)
    }

    fn get_snapshot(&self) -> S {
        (self.selector)(&self.store.get_state())
    }

    fn label(&self) -> Cow<'static, str> {
        self.store.config().name.clone()
    }
}

impl<T> Store<T>
where
    T: Send + Sync + 'static,
{
    /// View this store through `selector`.
    pub fn select<S, F>(&self, selector: F) -> Selection<T, S>
    where
        F: Fn(&Arc<T>) -> S + Send + Sync + 'static,
    {
        Selection::new(self.clone(), selector)
    }

    /// Mount a consumer of the value picked by `selector`.
    ///
    /// The returned consumer takes its first snapshot and subscribes
    /// immediately, and unsubscribes when dropped.
    ///
    /// ```
    /// use std::borrow::Cow;
    /// use std::sync::Arc;
    /// use snapstore::create_store;
    ///
    /// #[derive(Clone)]
    /// struct State {
    ///     todos: Arc<Vec<String>>,
    ///     count: u32,
    /// }
    ///
    /// let store = create_store(|_| State { todos: Arc::new(Vec::new()), count: 0 });
    /// let todos = store.use_store(|s| Arc::clone(&s.todos));
    /// let mut count = store.use_store(|s| s.count);
    ///
    /// store.update(|s: &State| State { count: s.count + 1, ..s.clone() });
    ///
    /// assert_eq!(count.take_pending_renders(), 1);
    /// assert_eq!(todos.take_pending_renders(), 0);
    /// assert_eq!(count.read(), 1);
    /// ```
    pub fn use_store<S, F>(&self, selector: F) -> Consumer<S>
    where
        S: Identical + Clone + Send + Sync + 'static,
        F: Fn(&Arc<T>) -> S + Send + Sync + 'static,
    {
        let mut consumer = Consumer::new(self.select(selector));
        consumer.read();
        consumer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::create_store;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct State {
        items: Arc<Vec<u32>>,
        count: u32,
    }

    fn store() -> Store<State> {
        create_store(|_| State {
            items: Arc::new(vec![1]),
            count: 0,
        })
    }

    #[test]
    fn snapshot_reruns_selector() {
        let store = store();
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();
        let selection = store.select(move |s| {
            runs_clone.fetch_add(1, Ordering::SeqCst);
            s.count
        });

        assert_eq!(selection.get_snapshot(), 0);
        store.update(|s| State { count: 4, ..s.clone() });
        assert_eq!(selection.get_snapshot(), 4);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn server_snapshot_matches_client() {
        let store = store();
        let selection = store.select(|s| Arc::clone(&s.items));
        assert!(selection
            .get_server_snapshot()
            .identical(&selection.get_snapshot()));
    }

    #[test]
    fn label_is_store_name() {
        let store = Store::with_config(crate::StoreConfig::named("todos"), |_| 0_u8);
        assert_eq!(store.select(|s| **s).label(), "todos");
    }

    #[test]
    fn subscribe_goes_to_store() {
        let store = store();
        let selection = store.select(|s| s.count);
        let sub = selection.subscribe(Arc::new(|| {}));
        assert_eq!(store.listener_count(), 1);
        drop(sub);
        assert_eq!(store.listener_count(), 0);
    }
}
