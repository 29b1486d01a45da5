use std::borrow::Cow;
use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::listeners::{Listener, ListenerRegistry, Subscription};
use super::update::Update;
use crate::config::StoreConfig;
use crate::error::StoreError;

/// Outcome of a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state was replaced and listeners were notified.
    Changed,
    /// The update resolved to the current state; nothing happened.
    Unchanged,
}

thread_local! {
    // Stores whose updater is running on this thread.
    static UPDATING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a store as running an updater until dropped, including on unwind.
struct UpdateScope {
    key: usize,
}

impl UpdateScope {
    fn enter(key: usize) -> Self {
        UPDATING.with(|keys| keys.borrow_mut().push(key));
        Self { key }
    }
}

impl Drop for UpdateScope {
    fn drop(&mut self) {
        UPDATING.with(|keys| {
            let mut keys = keys.borrow_mut();
            if let Some(pos) = keys.iter().rposition(|k| *k == self.key) {
                keys.remove(pos);
            }
        });
    }
}

pub(crate) struct StoreInner<T> {
    config: StoreConfig,
    state: RwLock<Arc<T>>,
    listeners: Arc<ListenerRegistry>,
}

impl<T> StoreInner<T> {
    fn key(&self) -> usize {
        self as *const Self as usize
    }

    /// Panics if this thread is inside one of this store's updaters, where
    /// touching the state lock would deadlock.
    fn assert_not_updating(&self) {
        let key = self.key();
        if UPDATING.with(|keys| keys.borrow().contains(&key)) {
            panic!(
                "store `{}` re-entered from its own updater; updaters receive the current state and must not call the store",
                self.config.name
            );
        }
    }

    fn get_state(&self) -> Arc<T> {
        self.assert_not_updating();
        Arc::clone(&self.state.read())
    }

    fn set_state(&self, update: Update<T>) -> Transition {
        self.assert_not_updating();
        {
            let mut state = self.state.write();
            let _scope = UpdateScope::enter(self.key());
            let next = update.resolve(&state);
            if Arc::ptr_eq(&next, &state) {
                tracing::trace!(store = %self.config.name, "state unchanged");
                return Transition::Unchanged;
            }
            *state = next;
        }

        let notified = self.listeners.broadcast();
        tracing::debug!(store = %self.config.name, notified, "state changed");
        Transition::Changed
    }
}

/// A shared state container.
///
/// The state lives behind an `Arc<T>` and is never mutated in place: each
/// accepted transition swaps in a new `Arc`, and an update that hands back
/// the current `Arc` is ignored. Listeners run synchronously after every
/// accepted transition.
///
/// `Store` is a cheap handle; clones share the same state and listeners.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use snapstore::{create_store, Update};
///
/// let store = create_store(|_set| 0_u32);
/// store.set_state(Update::map(|n: &u32| n + 1));
/// assert_eq!(*store.get_state(), 1);
///
/// // Handing back the same Arc is a no-op.
/// let current = store.get_state();
/// store.set_state(Arc::clone(&current));
/// assert!(Arc::ptr_eq(&current, &store.get_state()));
/// ```
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T: 'static> Store<T> {
    /// Create a store whose initial state is built by `creator`.
    ///
    /// `creator` runs exactly once and receives a [`SetState`] handle that
    /// state-embedded actions can capture.
    pub fn new<F>(creator: F) -> Self
    where
        F: FnOnce(SetState<T>) -> T,
    {
        Self::with_config(StoreConfig::default(), creator)
    }

    /// Create a store with an explicit configuration.
    pub fn with_config<F>(config: StoreConfig, creator: F) -> Self
    where
        F: FnOnce(SetState<T>) -> T,
    {
        let ready = Arc::new(AtomicBool::new(false));
        let inner = Arc::new_cyclic(|weak: &Weak<StoreInner<T>>| {
            let set = SetState {
                inner: weak.clone(),
                ready: Arc::clone(&ready),
                name: config.name.clone(),
            };
            let initial = creator(set);
            StoreInner {
                listeners: ListenerRegistry::new(config.name.clone()),
                state: RwLock::new(Arc::new(initial)),
                config,
            }
        });
        ready.store(true, Ordering::Release);
        tracing::debug!(store = %inner.config.name, "store created");

        Self { inner }
    }
}

impl<T> Store<T> {
    /// The current state.
    pub fn get_state(&self) -> Arc<T> {
        self.inner.get_state()
    }

    /// Apply a state transition.
    ///
    /// If the update resolves to the current `Arc` nothing happens; otherwise
    /// the state is replaced and every registered listener runs once, in
    /// registration order, before this call returns.
    ///
    /// The updater runs under the state lock and must not call back into this
    /// store; doing so panics. Listeners run after the lock is released and may.
    ///
    /// # Panics
    ///
    /// If called from inside one of this store's updaters.
    pub fn set_state(&self, update: impl Into<Update<T>>) -> Transition {
        self.inner.set_state(update.into())
    }

    /// Replace the state with a new value.
    pub fn replace(&self, value: T) -> Transition {
        self.set_state(Update::replace(value))
    }

    /// Derive a new state by value.
    pub fn update<F>(&self, f: F) -> Transition
    where
        T: 'static,
        F: FnOnce(&T) -> T + 'static,
    {
        self.set_state(Update::map(f))
    }

    /// Register a callback to run after every accepted transition.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe_listener(Arc::new(listener))
    }

    /// Register a shared listener.
    ///
    /// Registering the same `Arc` twice keeps a single registration; either
    /// returned handle removes it.
    pub fn subscribe_listener(&self, listener: Listener) -> Subscription {
        self.inner.listeners.insert(listener)
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// The configuration this store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// A write handle equivalent to the one given to the creator.
    pub fn setter(&self) -> SetState<T> {
        SetState {
            inner: Arc::downgrade(&self.inner),
            ready: Arc::new(AtomicBool::new(true)),
            name: self.inner.config.name.clone(),
        }
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.config.name)
            .field("listeners", &self.inner.listeners.len())
            .finish_non_exhaustive()
    }
}

/// Write handle passed to a store's creator function.
///
/// Holds a weak reference, so state that embeds actions capturing a
/// `SetState` does not keep its own store alive.
pub struct SetState<T> {
    inner: Weak<StoreInner<T>>,
    ready: Arc<AtomicBool>,
    name: Cow<'static, str>,
}

impl<T> SetState<T> {
    /// Apply a state transition, reporting calls made outside the store's
    /// lifetime.
    pub fn try_set_state(&self, update: impl Into<Update<T>>) -> Result<Transition, StoreError> {
        if !self.ready.load(Ordering::Acquire) {
            return Err(StoreError::Constructing {
                store: self.name.clone(),
            });
        }
        let inner = self.inner.upgrade().ok_or_else(|| StoreError::Detached {
            store: self.name.clone(),
        })?;
        Ok(inner.set_state(update.into()))
    }

    /// Apply a state transition. See [`Store::set_state`].
    ///
    /// Calls made before the creator returns or after the store is dropped
    /// are ignored.
    pub fn set_state(&self, update: impl Into<Update<T>>) -> Transition {
        match self.try_set_state(update) {
            Ok(transition) => transition,
            Err(error) => {
                tracing::warn!(store = %self.name, %error, "state update ignored");
                Transition::Unchanged
            }
        }
    }

    /// Derive a new state by value.
    pub fn update<F>(&self, f: F) -> Transition
    where
        T: 'static,
        F: FnOnce(&T) -> T + 'static,
    {
        self.set_state(Update::map(f))
    }

    /// Replace the state with a new value.
    pub fn replace(&self, value: T) -> Transition {
        self.set_state(Update::replace(value))
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            ready: Arc::clone(&self.ready),
            name: self.name.clone(),
        }
    }
}

/// Create a new store. See [`Store::new`].
///
/// # Example
///
/// ```
/// use snapstore::create_store;
///
/// #[derive(Clone)]
/// struct Counter {
///     count: u32,
/// }
///
/// let store = create_store(|_set| Counter { count: 0 });
/// store.update(|s: &Counter| Counter { count: s.count + 1 });
/// assert_eq!(store.get_state().count, 1);
/// ```
pub fn create_store<T, F>(creator: F) -> Store<T>
where
    T: 'static,
    F: FnOnce(SetState<T>) -> T,
{
    Store::new(creator)
}
