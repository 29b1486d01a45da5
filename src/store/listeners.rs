use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// A zero-argument callback invoked after every accepted state transition.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

struct Registration {
    id: u64,
    listener: Listener,
    active: AtomicBool,
}

#[derive(Default)]
struct Entries {
    next_id: u64,
    registrations: Vec<Arc<Registration>>,
}

/// Ordered set of listeners shared by a store and its subscriptions.
///
/// Broadcasts iterate over a snapshot taken when the broadcast starts:
/// listeners added mid-broadcast wait for the next transition, and listeners
/// removed mid-broadcast are skipped if they have not run yet.
pub(crate) struct ListenerRegistry {
    store: Cow<'static, str>,
    entries: Mutex<Entries>,
}

impl ListenerRegistry {
    pub(crate) fn new(store: Cow<'static, str>) -> Arc<Self> {
        Arc::new(Self {
            store,
            entries: Mutex::new(Entries::default()),
        })
    }

    /// Register `listener`, reusing the existing registration if the same
    /// `Arc` is already present.
    pub(crate) fn insert(self: &Arc<Self>, listener: Listener) -> Subscription {
        let mut entries = self.entries.lock();
        let existing = entries
            .registrations
            .iter()
            .find(|r| Arc::ptr_eq(&r.listener, &listener))
            .map(|r| r.id);

        let id = match existing {
            Some(id) => {
                tracing::trace!(store = %self.store, id, "listener already registered");
                id
            }
            None => {
                let id = entries.next_id;
                entries.next_id += 1;
                entries.registrations.push(Arc::new(Registration {
                    id,
                    listener,
                    active: AtomicBool::new(true),
                }));
                tracing::trace!(
                    store = %self.store,
                    id,
                    listeners = entries.registrations.len(),
                    "listener subscribed"
                );
                id
            }
        };

        Subscription {
            registry: Arc::downgrade(self),
            id,
            released: AtomicBool::new(false),
        }
    }

    fn remove(&self, id: u64) {
        let mut entries = self.entries.lock();
        if let Some(index) = entries.registrations.iter().position(|r| r.id == id) {
            let registration = entries.registrations.remove(index);
            registration.active.store(false, Ordering::Release);
            tracing::trace!(
                store = %self.store,
                id,
                listeners = entries.registrations.len(),
                "listener unsubscribed"
            );
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().registrations.len()
    }

    /// Invoke every listener registered at call time, in registration order.
    ///
    /// No lock is held while listeners run. Returns the number of listeners
    /// invoked.
    pub(crate) fn broadcast(&self) -> usize {
        let snapshot = self.entries.lock().registrations.clone();
        let mut invoked = 0;
        for registration in snapshot {
            if registration.active.load(Ordering::Acquire) {
                (registration.listener)();
                invoked += 1;
            }
        }
        invoked
    }
}

/// Handle to a registered listener.
///
/// Dropping the handle unsubscribes. Unsubscribing more than once, or after
/// the store is gone, does nothing.
#[must_use = "dropping a Subscription unsubscribes its listener immediately"]
pub struct Subscription {
    registry: Weak<ListenerRegistry>,
    id: u64,
    released: AtomicBool,
}

impl Subscription {
    /// Remove the listener from the store.
    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    /// Whether this handle still owns its registration.
    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::Acquire) && self.registry.strong_count() > 0
    }

    /// Keep the listener registered for the rest of the store's lifetime.
    pub fn forget(self) {
        self.released.store(true, Ordering::Release);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
