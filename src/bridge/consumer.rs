use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::external::ExternalStore;
use super::identity::Identical;
use crate::store::Subscription;

type Schedule = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle of a [`Consumer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerPhase {
    /// Not yet read; holds no subscription.
    Unmounted,
    /// Read at least once; subscribed to its source.
    Subscribed,
}

struct Shared<S> {
    source: Box<dyn ExternalStore<S>>,
    label: Cow<'static, str>,
    snapshot: Mutex<Option<S>>,
    pending: AtomicUsize,
    schedule: Option<Schedule>,
}

impl<S: Identical> Shared<S> {
    /// Cache `fresh`. Returns true if it differs from the cached snapshot.
    fn store_snapshot(&self, fresh: S) -> bool {
        let mut cached = self.snapshot.lock();
        let changed = !matches!(cached.as_ref(), Some(prev) if prev.identical(&fresh));
        *cached = Some(fresh);
        changed
    }

    /// Runs inside the source's broadcast. A panicking snapshot must not
    /// unwind into the writer or cut the broadcast short: it counts as a
    /// change and is raised again by the next `read`.
    fn on_change(&self) {
        let changed = match panic::catch_unwind(AssertUnwindSafe(|| self.source.get_snapshot())) {
            Ok(fresh) => self.store_snapshot(fresh),
            Err(_) => {
                tracing::debug!(store = %self.label, "snapshot panicked during broadcast");
                true
            }
        };
        tracing::trace!(store = %self.label, changed, "consumer pulled snapshot");
        if changed {
            self.pending.fetch_add(1, Ordering::SeqCst);
            if let Some(schedule) = &self.schedule {
                schedule();
            }
        }
    }
}

/// One mounted reader of an [`ExternalStore`].
///
/// A consumer plays the role of a component bound to outside state. The
/// first read takes a snapshot and subscribes. On every change notification
/// it pulls a new snapshot, caches it, and counts a pending re-render only
/// when the new snapshot is not [`Identical`] to the previous one. Dropping
/// the consumer unsubscribes.
pub struct Consumer<S> {
    shared: Arc<Shared<S>>,
    subscription: Option<Subscription>,
}

impl<S> Consumer<S>
where
    S: Identical + Clone + Send + Sync + 'static,
{
    /// Create an unmounted consumer of `source`.
    pub fn new(source: impl ExternalStore<S> + 'static) -> Self {
        Self::build(Box::new(source), None)
    }

    /// Create an unmounted consumer that calls `schedule` whenever it needs
    /// to re-render.
    pub fn with_scheduler<F>(source: impl ExternalStore<S> + 'static, schedule: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::build(Box::new(source), Some(Arc::new(schedule)))
    }

    fn build(source: Box<dyn ExternalStore<S>>, schedule: Option<Schedule>) -> Self {
        let label = source.label();
        Self {
            shared: Arc::new(Shared {
                source,
                label,
                snapshot: Mutex::new(None),
                pending: AtomicUsize::new(0),
                schedule,
            }),
            subscription: None,
        }
    }

    /// Whether the consumer has mounted.
    pub fn phase(&self) -> ConsumerPhase {
        if self.subscription.is_some() {
            ConsumerPhase::Subscribed
        } else {
            ConsumerPhase::Unmounted
        }
    }

    /// The selected value for the current render.
    ///
    /// Returns the cached snapshot if the source still yields an identical
    /// value, otherwise caches and returns the new one. The first call
    /// subscribes.
    pub fn read(&mut self) -> S {
        if self.subscription.is_none() {
            let initial = self.shared.source.get_snapshot();
            return self.mount(initial);
        }

        let fresh = self.shared.source.get_snapshot();
        let mut cached = self.shared.snapshot.lock();
        if let Some(prev) = cached.as_ref() {
            if prev.identical(&fresh) {
                return prev.clone();
            }
        }
        *cached = Some(fresh.clone());
        fresh
    }

    /// First read during hydration, using the server snapshot.
    ///
    /// Behaves like [`read`](Self::read) once mounted.
    pub fn hydrate(&mut self) -> S {
        if self.subscription.is_some() {
            return self.read();
        }
        let initial = self.shared.source.get_server_snapshot();
        self.mount(initial)
    }

    fn mount(&mut self, initial: S) -> S {
        *self.shared.snapshot.lock() = Some(initial.clone());

        let weak: Weak<Shared<S>> = Arc::downgrade(&self.shared);
        let subscription = self.shared.source.subscribe(Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_change();
            }
        }));
        self.subscription = Some(subscription);
        tracing::debug!(store = %self.shared.label, "consumer mounted");
        initial
    }

    /// Re-renders requested since the last [`take_pending_renders`](Self::take_pending_renders).
    pub fn pending_renders(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Return and clear the pending re-render count.
    pub fn take_pending_renders(&self) -> usize {
        self.shared.pending.swap(0, Ordering::SeqCst)
    }

    /// Tear the consumer down, releasing its subscription.
    pub fn unmount(self) {
        drop(self);
    }
}

impl<S> Drop for Consumer<S> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            tracing::debug!(store = %self.shared.label, "consumer unmounted");
        }
    }
}
