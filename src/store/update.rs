use std::fmt;
use std::sync::Arc;

type Transform<T> = Box<dyn FnOnce(&Arc<T>) -> Arc<T>>;

/// The argument to a state transition.
///
/// A transition either replaces the state outright or derives the next state
/// from the current one. Returning the current `Arc` unchanged from a
/// transform marks the transition as a no-op.
pub enum Update<T> {
    /// Use this value as the next state.
    Replace(Arc<T>),
    /// Compute the next state from the current one.
    Transform(Transform<T>),
}

impl<T> Update<T> {
    /// Replace the state with a new value.
    pub fn replace(value: T) -> Self {
        Update::Replace(Arc::new(value))
    }

    /// Replace the state with an existing shared value.
    ///
    /// Passing the store's current `Arc` leaves the store untouched.
    pub fn shared(value: Arc<T>) -> Self {
        Update::Replace(value)
    }

    /// Derive the next state from the current `Arc`.
    pub fn transform<F>(f: F) -> Self
    where
        F: FnOnce(&Arc<T>) -> Arc<T> + 'static,
    {
        Update::Transform(Box::new(f))
    }

    /// Derive the next state by value. Always produces a new state.
    pub fn map<F>(f: F) -> Self
    where
        T: 'static,
        F: FnOnce(&T) -> T + 'static,
    {
        Update::transform(move |state: &Arc<T>| Arc::new(f(state)))
    }

    pub(crate) fn resolve(self, current: &Arc<T>) -> Arc<T> {
        match self {
            Update::Replace(next) => next,
            Update::Transform(f) => f(current),
        }
    }
}

impl<T> From<Arc<T>> for Update<T> {
    fn from(value: Arc<T>) -> Self {
        Update::Replace(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}
