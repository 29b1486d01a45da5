use std::borrow::Cow;

use crate::store::{Listener, Subscription};

/// The capability a host needs to keep a consumer in sync with outside state.
///
/// `subscribe` registers a change callback, and `get_snapshot` reads the
/// current value. Hosts call `get_snapshot` after every change notification
/// and compare the result with the value they rendered last.
pub trait ExternalStore<S>: Send + Sync {
    /// Register `on_change` to run after every change of the underlying state.
    fn subscribe(&self, on_change: Listener) -> Subscription;

    /// The current snapshot.
    fn get_snapshot(&self) -> S;

    /// The snapshot used for server rendering and hydration.
    ///
    /// There is no separate server state, so this is the client snapshot.
    fn get_server_snapshot(&self) -> S {
        self.get_snapshot()
    }

    /// Name attached to log events of consumers of this source.
    fn label(&self) -> Cow<'static, str> {
        Cow::Borrowed("external")
    }
}
