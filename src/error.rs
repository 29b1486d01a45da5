use std::borrow::Cow;

use thiserror::Error;

/// Errors reported by [`SetState::try_set_state`](crate::SetState::try_set_state).
///
/// Both variants describe calls made outside the store's lifetime. Reads,
/// subscriptions and writes through a live [`Store`](crate::Store) never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The creator function has not returned yet, so there is no state to update.
    #[error("store `{store}` is still being constructed")]
    Constructing { store: Cow<'static, str> },

    /// Every `Store` handle has been dropped.
    #[error("store `{store}` has been dropped")]
    Detached { store: Cow<'static, str> },
}
