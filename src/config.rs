//! Store configuration.

use std::borrow::Cow;

/// Configuration for a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Label attached to every log event and error raised by the store.
    pub name: Cow<'static, str>,
}

impl StoreConfig {
    /// Create a configuration with the given store name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("store"),
        }
    }
}
