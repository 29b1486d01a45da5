//! Selector-scoped consumers.
//!
//! A [`Selection`] exposes a store through a selector as an
//! [`ExternalStore`], the two-operation capability (`subscribe`,
//! `get_snapshot`) a host rendering layer synchronizes against. A
//! [`Consumer`] is such a host: it subscribes on first read, pulls a fresh
//! snapshot after each broadcast, and requests a re-render only when the
//! snapshot is not [`Identical`] to the cached one.

mod consumer;
mod external;
mod identity;
mod selection;

pub use consumer::{Consumer, ConsumerPhase};
pub use external::ExternalStore;
pub use identity::Identical;
pub use selection::Selection;
