//! The state container.
//!
//! A [`Store`] owns one state value and a set of listeners. Transitions are
//! described by [`Update`] and accepted only when they produce a new `Arc`;
//! every accepted transition notifies all listeners synchronously.

mod listeners;
mod store;
mod update;

pub use listeners::{Listener, Subscription};
pub use store::{create_store, SetState, Store, Transition};
pub use update::Update;
