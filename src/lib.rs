//! # Snapstore
//!
//! An observable state container with selector-scoped subscriptions.
//!
//! Snapstore has two layers:
//!
//! ## Store (state and broadcast)
//!
//! - `Store<T>` - Holds one `Arc<T>` and replaces it on every accepted transition
//! - `Update<T>` - Either a replacement value or a transform of the current state
//! - `Subscription` - Handle that removes its listener when dropped
//!
//! A transition that hands back the current `Arc` is a no-op: no listener runs.
//!
//! ## Bridge (selectors and consumers)
//!
//! - `Selection<T, S>` - A store viewed through a selector
//! - `ExternalStore<S>` - The `subscribe` / `get_snapshot` capability hosts sync against
//! - `Consumer<S>` - A mounted reader that re-renders only when its selected value changes
//!
//! ```
//! use std::sync::Arc;
//! use snapstore::{create_store, SetState};
//!
//! #[derive(Clone)]
//! struct Counter {
//!     count: u32,
//!     increment: Arc<dyn Fn() + Send + Sync>,
//! }
//!
//! let store = create_store(|set: SetState<Counter>| Counter {
//!     count: 0,
//!     increment: Arc::new(move || {
//!         set.update(|s: &Counter| Counter { count: s.count + 1, ..s.clone() });
//!     }),
//! });
//!
//! let count = store.use_store(|s| s.count);
//! let increment = store.get_state().increment.clone();
//! increment();
//! increment();
//!
//! assert_eq!(store.get_state().count, 2);
//! assert_eq!(count.pending_renders(), 2);
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod store;

pub use bridge::{Consumer, ConsumerPhase, ExternalStore, Identical, Selection};
pub use config::StoreConfig;
pub use error::StoreError;
pub use store::{create_store, Listener, SetState, Store, Subscription, Transition, Update};
