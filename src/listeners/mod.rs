//! # Listeners and listener identity.
//!
//! This module provides the listener-related types:
//! - [`Listener`] - a callable registered on an [`EventSlot`](crate::EventSlot)
//! - [`ListenerId`] - identity used for duplicate detection and unsubscribe
//! - [`Handle`] - trait for object listeners, bound to their owner like a method
//! - [`BoxListenerFuture`] - boxed future returned by async listeners
//!
//! ## Listener shapes
//! ```text
//! Listener
//!   ├─ free callable   Listener::from_fn / from_async     (always held strongly)
//!   └─ bound           Listener::method / async_method    (owner held strongly or weakly,
//!                      Listener::handler                    depending on the slot)
//! ```

mod bound;
mod handler;
mod listener;

pub use handler::Handle;
pub use listener::{BoxListenerFuture, Listener, ListenerId};

pub(crate) use listener::{AsyncFn, Callable, SyncFn};
