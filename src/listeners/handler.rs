//! # Object listeners.
//!
//! [`Handle`] is the extension point for listeners that carry their own state. A handler
//! is bound to its `Arc` owner like a method, so in a weak slot it is dropped together
//! with the owner.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use async_trait::async_trait;
//! use eventslot::{EventSlot, Handle, Listener, ListenerResult};
//!
//! struct Audit {
//!     seen: AtomicU64,
//! }
//!
//! #[async_trait]
//! impl Handle<String> for Audit {
//!     async fn on_event(&self, _line: &String) -> ListenerResult {
//!         self.seen.fetch_add(1, Ordering::Relaxed);
//!         Ok(())
//!     }
//!
//!     fn name(&self) -> &'static str { "audit" }
//! }
//!
//! let audit = Arc::new(Audit { seen: AtomicU64::new(0) });
//! let slot = EventSlot::<String>::new("on_line");
//! slot.subscribe(Listener::handler(&audit)).unwrap();
//! assert_eq!(slot.len(), 1);
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use super::listener::BoxListenerFuture;
use crate::error::ListenerResult;

/// Stateful async listener.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Return `Err` for failures; panics are caught but leave no chance to clean up.
#[async_trait]
pub trait Handle<A: Send + Sync + 'static>: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, args: &A) -> ListenerResult;

    /// Returns the handler name used in logs and errors.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub(crate) fn dispatch<H, A>(handler: Arc<H>, args: Arc<A>) -> BoxListenerFuture
where
    H: Handle<A>,
    A: Send + Sync + 'static,
{
    Box::pin(async move { handler.on_event(&args).await })
}
