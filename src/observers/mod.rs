//! # Failure observers for event slots.
//!
//! This module provides the [`Observe`] trait and the built-in [`LogObserver`]. An
//! observer is injected per slot at construction and receives every listener failure
//! that is **not** propagated to the caller.
//!
//! ## Architecture
//! ```text
//! invoke / invoke_async
//!     │
//!     ├─► listener Ok   ──► next listener
//!     └─► listener Err / panic
//!             ├─ propagate_exceptions = true  ──► EventError::ListenerExecution (pass aborted)
//!             └─ propagate_exceptions = false ──► Observe::on_failure(&ListenerFailure)
//!                                                      │
//!                                            ┌─────────┼─────────┐
//!                                            ▼         ▼         ▼
//!                                       LogObserver    ()      Custom
//!                                        (tracing)  (no-op)
//! ```
//!
//! Detached async listeners (fire-and-forget `invoke`) always report here, whatever the
//! slot policy: there is no caller left to return the error to.
//!
//! ## Implementing custom observers
//! ```rust
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use eventslot::{ListenerFailure, Observe};
//!
//! struct FailureCounter(AtomicU64);
//!
//! impl Observe for FailureCounter {
//!     fn on_failure(&self, _failure: &ListenerFailure) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//!
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

mod log;
mod observer;

pub use log::LogObserver;
pub use observer::{InvokeMode, ListenerFailure, Observe};
