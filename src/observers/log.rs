//! # Logging observer.
//!
//! [`LogObserver`] is the default observer of every slot. It emits one `tracing` error
//! event per failure with structured fields:
//!
//! ```text
//! ERROR eventslot: error in listener event="on_save" listener="writer" mode="inline" error="disk full"
//! ```
//!
//! Install any `tracing` subscriber (e.g. `tracing-subscriber`'s fmt layer) to see them.

use super::observer::{ListenerFailure, Observe};

/// Observer that logs failures through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl Observe for LogObserver {
    fn on_failure(&self, failure: &ListenerFailure) {
        tracing::error!(
            event = %failure.event,
            listener = %failure.listener,
            mode = failure.mode.as_label(),
            error = %failure.error,
            "error in listener"
        );
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
