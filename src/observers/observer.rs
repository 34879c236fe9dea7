//! # Observer trait and failure record.
//!
//! [`Observe`] replaces a process-wide logger: every slot holds its own observer, so tests
//! and embedders can route failures anywhere without global state.

use std::borrow::Cow;
use std::fmt;

use crate::error::{EventError, ListenerError};
use crate::listeners::ListenerId;

/// How the failing listener was being run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvokeMode {
    /// Sync listener called inline by `invoke` or `invoke_async`.
    Inline,
    /// Async listener awaited by `invoke_async`.
    Awaited,
    /// Async listener detached by `invoke`.
    Detached,
}

impl InvokeMode {
    /// Returns a short stable label for logs.
    pub fn as_label(self) -> &'static str {
        match self {
            InvokeMode::Inline => "inline",
            InvokeMode::Awaited => "awaited",
            InvokeMode::Detached => "detached",
        }
    }
}

/// One listener failure, with enough context to diagnose it.
pub struct ListenerFailure {
    /// Slot name.
    pub event: Cow<'static, str>,
    /// Listener label.
    pub listener: Cow<'static, str>,
    /// Listener identity.
    pub id: ListenerId,
    /// How the listener was run.
    pub mode: InvokeMode,
    /// What the listener returned, or [`EventError::ListenerPanicked`] for panics.
    pub error: ListenerError,
}

impl ListenerFailure {
    /// Wraps the failure for propagation to the invoking caller.
    pub(crate) fn into_error(self) -> EventError {
        EventError::ListenerExecution {
            event: self.event,
            listener: self.listener,
            source: self.error,
        }
    }
}

impl fmt::Debug for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerFailure")
            .field("event", &self.event)
            .field("listener", &self.listener)
            .field("mode", &self.mode)
            .field("error", &self.error.to_string())
            .finish()
    }
}

/// Receiver of listener failures that are not propagated.
///
/// Called synchronously from the invoking context (or from the detached task for
/// fire-and-forget async listeners). Implementations should be quick and must not panic.
pub trait Observe: Send + Sync + 'static {
    /// Handles one failure.
    fn on_failure(&self, failure: &ListenerFailure);

    /// Returns the observer name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The unit type is a no-op observer.
impl Observe for () {
    fn on_failure(&self, _failure: &ListenerFailure) {}

    fn name(&self) -> &'static str {
        "noop"
    }
}
