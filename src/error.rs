//! Error types used by event slots and the declaration layer.
//!
//! This module defines:
//!
//! - [`EventError`] - errors raised by slot membership, invocation and declaration checks.
//! - [`ListenerError`] / [`ListenerResult`] - what a listener returns on failure.
//!
//! [`EventError`] provides helper methods (`as_label`, `as_message`) for logging/metrics.

use std::borrow::Cow;
use thiserror::Error;

/// Failure value returned by a listener.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result returned by every listener callable.
pub type ListenerResult = Result<(), ListenerError>;

/// # Errors produced by event slots.
///
/// Membership errors (`DuplicateListener`) are raised by subscribe and leave the slot
/// untouched. Invocation errors (`ListenerExecution`) are only surfaced when the slot
/// propagates listener failures. Declaration errors (`ConfigMismatch`, `AlreadyDeclared`)
/// come from [`EventSet`](crate::EventSet).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EventError {
    /// The same listener identity is already subscribed and duplicates are disallowed.
    #[error(
        "listener '{listener}' is already subscribed to event '{event}' \
         (allow it with allow_duplicate_listeners)"
    )]
    DuplicateListener {
        /// Slot name.
        event: Cow<'static, str>,
        /// Label of the rejected listener.
        listener: Cow<'static, str>,
    },

    /// A listener failed while the slot propagates failures.
    #[error("error in listener '{listener}' for event '{event}': {source}")]
    ListenerExecution {
        /// Slot name.
        event: Cow<'static, str>,
        /// Label of the failing listener.
        listener: Cow<'static, str>,
        /// The listener's own failure.
        #[source]
        source: ListenerError,
    },

    /// A listener panicked; the payload message is preserved.
    #[error("listener panicked: {message}")]
    ListenerPanicked {
        /// Panic payload rendered as text.
        message: String,
    },

    /// An existing slot does not match the declared configuration.
    #[error("event '{event}' has inconsistent parameters compared to its declaration: {problems:?}")]
    ConfigMismatch {
        /// Declared event name.
        event: Cow<'static, str>,
        /// Names of the conflicting parameters.
        problems: Vec<&'static str>,
    },

    /// A slot already exists for this event and cannot be replaced.
    #[error("event '{event}' already has a slot; it can only be modified via subscribe/unsubscribe")]
    AlreadyDeclared {
        /// Declared event name.
        event: Cow<'static, str>,
    },

    /// An async listener could not be scheduled because no tokio runtime is available.
    #[error("no tokio runtime to schedule async listener '{listener}'")]
    NoRuntime {
        /// Label of the listener that was not scheduled.
        listener: Cow<'static, str>,
    },
}

impl EventError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventslot::EventError;
    ///
    /// let err = EventError::AlreadyDeclared { event: "on_data".into() };
    /// assert_eq!(err.as_label(), "event_already_declared");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EventError::DuplicateListener { .. } => "event_duplicate_listener",
            EventError::ListenerExecution { .. } => "event_listener_failed",
            EventError::ListenerPanicked { .. } => "event_listener_panicked",
            EventError::ConfigMismatch { .. } => "event_config_mismatch",
            EventError::AlreadyDeclared { .. } => "event_already_declared",
            EventError::NoRuntime { .. } => "event_no_runtime",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EventError::DuplicateListener { event, listener } => {
                format!("duplicate: event={event} listener={listener}")
            }
            EventError::ListenerExecution {
                event,
                listener,
                source,
            } => format!("listener failed: event={event} listener={listener} err={source}"),
            EventError::ListenerPanicked { message } => format!("panicked: {message}"),
            EventError::ConfigMismatch { event, problems } => {
                format!("config mismatch: event={event} params={problems:?}")
            }
            EventError::AlreadyDeclared { event } => format!("already declared: event={event}"),
            EventError::NoRuntime { listener } => format!("no runtime: listener={listener}"),
        }
    }

    /// Converts a caught panic payload into [`EventError::ListenerPanicked`].
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        EventError::ListenerPanicked { message }
    }
}
