//! # Static event declaration.
//!
//! [`EventDecl`] is `const`-constructible so owners can declare events as associated
//! constants. Unset fields mean "no opinion": they never cause a mismatch and fall back to
//! [`SlotConfig::default`](crate::SlotConfig) when a slot is created.

use std::borrow::Cow;

use crate::config::SlotKind;
use crate::error::EventError;
use crate::slot::{EventSlot, SlotBuilder};

/// Declared configuration of one event.
///
/// ## Example
/// ```rust
/// use eventslot::{EventDecl, EventSlot};
///
/// const ON_SAVE: EventDecl = EventDecl::new("on_save").propagate_exceptions(true);
///
/// let slot: EventSlot<String> = ON_SAVE.create();
/// assert!(ON_SAVE.matches(&slot));
///
/// let other = EventSlot::<String>::new("on_load");
/// assert!(ON_SAVE.check(&other).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventDecl {
    name: &'static str,
    kind: Option<SlotKind>,
    propagate_exceptions: Option<bool>,
    allow_duplicate_listeners: Option<bool>,
}

impl EventDecl {
    /// Declares an event with no configuration opinions.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            kind: None,
            propagate_exceptions: None,
            allow_duplicate_listeners: None,
        }
    }

    /// Declares the ownership variant.
    pub const fn kind(mut self, kind: SlotKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Shorthand for `kind(SlotKind::Weak)`.
    pub const fn weak(self) -> Self {
        self.kind(SlotKind::Weak)
    }

    /// Declares the failure policy.
    pub const fn propagate_exceptions(mut self, propagate: bool) -> Self {
        self.propagate_exceptions = Some(propagate);
        self
    }

    /// Declares the subscribe policy.
    pub const fn allow_duplicate_listeners(mut self, allow: bool) -> Self {
        self.allow_duplicate_listeners = Some(allow);
        self
    }

    /// Returns the declared event name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns a builder carrying exactly the declared settings.
    pub fn builder(&self) -> SlotBuilder {
        let mut builder = SlotBuilder::new().name(self.name);
        builder.kind = self.kind;
        builder.propagate_exceptions = self.propagate_exceptions;
        builder.allow_duplicate_listeners = self.allow_duplicate_listeners;
        builder
    }

    /// Creates a new slot from the declaration.
    pub fn create<A: Send + Sync + 'static>(&self) -> EventSlot<A> {
        self.builder().build()
    }

    /// Validates an existing slot against the declaration.
    ///
    /// Compares the name and every declared setting with the slot's effective value.
    ///
    /// ### Errors
    /// [`EventError::ConfigMismatch`] listing every conflicting parameter.
    pub fn check<A>(&self, slot: &EventSlot<A>) -> Result<(), EventError> {
        let config = slot.config();
        let mut problems = Vec::new();

        if slot.name() != self.name {
            problems.push("name");
        }
        if self.kind.is_some_and(|k| k != config.kind) {
            problems.push("kind");
        }
        if self
            .propagate_exceptions
            .is_some_and(|p| p != config.propagate_exceptions)
        {
            problems.push("propagate_exceptions");
        }
        if self
            .allow_duplicate_listeners
            .is_some_and(|d| d != config.allow_duplicate_listeners)
        {
            problems.push("allow_duplicate_listeners");
        }
        self.conflict(problems)
    }

    /// True if [`check`](Self::check) passes.
    pub fn matches<A>(&self, slot: &EventSlot<A>) -> bool {
        self.check(slot).is_ok()
    }

    /// Reconciles a pre-configured builder with the declaration.
    ///
    /// Settings present on both sides must agree. Settings only present in the declaration
    /// are applied to the builder; the builder's name defaults to the declared one.
    ///
    /// ### Errors
    /// [`EventError::ConfigMismatch`] listing every conflicting parameter.
    pub fn merge(&self, mut builder: SlotBuilder) -> Result<SlotBuilder, EventError> {
        fn conflicts<T: PartialEq>(explicit: Option<T>, declared: Option<T>) -> bool {
            matches!((explicit, declared), (Some(e), Some(d)) if e != d)
        }

        let mut problems = Vec::new();
        if builder.name.as_deref().is_some_and(|n| n != self.name) {
            problems.push("name");
        }
        if conflicts(builder.kind, self.kind) {
            problems.push("kind");
        }
        if conflicts(builder.propagate_exceptions, self.propagate_exceptions) {
            problems.push("propagate_exceptions");
        }
        if conflicts(builder.allow_duplicate_listeners, self.allow_duplicate_listeners) {
            problems.push("allow_duplicate_listeners");
        }
        self.conflict(problems)?;

        builder.name = Some(Cow::Borrowed(self.name));
        builder.kind = builder.kind.or(self.kind);
        builder.propagate_exceptions = builder.propagate_exceptions.or(self.propagate_exceptions);
        builder.allow_duplicate_listeners = builder
            .allow_duplicate_listeners
            .or(self.allow_duplicate_listeners);
        Ok(builder)
    }

    fn conflict(&self, problems: Vec<&'static str>) -> Result<(), EventError> {
        if problems.is_empty() {
            return Ok(());
        }
        Err(self.mismatch(problems))
    }

    pub(crate) fn mismatch(&self, problems: Vec<&'static str>) -> EventError {
        tracing::warn!(event = self.name, ?problems, "event configuration mismatch");
        EventError::ConfigMismatch {
            event: Cow::Borrowed(self.name),
            problems,
        }
    }
}
