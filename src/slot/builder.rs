//! # Slot builder.
//!
//! [`SlotBuilder`] collects the construction parameters of an [`EventSlot`]. Flags that are
//! never set stay `None` until [`SlotBuilder::build`], so the declaration layer can tell an
//! explicit `propagate_exceptions(false)` from a defaulted one.
//!
//! ## Example
//! ```rust
//! use eventslot::{EventSlot, SlotBuilder, SlotKind};
//!
//! let slot: EventSlot<String> = SlotBuilder::new()
//!     .name("on_line")
//!     .kind(SlotKind::Weak)
//!     .propagate_exceptions(true)
//!     .build();
//!
//! assert_eq!(slot.name(), "on_line");
//! assert!(slot.config().propagate_exceptions);
//! assert!(!slot.config().allow_duplicate_listeners);
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;

use super::registry::EventSlot;
use crate::config::{SlotConfig, SlotKind};
use crate::observers::{LogObserver, Observe};

/// Name used for slots built without one.
pub(crate) const ANONYMOUS: &str = "anonymous";

/// Builder for [`EventSlot`].
#[derive(Clone, Default)]
pub struct SlotBuilder {
    pub(crate) name: Option<Cow<'static, str>>,
    pub(crate) kind: Option<SlotKind>,
    pub(crate) propagate_exceptions: Option<bool>,
    pub(crate) allow_duplicate_listeners: Option<bool>,
    observer: Option<Arc<dyn Observe>>,
    runtime: Option<Handle>,
}

impl SlotBuilder {
    /// Creates a builder with nothing set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the diagnostic name.
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the ownership variant.
    pub fn kind(mut self, kind: SlotKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Shorthand for `kind(SlotKind::Weak)`.
    pub fn weak(self) -> Self {
        self.kind(SlotKind::Weak)
    }

    /// Sets the failure policy.
    pub fn propagate_exceptions(mut self, propagate: bool) -> Self {
        self.propagate_exceptions = Some(propagate);
        self
    }

    /// Sets the subscribe policy.
    pub fn allow_duplicate_listeners(mut self, allow: bool) -> Self {
        self.allow_duplicate_listeners = Some(allow);
        self
    }

    /// Injects the failure observer (default: [`LogObserver`]).
    pub fn observer(self, observer: impl Observe) -> Self {
        self.observer_arc(Arc::new(observer))
    }

    /// Injects a shared failure observer.
    pub fn observer_arc(mut self, observer: Arc<dyn Observe>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Pins fire-and-forget async listeners to a runtime.
    ///
    /// Without it, `invoke` spawns on the runtime it is called from.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub(crate) fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Returns the configuration `build` would use.
    pub fn config(&self) -> SlotConfig {
        let defaults = SlotConfig::default();
        SlotConfig {
            kind: self.kind.unwrap_or(defaults.kind),
            propagate_exceptions: self
                .propagate_exceptions
                .unwrap_or(defaults.propagate_exceptions),
            allow_duplicate_listeners: self
                .allow_duplicate_listeners
                .unwrap_or(defaults.allow_duplicate_listeners),
        }
    }

    /// Builds the slot, resolving unset values to [`SlotConfig::default`].
    pub fn build<A: Send + Sync + 'static>(self) -> EventSlot<A> {
        let config = self.config();
        let name = self.name.unwrap_or(Cow::Borrowed(ANONYMOUS));
        let observer = self
            .observer
            .unwrap_or_else(|| Arc::new(LogObserver) as Arc<dyn Observe>);
        EventSlot::from_parts(name, config, observer, self.runtime)
    }
}

impl fmt::Debug for SlotBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotBuilder")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("propagate_exceptions", &self.propagate_exceptions)
            .field("allow_duplicate_listeners", &self.allow_duplicate_listeners)
            .field("observer", &self.observer.as_ref().map(|o| o.name()))
            .field("runtime", &self.runtime.is_some())
            .finish()
    }
}
