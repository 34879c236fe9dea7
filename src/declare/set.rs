//! # Per-owner store of declared slots.
//!
//! [`EventSet`] maps event names to type-erased `Arc<EventSlot<A>>` values. Each owner
//! instance holds its own set, so instances never share listeners.
//!
//! ## Rules
//! - Slots are created lazily on first access and never replaced afterwards.
//! - Every access re-validates the cached slot against the declaration.
//! - Accessing a name with a different argument type is a configuration mismatch.

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::decl::EventDecl;
use crate::error::EventError;
use crate::observers::Observe;
use crate::slot::{EventSlot, SlotBuilder};

type AnySlot = Arc<dyn Any + Send + Sync>;

/// Lazily populated slots of one owner instance.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use eventslot::{EventDecl, EventSet, EventSlot, Listener};
///
/// struct Downloader {
///     events: EventSet,
/// }
///
/// impl Downloader {
///     const ON_PROGRESS: EventDecl = EventDecl::new("on_progress");
///
///     fn on_progress(&self) -> Arc<EventSlot<u8>> {
///         self.events
///             .get_or_create_event(&Self::ON_PROGRESS)
///             .expect("declared with a single argument type")
///     }
/// }
///
/// let d = Downloader { events: EventSet::new() };
/// d.on_progress().subscribe(Listener::from_fn(|p: &u8| {
///     println!("{p}%");
///     Ok(())
/// })).unwrap();
///
/// assert!(Arc::ptr_eq(&d.on_progress(), &d.on_progress()));
/// d.on_progress().invoke(50).unwrap();
/// ```
#[derive(Default)]
pub struct EventSet {
    slots: Mutex<HashMap<&'static str, AnySlot>>,
    observer: Option<Arc<dyn Observe>>,
}

impl EventSet {
    /// Creates an empty set; slots it creates log failures through the default observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set whose lazily created slots report to `observer`.
    pub fn with_observer(observer: impl Observe) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            observer: Some(Arc::new(observer)),
        }
    }

    /// Returns the slot for `decl`, creating it from the declaration on first access.
    ///
    /// ### Errors
    /// [`EventError::ConfigMismatch`] if the cached slot disagrees with `decl` or was
    /// created for a different argument type.
    pub fn get_or_create_event<A: Send + Sync + 'static>(
        &self,
        decl: &EventDecl,
    ) -> Result<Arc<EventSlot<A>>, EventError> {
        let mut slots = self.slots.lock();
        if let Some(existing) = slots.get(decl.name()) {
            let slot = downcast::<A>(decl, existing.clone())?;
            decl.check(&slot)?;
            return Ok(slot);
        }

        let slot = Arc::new(self.with_defaults(decl.builder()).build::<A>());
        slots.insert(decl.name(), slot.clone() as AnySlot);
        tracing::debug!(event = decl.name(), "event slot created");
        Ok(slot)
    }

    /// Installs a pre-configured slot for `decl` before its first access.
    ///
    /// Settings left unset on `builder` adopt the declared ones.
    ///
    /// ### Errors
    /// - [`EventError::AlreadyDeclared`] if a slot for this event already exists.
    /// - [`EventError::ConfigMismatch`] if `builder` contradicts the declaration.
    pub fn install<A: Send + Sync + 'static>(
        &self,
        decl: &EventDecl,
        builder: SlotBuilder,
    ) -> Result<Arc<EventSlot<A>>, EventError> {
        let builder = decl.merge(builder)?;

        let mut slots = self.slots.lock();
        if slots.contains_key(decl.name()) {
            return Err(EventError::AlreadyDeclared {
                event: Cow::Borrowed(decl.name()),
            });
        }

        let slot = Arc::new(self.with_defaults(builder).build::<A>());
        slots.insert(decl.name(), slot.clone() as AnySlot);
        tracing::debug!(event = decl.name(), "event slot installed");
        Ok(slot)
    }

    /// Returns the slot for `decl` if it was already created.
    ///
    /// Returns `None` for absent slots and for slots of another argument type.
    pub fn get<A: Send + Sync + 'static>(&self, decl: &EventDecl) -> Option<Arc<EventSlot<A>>> {
        let existing = self.slots.lock().get(decl.name())?.clone();
        existing.downcast::<EventSlot<A>>().ok()
    }

    /// True if a slot named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.lock().contains_key(name)
    }

    /// Names of created slots, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.slots.lock().keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of created slots.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// True if no slot was created yet.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    fn with_defaults(&self, builder: SlotBuilder) -> SlotBuilder {
        match (&self.observer, builder.has_observer()) {
            (Some(observer), false) => builder.observer_arc(observer.clone()),
            _ => builder,
        }
    }
}

impl fmt::Debug for EventSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSet")
            .field("events", &self.names())
            .field("observer", &self.observer.as_ref().map(|o| o.name()))
            .finish()
    }
}

fn downcast<A: Send + Sync + 'static>(
    decl: &EventDecl,
    slot: AnySlot,
) -> Result<Arc<EventSlot<A>>, EventError> {
    slot.downcast::<EventSlot<A>>()
        .map_err(|_| decl.mismatch(vec!["argument_type"]))
}
