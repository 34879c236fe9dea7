//! # Listener registry and membership operations.
//!
//! [`EventSlot`] stores listeners in registration order behind a `parking_lot::Mutex`.
//! Every scan (subscribe, unsubscribe, snapshot) first drops weak entries whose owner is
//! gone, so dead listeners never count and are never invoked.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use super::builder::SlotBuilder;
use crate::config::SlotConfig;
use crate::error::EventError;
use crate::listeners::Listener;
use crate::observers::Observe;

/// Ordered registry of listeners for one event.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use eventslot::{EventSlot, Listener};
///
/// let total = Arc::new(AtomicU32::new(0));
/// let slot = EventSlot::<u32>::new("on_add");
///
/// let t = Arc::clone(&total);
/// slot.subscribe(Listener::from_fn(move |n: &u32| {
///     t.fetch_add(*n, Ordering::Relaxed);
///     Ok(())
/// }))
/// .unwrap();
///
/// slot.invoke(2).unwrap();
/// slot.invoke(3).unwrap();
/// assert_eq!(total.load(Ordering::Relaxed), 5);
/// ```
pub struct EventSlot<A> {
    pub(super) name: Cow<'static, str>,
    pub(super) config: SlotConfig,
    pub(super) observer: Arc<dyn Observe>,
    pub(super) runtime: Option<Handle>,
    listeners: Mutex<Vec<Listener<A>>>,
}

impl<A: Send + Sync + 'static> EventSlot<A> {
    /// Creates a strong slot with default policies.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        SlotBuilder::new().name(name).build()
    }

    /// Creates a weak slot with default policies.
    pub fn weak(name: impl Into<Cow<'static, str>>) -> Self {
        SlotBuilder::new().name(name).weak().build()
    }

    pub(super) fn from_parts(
        name: Cow<'static, str>,
        config: SlotConfig,
        observer: Arc<dyn Observe>,
        runtime: Option<Handle>,
    ) -> Self {
        Self {
            name,
            config,
            observer,
            runtime,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Subscribes a listener with the ownership of this slot's [`SlotKind`](crate::SlotKind).
    ///
    /// ### Errors
    /// [`EventError::DuplicateListener`] if the identity is already present and duplicates
    /// are disallowed. The slot is left unchanged.
    pub fn subscribe(&self, listener: Listener<A>) -> Result<(), EventError> {
        if self.config.is_weak() {
            self.insert(listener.downgrade())
        } else {
            self.insert(listener)
        }
    }

    /// Subscribes a listener holding its owner strongly, whatever the slot kind.
    pub fn subscribe_strong(&self, listener: Listener<A>) -> Result<(), EventError> {
        self.insert(listener)
    }

    /// Subscribes a listener holding its owner weakly, whatever the slot kind.
    ///
    /// Free closures have no owner and are still held strongly.
    pub fn subscribe_weak(&self, listener: Listener<A>) -> Result<(), EventError> {
        self.insert(listener.downgrade())
    }

    fn insert(&self, listener: Listener<A>) -> Result<(), EventError> {
        let mut listeners = self.listeners.lock();
        listeners.retain(Listener::is_alive);

        if !self.config.allow_duplicate_listeners
            && listeners.iter().any(|l| l.id() == listener.id())
        {
            return Err(EventError::DuplicateListener {
                event: self.name.clone(),
                listener: listener.label(),
            });
        }
        listeners.push(listener);
        Ok(())
    }

    /// Removes the first entry with the same identity, stored strongly or weakly.
    ///
    /// Returns `false` (and changes nothing) if there was no such entry.
    pub fn unsubscribe(&self, listener: &Listener<A>) -> bool {
        // Owners released by the removal are dropped after the lock.
        let removed = {
            let mut listeners = self.listeners.lock();
            listeners.retain(Listener::is_alive);
            listeners
                .iter()
                .position(|l| l.id() == listener.id())
                .map(|idx| listeners.remove(idx))
        };
        removed.is_some()
    }

    /// Removes every listener.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.listeners.lock());
        drop(removed);
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.lock().iter().filter(|l| l.is_alive()).count()
    }

    /// True if there are no live listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if a live entry has the same identity as `listener`.
    pub fn contains(&self, listener: &Listener<A>) -> bool {
        self.listeners
            .lock()
            .iter()
            .any(|l| l.is_alive() && l.id() == listener.id())
    }

    /// Returns the live listener at `index` in registration order.
    pub fn get(&self, index: usize) -> Option<Listener<A>> {
        self.listeners
            .lock()
            .iter()
            .filter(|l| l.is_alive())
            .nth(index)
            .cloned()
    }

    /// Returns the live listeners in registration order.
    ///
    /// Weak entries stay weak in the returned copies.
    pub fn listeners(&self) -> Vec<Listener<A>> {
        self.listeners
            .lock()
            .iter()
            .filter(|l| l.is_alive())
            .cloned()
            .collect()
    }

    /// Purges dead entries and copies the rest for one invocation pass.
    ///
    /// Weak entries stay weak in the copy; each one is bound to its owner only right before
    /// it runs.
    pub(super) fn snapshot(&self) -> Vec<Listener<A>> {
        let mut listeners = self.listeners.lock();
        listeners.retain(Listener::is_alive);
        listeners.clone()
    }
}

impl<A> EventSlot<A> {
    /// Returns the slot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration fixed at construction.
    pub fn config(&self) -> SlotConfig {
        self.config
    }

    /// Returns the name of the injected observer.
    pub fn observer_name(&self) -> &'static str {
        self.observer.name()
    }
}

impl<A> fmt::Debug for EventSlot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.listeners.lock().iter().filter(|l| l.is_alive()).count();
        f.debug_struct("EventSlot")
            .field("name", &self.name)
            .field("listeners", &count)
            .field("config", &self.config)
            .finish()
    }
}
