//! # Listener handle and identity.
//!
//! [`Listener`] wraps either a free callable or a callable bound to an owner. It is cheap
//! to clone; clones share identity, so keep one around to unsubscribe later.
//!
//! ## Identity rules
//! - Free callable: the address of its shared allocation. Two listeners built from the same
//!   closure code are **different** listeners.
//! - Bound method: `(method fn, owner allocation)`. Building the same method on the same
//!   owner twice yields the **same** identity.
//! - Handler: `(handler type, owner allocation)`.
//!
//! ## Example
//! ```rust
//! use eventslot::{EventSlot, Listener};
//!
//! let slot = EventSlot::<u32>::new("on_tick");
//! let print = Listener::from_fn(|n: &u32| {
//!     println!("tick {n}");
//!     Ok(())
//! });
//!
//! slot.subscribe(print.clone()).unwrap();
//! assert!(slot.contains(&print));
//! slot.unsubscribe(&print);
//! assert!(slot.is_empty());
//! ```

use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::bound::{Bound, BoundListener, Method};
use super::handler::{Handle, dispatch};
use crate::error::ListenerResult;

/// Boxed future returned by async listeners.
pub type BoxListenerFuture = Pin<Box<dyn Future<Output = ListenerResult> + Send + 'static>>;

pub(crate) type SyncFn<A> = dyn Fn(&A) -> ListenerResult + Send + Sync;
pub(crate) type AsyncFn<A> = dyn Fn(Arc<A>) -> BoxListenerFuture + Send + Sync;

/// A resolved, ready-to-run listener body.
pub(crate) enum Callable<A> {
    Sync(Arc<SyncFn<A>>),
    Async(Arc<AsyncFn<A>>),
}

impl<A> Clone for Callable<A> {
    fn clone(&self) -> Self {
        match self {
            Callable::Sync(f) => Callable::Sync(Arc::clone(f)),
            Callable::Async(f) => Callable::Async(Arc::clone(f)),
        }
    }
}

impl<A> Callable<A> {
    fn addr(&self) -> usize {
        match self {
            Callable::Sync(f) => Arc::as_ptr(f) as *const () as usize,
            Callable::Async(f) => Arc::as_ptr(f) as *const () as usize,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum FnKey {
    Addr(usize),
    Type(TypeId),
}

/// Identity of a listener inside a slot.
///
/// Equal ids are duplicates for [`EventSlot::subscribe`](crate::EventSlot::subscribe) and
/// matches for [`EventSlot::unsubscribe`](crate::EventSlot::unsubscribe).
///
/// ## Bound methods
/// A method built with [`Listener::method`] or [`Listener::async_method`] is keyed by its
/// function pointer address. Rust does not guarantee that address to be unique or stable:
/// identical functions may be merged, and one function may get several addresses across
/// codegen units. Rebuilding a bound listener is therefore best effort; to unsubscribe
/// reliably, keep a clone of the subscribed [`Listener`], which always carries the same id.
/// Handlers ([`Listener::handler`]) are keyed by type and are not affected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId {
    func: FnKey,
    owner: Option<usize>,
}

impl ListenerId {
    pub(crate) fn bound(func: FnKey, owner: usize) -> Self {
        Self {
            func,
            owner: Some(owner),
        }
    }

    /// True if the listener is bound to an owner (method or handler).
    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }
}

enum Target<A> {
    Free(Callable<A>),
    Bound(Arc<dyn Bound<A>>),
}

impl<A> Clone for Target<A> {
    fn clone(&self) -> Self {
        match self {
            Target::Free(c) => Target::Free(c.clone()),
            Target::Bound(b) => Target::Bound(Arc::clone(b)),
        }
    }
}

/// A callable registered on an event slot.
///
/// Sync listeners receive `&A` and run inline. Async listeners receive `Arc<A>` and return
/// a `'static` future, so they can be detached onto the runtime by
/// [`EventSlot::invoke`](crate::EventSlot::invoke).
pub struct Listener<A> {
    name: Cow<'static, str>,
    id: ListenerId,
    target: Target<A>,
}

impl<A> Clone for Listener<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            id: self.id,
            target: self.target.clone(),
        }
    }
}

impl<A: Send + Sync + 'static> Listener<A> {
    /// Creates a synchronous listener from a closure.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&A) -> ListenerResult + Send + Sync + 'static,
    {
        let call: Arc<SyncFn<A>> = Arc::new(f);
        Self::free(type_name::<F>(), Callable::Sync(call))
    }

    /// Creates an asynchronous listener from a closure producing a fresh future per call.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use eventslot::Listener;
    ///
    /// let l = Listener::from_async(|line: Arc<String>| async move {
    ///     println!("got {line}");
    ///     Ok(())
    /// });
    /// assert!(l.is_async());
    /// ```
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        let call: Arc<AsyncFn<A>> =
            Arc::new(move |args: Arc<A>| -> BoxListenerFuture { Box::pin(f(args)) });
        Self::free(type_name::<F>(), Callable::Async(call))
    }

    /// Binds a synchronous method to its owner.
    ///
    /// In a [`SlotKind::Weak`](crate::SlotKind::Weak) slot the owner is not kept alive.
    /// Identity follows the method's address; see [`ListenerId`] for its limits.
    pub fn method<T>(owner: &Arc<T>, method: fn(&T, &A) -> ListenerResult) -> Self
    where
        T: Send + Sync + 'static,
    {
        let key = FnKey::Addr(method as usize);
        Self::bound(type_name::<T>(), BoundListener::new(owner, key, Method::Sync(method)))
    }

    /// Binds an asynchronous method (`self: Arc<Self>`) to its owner.
    pub fn async_method<T>(owner: &Arc<T>, method: fn(Arc<T>, Arc<A>) -> BoxListenerFuture) -> Self
    where
        T: Send + Sync + 'static,
    {
        let key = FnKey::Addr(method as usize);
        Self::bound(type_name::<T>(), BoundListener::new(owner, key, Method::Async(method)))
    }

    /// Binds a [`Handle`] implementation; its [`Handle::on_event`] is awaited per event.
    pub fn handler<H>(owner: &Arc<H>) -> Self
    where
        H: Handle<A>,
    {
        let key = FnKey::Type(TypeId::of::<H>());
        let name = <H as Handle<A>>::name(owner);
        Self::bound(name, BoundListener::new(owner, key, Method::Async(dispatch::<H, A>)))
    }

    fn free(name: &'static str, call: Callable<A>) -> Self {
        Self {
            name: Cow::Borrowed(name),
            id: ListenerId {
                func: FnKey::Addr(call.addr()),
                owner: None,
            },
            target: Target::Free(call),
        }
    }

    fn bound<T: Send + Sync + 'static>(name: &'static str, b: BoundListener<T, A>) -> Self {
        Self {
            name: Cow::Borrowed(name),
            id: b.id(),
            target: Target::Bound(Arc::new(b)),
        }
    }
}

impl<A> Listener<A> {
    /// Replaces the diagnostic label used in logs and errors.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the diagnostic label.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn label(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    /// Returns the listener identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// True if this listener returns a future.
    pub fn is_async(&self) -> bool {
        match &self.target {
            Target::Free(c) => matches!(c, Callable::Async(_)),
            Target::Bound(b) => b.is_async(),
        }
    }

    /// True if this listener references its owner weakly.
    pub fn is_weak(&self) -> bool {
        match &self.target {
            Target::Free(_) => false,
            Target::Bound(b) => b.is_weak(),
        }
    }

    /// False once a weakly referenced owner has been reclaimed.
    pub fn is_alive(&self) -> bool {
        match &self.target {
            Target::Free(_) => true,
            Target::Bound(b) => b.is_alive(),
        }
    }

    /// Returns a copy that references its owner weakly. Free callables are unchanged.
    pub(crate) fn downgrade(&self) -> Self {
        let target = match &self.target {
            Target::Free(c) => Target::Free(c.clone()),
            Target::Bound(b) => Target::Bound(b.downgrade()),
        };
        Self {
            name: self.name.clone(),
            id: self.id,
            target,
        }
    }

    /// Resolves the callable body; `None` if the owner is gone.
    pub(crate) fn resolve(&self) -> Option<Callable<A>> {
        match &self.target {
            Target::Free(c) => Some(c.clone()),
            Target::Bound(b) => b.bind(),
        }
    }
}

impl<A> fmt::Debug for Listener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("name", &self.name)
            .field("async", &self.is_async())
            .field("weak", &self.is_weak())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<A> PartialEq for Listener<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for Listener<A> {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Counter {
        fn on_tick(&self, _n: &u32) -> ListenerResult {
            Ok(())
        }

        fn on_other(&self, n: &u32) -> ListenerResult {
            Err(format!("unexpected {n}").into())
        }
    }

    #[test]
    fn test_clones_share_identity() {
        let a = Listener::from_fn(|_: &u32| Ok(()));
        let b = a.clone();
        assert_eq!(a.id(), b.id());
        assert!(!a.id().is_bound());
    }

    #[test]
    fn test_same_closure_code_is_distinct() {
        let make = || Listener::from_fn(|_: &u32| Ok(()));
        assert_ne!(make().id(), make().id());
    }

    #[test]
    fn test_bound_method_identity_by_fn_and_owner() {
        let owner = Arc::new(Counter);
        let other = Arc::new(Counter);

        let a = Listener::method(&owner, Counter::on_tick);
        let b = Listener::method(&owner, Counter::on_tick);
        let c = Listener::method(&other, Counter::on_tick);
        let d = Listener::method(&owner, Counter::on_other);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(a.id().is_bound());
    }

    #[test]
    fn test_cloned_bound_listener_keeps_identity() {
        let owner = Arc::new(Counter);
        let l = Listener::method(&owner, Counter::on_tick);
        let weak = l.clone().downgrade();

        assert_eq!(l.id(), l.clone().id());
        assert_eq!(l.id(), weak.id());
    }

    #[test]
    fn test_downgrade_releases_owner() {
        let owner = Arc::new(Counter);
        let strong = Listener::method(&owner, Counter::on_tick);
        let weak = strong.downgrade();
        drop(strong);

        assert!(weak.is_weak());
        assert!(weak.is_alive());
        assert_eq!(Arc::strong_count(&owner), 1);

        drop(owner);
        assert!(!weak.is_alive());
        assert!(weak.resolve().is_none());
    }

    #[test]
    fn test_free_listener_ignores_downgrade() {
        let l = Listener::from_fn(|_: &u32| Ok(())).with_name("printer");
        let d = l.downgrade();
        assert!(!d.is_weak());
        assert!(d.resolve().is_some());
        assert_eq!(d.name(), "printer");
    }
}
