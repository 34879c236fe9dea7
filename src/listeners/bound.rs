//! Owner-bound listeners.
//!
//! A bound listener stores `(owner, method fn)` instead of a ready closure, so it can be
//! re-bound to the owner on each invocation. That is what lets a weak entry exist at all:
//! the entry keeps `Weak<T>` and only upgrades it for the duration of a call.

use std::sync::{Arc, Weak};

use super::listener::{AsyncFn, BoxListenerFuture, Callable, FnKey, ListenerId, SyncFn};
use crate::error::ListenerResult;

/// Erased view of a bound listener, used by [`Listener`](super::Listener).
pub(crate) trait Bound<A>: Send + Sync {
    fn id(&self) -> ListenerId;

    /// Binds the method to a strong owner; `None` if the owner is gone.
    fn bind(&self) -> Option<Callable<A>>;

    fn is_async(&self) -> bool;

    fn is_weak(&self) -> bool;

    fn is_alive(&self) -> bool;

    fn downgrade(&self) -> Arc<dyn Bound<A>>;
}

pub(crate) enum Method<T, A> {
    Sync(fn(&T, &A) -> ListenerResult),
    Async(fn(Arc<T>, Arc<A>) -> BoxListenerFuture),
}

impl<T, A> Clone for Method<T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A> Copy for Method<T, A> {}

enum Owner<T> {
    Strong(Arc<T>),
    Weak(Weak<T>),
}

impl<T> Owner<T> {
    fn get(&self) -> Option<Arc<T>> {
        match self {
            Owner::Strong(o) => Some(Arc::clone(o)),
            Owner::Weak(w) => w.upgrade(),
        }
    }
}

pub(crate) struct BoundListener<T, A> {
    owner: Owner<T>,
    id: ListenerId,
    method: Method<T, A>,
}

impl<T, A> BoundListener<T, A> {
    pub(crate) fn new(owner: &Arc<T>, key: FnKey, method: Method<T, A>) -> Self {
        let addr = Arc::as_ptr(owner) as *const () as usize;
        Self {
            owner: Owner::Strong(Arc::clone(owner)),
            id: ListenerId::bound(key, addr),
            method,
        }
    }
}

impl<T, A> Bound<A> for BoundListener<T, A>
where
    T: Send + Sync + 'static,
    A: Send + Sync + 'static,
{
    fn id(&self) -> ListenerId {
        self.id
    }

    fn bind(&self) -> Option<Callable<A>> {
        let owner = self.owner.get()?;
        let call = match self.method {
            Method::Sync(f) => {
                let call: Arc<SyncFn<A>> = Arc::new(move |args: &A| f(owner.as_ref(), args));
                Callable::Sync(call)
            }
            Method::Async(f) => {
                let call: Arc<AsyncFn<A>> =
                    Arc::new(move |args: Arc<A>| f(Arc::clone(&owner), args));
                Callable::Async(call)
            }
        };
        Some(call)
    }

    fn is_async(&self) -> bool {
        matches!(self.method, Method::Async(_))
    }

    fn is_weak(&self) -> bool {
        matches!(self.owner, Owner::Weak(_))
    }

    fn is_alive(&self) -> bool {
        match &self.owner {
            Owner::Strong(_) => true,
            Owner::Weak(w) => w.strong_count() > 0,
        }
    }

    fn downgrade(&self) -> Arc<dyn Bound<A>> {
        let owner = match &self.owner {
            Owner::Strong(o) => Owner::Weak(Arc::downgrade(o)),
            Owner::Weak(w) => Owner::Weak(Weak::clone(w)),
        };
        Arc::new(BoundListener {
            owner,
            id: self.id,
            method: self.method,
        })
    }
}
