//! # Invocation: fire-and-forget and awaited fan-out.
//!
//! Both forms run over a snapshot taken at call time, in registration order.
//!
//! | form              | sync listener | async listener                      |
//! |-------------------|---------------|-------------------------------------|
//! | [`invoke`]        | called inline | spawned on tokio, not awaited       |
//! | [`invoke_async`]  | called inline | awaited before the next listener    |
//!
//! ## Failure policy
//! A failure is an `Err` returned by the listener or a panic (caught and turned into
//! [`EventError::ListenerPanicked`]).
//! - `propagate_exceptions = false`: reported to the slot observer; the pass continues.
//! - `propagate_exceptions = true`: the pass stops at the first failure and returns
//!   [`EventError::ListenerExecution`]; later listeners of that pass do not run.
//!
//! Detached async listeners (started by [`invoke`]) always report to the observer: the
//! caller has already returned. Listeners detached before a propagated failure keep running.
//!
//! [`invoke`]: EventSlot::invoke
//! [`invoke_async`]: EventSlot::invoke_async

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tokio::runtime::Handle;

use super::registry::EventSlot;
use crate::error::{EventError, ListenerError, ListenerResult};
use crate::listeners::{AsyncFn, Callable, Listener, SyncFn};
use crate::observers::{InvokeMode, ListenerFailure};

impl<A: Send + Sync + 'static> EventSlot<A> {
    /// Fires the event without waiting for async listeners.
    ///
    /// Sync listeners run before this returns. Async listeners are spawned on the configured
    /// runtime (or the current one) and detached.
    ///
    /// ### Errors
    /// Only with `propagate_exceptions = true`: the first failing sync listener, or an async
    /// listener that could not be scheduled because there is no runtime.
    pub fn invoke(&self, args: A) -> Result<(), EventError> {
        self.invoke_arc(Arc::new(args))
    }

    /// Same as [`invoke`](Self::invoke) for arguments that are already shared.
    pub fn invoke_arc(&self, args: Arc<A>) -> Result<(), EventError> {
        let live = self.snapshot();
        tracing::trace!(event = %self.name, listeners = live.len(), "invoke");

        for entry in &live {
            // Owner reclaimed since the snapshot, possibly by an earlier listener.
            let Some(call) = entry.resolve() else {
                continue;
            };
            match call {
                Callable::Sync(f) => {
                    if let Err(error) = run_sync(f.as_ref(), &args) {
                        self.fail(entry, InvokeMode::Inline, error)?;
                    }
                }
                Callable::Async(f) => {
                    self.detach(entry, f, Arc::clone(&args))?;
                }
            }
        }
        Ok(())
    }

    /// Fires the event and waits for every listener.
    ///
    /// Listeners run one after another in registration order: sync ones inline, async ones
    /// awaited before the next listener starts.
    ///
    /// ### Errors
    /// Only with `propagate_exceptions = true`: the first failing listener.
    pub async fn invoke_async(&self, args: A) -> Result<(), EventError> {
        self.invoke_async_arc(Arc::new(args)).await
    }

    /// Same as [`invoke_async`](Self::invoke_async) for arguments that are already shared.
    pub async fn invoke_async_arc(&self, args: Arc<A>) -> Result<(), EventError> {
        let live = self.snapshot();
        tracing::trace!(event = %self.name, listeners = live.len(), "invoke_async");

        for entry in &live {
            // Bound owners are upgraded only for the duration of their own call.
            let Some(call) = entry.resolve() else {
                continue;
            };
            let (mode, result) = match call {
                Callable::Sync(f) => (InvokeMode::Inline, run_sync(f.as_ref(), &args)),
                Callable::Async(f) => (
                    InvokeMode::Awaited,
                    run_async(f, Arc::clone(&args)).await,
                ),
            };
            if let Err(error) = result {
                self.fail(entry, mode, error)?;
            }
        }
        Ok(())
    }

    /// Returns the slot as a plain function; calling it is exactly [`invoke`](Self::invoke).
    ///
    /// ## Example
    /// ```rust
    /// use eventslot::EventSlot;
    ///
    /// let slot = EventSlot::<u8>::new("on_byte");
    /// let fire = slot.as_fn();
    /// [1, 2, 3].into_iter().try_for_each(fire).unwrap();
    /// ```
    pub fn as_fn(&self) -> impl Fn(A) -> Result<(), EventError> + '_ {
        move |args| self.invoke(args)
    }

    fn detach(
        &self,
        entry: &Listener<A>,
        f: Arc<AsyncFn<A>>,
        args: Arc<A>,
    ) -> Result<(), EventError> {
        let Some(handle) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            let error = EventError::NoRuntime {
                listener: entry.label(),
            };
            return self.fail(entry, InvokeMode::Detached, error.into());
        };

        let observer = Arc::clone(&self.observer);
        let event = self.name.clone();
        let listener = entry.label();
        let id = entry.id();

        handle.spawn(async move {
            if let Err(error) = run_async(f, args).await {
                observer.on_failure(&ListenerFailure {
                    event,
                    listener,
                    id,
                    mode: InvokeMode::Detached,
                    error,
                });
            }
        });
        Ok(())
    }

    /// Applies the failure policy to one listener failure.
    fn fail(&self, entry: &Listener<A>, mode: InvokeMode, error: ListenerError) -> Result<(), EventError> {
        let failure = ListenerFailure {
            event: self.name.clone(),
            listener: entry.label(),
            id: entry.id(),
            mode,
            error,
        };
        if self.config.propagate_exceptions {
            return Err(failure.into_error());
        }
        self.observer.on_failure(&failure);
        Ok(())
    }
}

fn run_sync<A>(f: &SyncFn<A>, args: &A) -> ListenerResult {
    match panic::catch_unwind(AssertUnwindSafe(|| f(args))) {
        Ok(result) => result,
        Err(payload) => Err(EventError::from_panic(payload).into()),
    }
}

async fn run_async<A>(f: Arc<AsyncFn<A>>, args: Arc<A>) -> ListenerResult
where
    A: Send + Sync + 'static,
{
    let fut = match panic::catch_unwind(AssertUnwindSafe(|| f(args))) {
        Ok(fut) => fut,
        Err(payload) => return Err(EventError::from_panic(payload).into()),
    };
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(EventError::from_panic(payload).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ListenerResult;
    use crate::listeners::{BoxListenerFuture, Handle as ListenerHandle};
    use crate::slot::SlotBuilder;
    use crate::observers::Observe;
    use std::error::Error as _;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use tokio::sync::{Notify, oneshot};

    #[derive(Default)]
    struct Recorder {
        failures: StdMutex<Vec<(String, String, InvokeMode, String)>>,
        notify: Notify,
    }

    impl Recorder {
        fn count(&self) -> usize {
            self.failures.lock().unwrap().len()
        }

        fn first(&self) -> (String, String, InvokeMode, String) {
            self.failures.lock().unwrap()[0].clone()
        }
    }

    impl Observe for Recorder {
        fn on_failure(&self, f: &ListenerFailure) {
            self.failures.lock().unwrap().push((
                f.event.to_string(),
                f.listener.to_string(),
                f.mode,
                f.error.to_string(),
            ));
            self.notify.notify_one();
        }
    }

    fn slot_with(name: &'static str, propagate: bool) -> (EventSlot<u32>, Arc<Recorder>) {
        let rec = Arc::new(Recorder::default());
        let slot = SlotBuilder::new()
            .name(name)
            .propagate_exceptions(propagate)
            .observer_arc(rec.clone())
            .build();
        (slot, rec)
    }

    fn push_to(log: &Arc<StdMutex<Vec<&'static str>>>, tag: &'static str) -> Listener<u32> {
        let log = Arc::clone(log);
        Listener::from_fn(move |_: &u32| {
            log.lock().unwrap().push(tag);
            Ok(())
        })
        .with_name(tag)
    }

    fn failing(tag: &'static str) -> Listener<u32> {
        Listener::from_fn(|_: &u32| Err("boom".into())).with_name(tag)
    }

    #[test]
    fn test_invoke_passes_args_once() {
        let seen: Arc<StdMutex<Vec<(String, i32)>>> = Arc::default();
        let slot = EventSlot::<(&'static str, i32)>::new("args");

        let s = Arc::clone(&seen);
        slot.subscribe(Listener::from_fn(move |(a, b): &(&'static str, i32)| {
            s.lock().unwrap().push((a.to_string(), *b));
            Ok(())
        }))
        .unwrap();

        slot.invoke(("a", 1)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![("a".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_empty_slot_is_noop() {
        let slot = EventSlot::<u32>::new("empty");
        slot.invoke(1).unwrap();
        slot.invoke_async(1).await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_does_not_wait_for_async_listener() {
        let slot = EventSlot::<u32>::new("detached");
        let done = Arc::new(AtomicBool::new(false));
        let (tx, rx) = oneshot::channel::<u32>();
        let tx = Arc::new(StdMutex::new(Some(tx)));

        let d = Arc::clone(&done);
        slot.subscribe(Listener::from_async(move |n: Arc<u32>| {
            let d = Arc::clone(&d);
            let tx = Arc::clone(&tx);
            async move {
                d.store(true, Ordering::SeqCst);
                if let Some(tx) = tx.lock().unwrap().take() {
                    let _ = tx.send(*n);
                }
                Ok(())
            }
        }))
        .unwrap();

        slot.invoke(7).unwrap();
        assert!(!done.load(Ordering::SeqCst));

        assert_eq!(rx.await.unwrap(), 7);
        assert!(done.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_invoke_async_waits_for_sync_and_async() {
        let slot = EventSlot::<u32>::new("awaited");
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::default();

        slot.subscribe(push_to(&log, "sync")).unwrap();
        let l = Arc::clone(&log);
        slot.subscribe(Listener::from_async(move |_: Arc<u32>| {
            let l = Arc::clone(&l);
            async move {
                tokio::task::yield_now().await;
                l.lock().unwrap().push("async");
                Ok(())
            }
        }))
        .unwrap();
        slot.subscribe(push_to(&log, "sync-after")).unwrap();

        slot.invoke_async(1).await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["sync", "async", "sync-after"]);
    }

    #[tokio::test]
    async fn test_failure_logged_and_pass_continues() {
        let (slot, rec) = slot_with("no_propagate", false);
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::default();

        slot.subscribe(failing("fails")).unwrap();
        slot.subscribe(push_to(&log, "succeeds")).unwrap();

        slot.invoke_async(1).await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["succeeds"]);

        let (event, listener, mode, error) = rec.first();
        assert_eq!(event, "no_propagate");
        assert_eq!(listener, "fails");
        assert_eq!(mode, InvokeMode::Inline);
        assert_eq!(error, "boom");
    }

    #[tokio::test]
    async fn test_propagated_failure_skips_rest() {
        let (slot, rec) = slot_with("propagate", true);
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::default();

        slot.subscribe(failing("fails")).unwrap();
        slot.subscribe(push_to(&log, "succeeds")).unwrap();

        let err = slot.invoke_async(1).await.unwrap_err();
        match &err {
            EventError::ListenerExecution { event, listener, .. } => {
                assert_eq!(event, "propagate");
                assert_eq!(listener, "fails");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(rec.count(), 0);
    }

    #[test]
    fn test_sync_invoke_propagates() {
        let (slot, _rec) = slot_with("test_exception", true);
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::default();

        slot.subscribe(push_to(&log, "good")).unwrap();
        slot.subscribe(failing("bad")).unwrap();

        let err = slot.invoke(0).unwrap_err();
        assert!(err.to_string().contains("for event 'test_exception'"));
        assert_eq!(*log.lock().unwrap(), ["good"]);
    }

    #[test]
    fn test_failure_does_not_corrupt_slot() {
        let (slot, _rec) = slot_with("recover", true);
        let hits = Arc::new(AtomicU32::new(0));
        let flaky_hits = Arc::clone(&hits);

        slot.subscribe(Listener::from_fn(move |_: &u32| {
            if flaky_hits.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err("first call fails".into());
            }
            Ok(())
        }))
        .unwrap();

        assert!(slot.invoke(0).is_err());
        assert_eq!(slot.len(), 1);
        assert!(slot.invoke(0).is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sync_panic_is_reported() {
        let (slot, rec) = slot_with("panicky", false);
        let after = Arc::new(AtomicBool::new(false));

        slot.subscribe(Listener::from_fn(|_: &u32| panic!("listener exploded")))
            .unwrap();
        let a = Arc::clone(&after);
        slot.subscribe(Listener::from_fn(move |_: &u32| {
            a.store(true, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();

        slot.invoke(0).unwrap();
        assert!(after.load(Ordering::SeqCst));
        assert_eq!(rec.count(), 1);
        assert!(rec.first().3.contains("listener exploded"));
    }

    #[tokio::test]
    async fn test_async_panic_propagates_as_execution_error() {
        let (slot, _rec) = slot_with("panicky", true);
        slot.subscribe(Listener::from_async(|n: Arc<u32>| async move {
            tokio::task::yield_now().await;
            if *n == 0 {
                panic!("async exploded");
            }
            Ok(())
        }))
        .unwrap();

        let err = slot.invoke_async(0).await.unwrap_err();
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("async exploded"));
    }

    #[tokio::test]
    async fn test_detached_failure_goes_to_observer_even_when_propagating() {
        let (slot, rec) = slot_with("detached", true);
        slot.subscribe(Listener::from_async(|_: Arc<u32>| async move {
            Err::<(), ListenerError>("late failure".into())
        }))
        .unwrap();

        slot.invoke(0).unwrap();
        rec.notify.notified().await;

        let (_, _, mode, error) = rec.first();
        assert_eq!(mode, InvokeMode::Detached);
        assert_eq!(error, "late failure");
    }

    #[test]
    fn test_no_runtime_is_a_failure() {
        let (slot, rec) = slot_with("no_rt", false);
        slot.subscribe(Listener::from_async(|_: Arc<u32>| async move { Ok(()) }))
            .unwrap();

        slot.invoke(0).unwrap();
        assert_eq!(rec.count(), 1);
        assert!(rec.first().3.contains("no tokio runtime"));

        let (strict, _) = slot_with("no_rt_strict", true);
        strict
            .subscribe(Listener::from_async(|_: Arc<u32>| async move { Ok(()) }))
            .unwrap();
        assert!(strict.invoke(0).is_err());
    }

    #[test]
    fn test_configured_runtime_runs_detached_listeners() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let slot: EventSlot<u32> = SlotBuilder::new()
            .name("pinned")
            .runtime(rt.handle().clone())
            .build();

        let (tx, rx) = std::sync::mpsc::channel::<u32>();
        let tx = StdMutex::new(tx);
        slot.subscribe(Listener::from_async(move |n: Arc<u32>| {
            let _ = tx.lock().unwrap().send(*n);
            async move { Ok(()) }
        }))
        .unwrap();

        slot.invoke(42).unwrap();
        assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap(), 42);
    }

    #[test]
    fn test_duplicates_all_invoked() {
        let slot: EventSlot<u32> = SlotBuilder::new()
            .allow_duplicate_listeners(true)
            .build();
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::default();
        let l = push_to(&log, "event");

        slot.subscribe(l.clone()).unwrap();
        slot.subscribe(l).unwrap();
        slot.invoke(0).unwrap();
        assert_eq!(*log.lock().unwrap(), ["event", "event"]);
    }

    #[test]
    fn test_subscribe_during_invoke_uses_snapshot() {
        let slot = Arc::new(EventSlot::<u32>::new("reentrant"));
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::default();
        let late = push_to(&log, "late");

        let weak_slot = Arc::downgrade(&slot);
        let l = Arc::clone(&log);
        slot.subscribe(Listener::from_fn(move |_: &u32| {
            l.lock().unwrap().push("first");
            if let Some(slot) = weak_slot.upgrade() {
                let _ = slot.subscribe(late.clone());
            }
            Ok(())
        }))
        .unwrap();

        slot.invoke(0).unwrap();
        assert_eq!(*log.lock().unwrap(), ["first"]);

        slot.invoke(0).unwrap();
        assert_eq!(*log.lock().unwrap(), ["first", "first", "late"]);
    }

    struct Sensor {
        seen: Arc<StdMutex<Vec<u32>>>,
    }

    impl Sensor {
        fn on_value(&self, n: &u32) -> ListenerResult {
            self.seen.lock().unwrap().push(*n);
            Ok(())
        }

        fn on_value_async(self: Arc<Self>, n: Arc<u32>) -> BoxListenerFuture {
            Box::pin(async move {
                self.seen.lock().unwrap().push(*n * 10);
                Ok(())
            })
        }
    }

    #[async_trait::async_trait]
    impl ListenerHandle<u32> for Sensor {
        async fn on_event(&self, n: &u32) -> ListenerResult {
            self.seen.lock().unwrap().push(*n * 100);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "sensor"
        }
    }

    #[tokio::test]
    async fn test_strong_slot_invokes_after_caller_drops_owner() {
        let seen: Arc<StdMutex<Vec<u32>>> = Arc::default();
        let slot = EventSlot::<u32>::new("strong");

        let sensor = Arc::new(Sensor { seen: Arc::clone(&seen) });
        slot.subscribe(Listener::method(&sensor, Sensor::on_value)).unwrap();
        slot.subscribe(Listener::async_method(&sensor, Sensor::on_value_async))
            .unwrap();
        slot.subscribe(Listener::handler(&sensor)).unwrap();
        drop(sensor);

        slot.invoke_async(1).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), [1, 10, 100]);
    }

    #[tokio::test]
    async fn test_weak_slot_skips_reclaimed_owner() {
        let seen: Arc<StdMutex<Vec<u32>>> = Arc::default();
        let slot = EventSlot::<u32>::weak("weak");

        let sensor = Arc::new(Sensor { seen: Arc::clone(&seen) });
        slot.subscribe(Listener::method(&sensor, Sensor::on_value)).unwrap();
        slot.subscribe(Listener::handler(&sensor)).unwrap();

        slot.invoke_async(2).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), [2, 200]);

        drop(sensor);
        slot.invoke(3).unwrap();
        slot.invoke_async(3).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), [2, 200]);
        assert!(slot.is_empty());
    }

    struct Tracker {
        hits: Arc<AtomicU32>,
    }

    impl Tracker {
        fn on_value(&self, _n: &u32) -> ListenerResult {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Weak slot with `[releaser, tracker.on_value]`; the only outside reference to the
    /// tracker lives in the returned holder.
    fn weak_slot_with_releaser(
        releaser: Listener<u32>,
        holder: &Arc<StdMutex<Option<Arc<Tracker>>>>,
    ) -> (EventSlot<u32>, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));
        let tracker = Arc::new(Tracker { hits: Arc::clone(&hits) });
        let slot = EventSlot::<u32>::weak("release");

        slot.subscribe(releaser).unwrap();
        slot.subscribe(Listener::method(&tracker, Tracker::on_value)).unwrap();
        *holder.lock().unwrap() = Some(tracker);
        (slot, hits)
    }

    #[tokio::test]
    async fn test_owner_released_mid_pass_is_not_invoked() {
        let holder: Arc<StdMutex<Option<Arc<Tracker>>>> = Arc::default();
        let h = Arc::clone(&holder);
        let releaser = Listener::from_async(move |_: Arc<u32>| {
            let h = Arc::clone(&h);
            async move {
                drop(h.lock().unwrap().take());
                tokio::task::yield_now().await;
                Ok(())
            }
        });
        let (slot, hits) = weak_slot_with_releaser(releaser, &holder);

        slot.invoke_async(0).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(slot.len(), 1);
    }

    #[test]
    fn test_owner_released_by_sync_listener_is_not_invoked() {
        let holder: Arc<StdMutex<Option<Arc<Tracker>>>> = Arc::default();
        let h = Arc::clone(&holder);
        let releaser = Listener::from_fn(move |_: &u32| {
            drop(h.lock().unwrap().take());
            Ok(())
        });
        let (slot, hits) = weak_slot_with_releaser(releaser, &holder);

        slot.invoke(0).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_awaited_failure_logged_and_pass_continues() {
        let (slot, rec) = slot_with("awaited_failure", false);
        let log: Arc<StdMutex<Vec<&'static str>>> = Arc::default();

        slot.subscribe(
            Listener::from_async(|_: Arc<u32>| async move {
                tokio::task::yield_now().await;
                Err::<(), ListenerError>("async boom".into())
            })
            .with_name("async_fails"),
        )
        .unwrap();
        slot.subscribe(push_to(&log, "recorder")).unwrap();

        assert!(slot.invoke_async(1).await.is_ok());
        assert_eq!(*log.lock().unwrap(), ["recorder"]);

        assert_eq!(rec.count(), 1);
        let (event, listener, mode, error) = rec.first();
        assert_eq!(event, "awaited_failure");
        assert_eq!(listener, "async_fails");
        assert_eq!(mode, InvokeMode::Awaited);
        assert_eq!(error, "async boom");
    }

    #[test]
    fn test_as_fn_is_invoke() {
        let slot = EventSlot::<u32>::new("call");
        let total = Arc::new(AtomicU32::new(0));
        let t = Arc::clone(&total);
        slot.subscribe(Listener::from_fn(move |n: &u32| {
            t.fetch_add(*n, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();

        let fire = slot.as_fn();
        fire(2).unwrap();
        fire(3).unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 5);
    }
}
