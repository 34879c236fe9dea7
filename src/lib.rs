//! # eventslot
//!
//! **Eventslot** is a small in-process event library for Rust.
//!
//! An [`EventSlot`] is an ordered registry of listeners for one event. Listeners are plain
//! closures, methods bound to an owner, or handler objects; they can be sync or async.
//! A slot holds bound owners strongly or weakly, rejects duplicate subscriptions unless told
//! otherwise, and fans out invocations either fire-and-forget or fully awaited.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Listener::from_fn     Listener::method      Listener::handler
//!   Listener::from_async  Listener::async_method      │
//!            │                    │                   │
//!            ▼                    ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventSlot<A>                                                     │
//! │  - SlotConfig (kind, propagate_exceptions, allow_duplicates)      │
//! │  - Mutex<Vec<Listener<A>>> (registration order)                   │
//! │  - Observe (failure reporting, LogObserver by default)            │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        ▼                                              ▼
//!   invoke(args)                                  invoke_async(args).await
//!   ├─ sync listeners run inline                  ├─ sync listeners run inline
//!   └─ async listeners spawned on tokio           └─ async listeners awaited in order
//!        │                                              │
//!        ▼                                              ▼
//!   failure ─► propagate_exceptions ? return Err : Observe::on_failure, continue
//! ```
//!
//! ### Declared events
//! ```text
//! impl Owner { const ON_X: EventDecl = EventDecl::new("on_x"); }
//!
//! owner.events (EventSet) ──► get_or_create_event(&ON_X)
//!                              ├─ first access: create from declaration
//!                              └─ later: check cached slot against declaration
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                      |
//! |-------------------|--------------------------------------------------------------|-----------------------------------------|
//! | **Slots**         | Ordered listener registry with sync/async fan-out.           | [`EventSlot`], [`SlotBuilder`]          |
//! | **Listeners**     | Closures, bound methods and handler objects.                 | [`Listener`], [`Handle`], [`ListenerId`]|
//! | **Observers**     | Report listener failures (logging, metrics, custom sinks).   | [`Observe`], [`LogObserver`]            |
//! | **Declarations**  | Per-instance slots validated against a static declaration.   | [`EventDecl`], [`EventSet`]             |
//! | **Errors**        | Typed errors for membership, invocation and declarations.    | [`EventError`], [`ListenerError`]       |
//! | **Configuration** | Ownership variant and policies fixed at construction.        | [`SlotConfig`], [`SlotKind`]            |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventslot::{EventSlot, Listener};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let on_line = EventSlot::<String>::new("on_line");
//!
//!     on_line.subscribe(Listener::from_fn(|line: &String| {
//!         println!("sync: {line}");
//!         Ok(())
//!     }))?;
//!     on_line.subscribe(Listener::from_async(|line: Arc<String>| async move {
//!         println!("async: {line}");
//!         Ok(())
//!     }))?;
//!
//!     // Awaits every listener in registration order.
//!     on_line.invoke_async("hello".to_string()).await?;
//!     Ok(())
//! }
//! ```
mod config;
mod declare;
mod error;
mod listeners;
mod observers;
mod slot;

// ---- Public re-exports ----

pub use config::{SlotConfig, SlotKind};
pub use declare::{EventDecl, EventSet};
pub use error::{EventError, ListenerError, ListenerResult};
pub use listeners::{BoxListenerFuture, Handle, Listener, ListenerId};
pub use observers::{InvokeMode, ListenerFailure, LogObserver, Observe};
pub use slot::{EventSlot, SlotBuilder};
