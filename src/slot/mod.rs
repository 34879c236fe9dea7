//! # Event slots: ordered listener registries.
//!
//! An [`EventSlot`] owns the listeners of one event and fans each invocation out to them.
//!
//! ## Architecture
//! ```text
//! subscribe(listener) ──► [ Mutex<Vec<Listener>> ] ◄── unsubscribe(listener)
//!                                  │
//!                          snapshot (purge dead weak entries, copy the rest)
//!                                  │
//!        ┌─────────────────────────┴──────────────────────────┐
//!        ▼                                                    ▼
//!   invoke(args)                                        invoke_async(args)
//!     sync  ─► inline, in order                          sync  ─► inline, in order
//!     async ─► spawned on tokio, detached                async ─► awaited, in order
//!     failure ─► policy / observer                       failure ─► policy / observer
//! ```
//!
//! ## Rules
//! - **Order**: listeners run in registration order; subscribe appends, unsubscribe keeps
//!   the relative order of the rest.
//! - **Snapshot**: an invocation runs over the listeners present when it started. The lock
//!   is released before any listener runs, so listeners may subscribe/unsubscribe.
//! - **Weak entries**: once the owner is reclaimed the entry is absent everywhere
//!   (`len`, duplicate checks, invocation) and is purged on the next scan. A pass binds each
//!   owner right before its listener runs, so an owner dropped earlier in the pass is skipped.
//! - **Failures**: never change the listener list; see [`SlotConfig`](crate::SlotConfig)
//!   for the propagate policy.

mod builder;
mod invoke;
mod registry;

pub use builder::SlotBuilder;
pub use registry::EventSlot;
