//! # Declared events: per-owner slots with a static configuration.
//!
//! An owner type declares its events as constants ([`EventDecl`]) and keeps one
//! [`EventSet`]. Each instance lazily gets its own slot per declared event on first
//! access; every access validates the slot against the declaration.
//!
//! ## Architecture
//! ```text
//! impl Downloader {
//!     const ON_DONE: EventDecl = EventDecl::new("on_done").weak();
//! }
//!
//! downloader.events.get_or_create_event::<Report>(&Downloader::ON_DONE)
//!        │
//!        ├─ absent  ──► ON_DONE.builder() ──► EventSlot<Report> (cached)
//!        └─ present ──► ON_DONE.check(&slot) ──► Ok(slot) | ConfigMismatch
//! ```
//!
//! ## Rules
//! - A slot can be pre-configured with [`EventSet::install`] before first access; its
//!   explicit settings must agree with the declaration, unset ones adopt it.
//! - A slot is never replaced once it exists; listeners are changed through the slot.

mod decl;
mod set;

pub use decl::EventDecl;
pub use set::EventSet;
