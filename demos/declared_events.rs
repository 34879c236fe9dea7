//! # Example: declared_events
//!
//! Demonstrates per-instance events declared on an owner type.
//!
//! Shows how to:
//! - Declare events as associated [`EventDecl`] constants.
//! - Lazily create one slot per instance through an [`EventSet`].
//! - Pre-configure a slot with [`EventSet::install`] and report failures to a custom observer.
//!
//! ## Flow
//! ```text
//! Downloader::new()
//!     └─► events.install(ON_CHUNK, builder)      (optional pre-configuration)
//!
//! downloader.on_progress() ──► get_or_create_event(ON_PROGRESS) ──► Arc<EventSlot<u8>>
//! downloader.on_chunk()    ──► get_or_create_event(ON_CHUNK)    ──► cached, checked
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example declared_events
//! ```

use std::sync::Arc;

use eventslot::{
    EventDecl, EventError, EventSet, EventSlot, Listener, ListenerFailure, Observe, SlotBuilder,
};

/// Observer printing failures instead of logging them.
struct Console;

impl Observe for Console {
    fn on_failure(&self, f: &ListenerFailure) {
        println!(
            "[observer] {} / {} ({}): {}",
            f.event,
            f.listener,
            f.mode.as_label(),
            f.error
        );
    }

    fn name(&self) -> &'static str {
        "console"
    }
}

struct Downloader {
    url: String,
    events: EventSet,
}

impl Downloader {
    const ON_PROGRESS: EventDecl = EventDecl::new("on_progress");
    const ON_CHUNK: EventDecl = EventDecl::new("on_chunk").allow_duplicate_listeners(true);

    fn new(url: &str) -> Result<Self, EventError> {
        let events = EventSet::with_observer(Console);
        events.install::<Vec<u8>>(&Self::ON_CHUNK, SlotBuilder::new().weak())?;
        Ok(Self {
            url: url.to_string(),
            events,
        })
    }

    fn on_progress(&self) -> Result<Arc<EventSlot<u8>>, EventError> {
        self.events.get_or_create_event(&Self::ON_PROGRESS)
    }

    fn on_chunk(&self) -> Result<Arc<EventSlot<Vec<u8>>>, EventError> {
        self.events.get_or_create_event(&Self::ON_CHUNK)
    }

    async fn run(&self) -> Result<(), EventError> {
        for (i, pct) in [25u8, 50, 75, 100].into_iter().enumerate() {
            self.on_chunk()?.invoke_async(vec![i as u8; 4]).await?;
            self.on_progress()?.invoke(pct)?;
        }
        println!("[{}] done", self.url);
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let a = Downloader::new("https://example.org/a")?;
    let b = Downloader::new("https://example.org/b")?;

    a.on_progress()?.subscribe(Listener::from_fn(|p: &u8| {
        println!("[a] {p}%");
        Ok(())
    }))?;
    a.on_chunk()?.subscribe(Listener::from_fn(|c: &Vec<u8>| {
        if c.first() == Some(&2) {
            return Err("corrupt chunk".into());
        }
        Ok(())
    }))?;

    a.run().await?;
    // `b` has its own slots: nothing is subscribed there.
    b.run().await?;

    println!("a events: {:?}", a.events.names());
    println!("chunk slot: {:?}", a.on_chunk()?);

    // A slot can only be configured before first access.
    if let Err(err) = a.events.install::<u8>(&Downloader::ON_PROGRESS, SlotBuilder::new()) {
        println!("install rejected: {err}");
    }

    // Reading a declared event with the wrong argument type is a mismatch.
    if let Err(err) = a.events.get_or_create_event::<String>(&Downloader::ON_PROGRESS) {
        println!("type mismatch: {err}");
    }

    Ok(())
}
