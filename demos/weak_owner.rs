//! # Example: weak_owner
//!
//! Demonstrates bound listeners and strong vs weak ownership.
//!
//! Shows how to:
//! - Bind methods to an owner with [`Listener::method`] / [`Listener::async_method`].
//! - Implement [`Handle`] for an object listener.
//! - Let a weak slot forget listeners whose owner was dropped.
//!
//! ## Flow
//! ```text
//! strong slot: owner dropped by caller ──► still alive (slot holds Arc) ──► still invoked
//! weak slot:   owner dropped by caller ──► reclaimed                    ──► silently skipped
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example weak_owner
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use eventslot::{BoxListenerFuture, EventSlot, Handle, Listener, ListenerResult};

/// Temperature reading passed to listeners.
#[derive(Debug)]
struct Reading {
    celsius: f32,
}

struct Display {
    label: &'static str,
    updates: AtomicUsize,
}

impl Display {
    fn new(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            updates: AtomicUsize::new(0),
        })
    }

    fn show(&self, r: &Reading) -> ListenerResult {
        let n = self.updates.fetch_add(1, Ordering::Relaxed) + 1;
        println!("[{}] {:.1}°C (update #{n})", self.label, r.celsius);
        Ok(())
    }

    fn archive(self: Arc<Self>, r: Arc<Reading>) -> BoxListenerFuture {
        Box::pin(async move {
            tokio::task::yield_now().await;
            println!("[{}] archived {r:?}", self.label);
            Ok(())
        })
    }
}

struct Alarm {
    threshold: f32,
}

#[async_trait::async_trait]
impl Handle<Reading> for Alarm {
    async fn on_event(&self, r: &Reading) -> ListenerResult {
        if r.celsius > self.threshold {
            println!("[alarm] {:.1}°C above {:.1}°C", r.celsius, self.threshold);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "alarm"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let strong = EventSlot::<Reading>::new("strong_readings");
    let weak = EventSlot::<Reading>::weak("weak_readings");

    {
        let kitchen = Display::new("kitchen");
        let alarm = Arc::new(Alarm { threshold: 30.0 });

        strong.subscribe(Listener::method(&kitchen, Display::show))?;
        strong.subscribe(Listener::async_method(&kitchen, Display::archive))?;
        weak.subscribe(Listener::method(&kitchen, Display::show))?;
        weak.subscribe(Listener::handler(&alarm))?;

        weak.invoke_async(Reading { celsius: 31.5 }).await?;
        println!("weak slot while owners alive: {} listeners", weak.len());
    }

    // The block dropped `kitchen` and `alarm`; only the strong slot still keeps kitchen.
    println!("weak slot after drop: {} listeners", weak.len());
    weak.invoke_async(Reading { celsius: 35.0 }).await?;

    strong.invoke_async(Reading { celsius: 21.0 }).await?;
    println!("{strong:?}");

    // Unsubscribing by an equal bound listener releases the last reference.
    let listeners = strong.listeners();
    for l in &listeners {
        strong.unsubscribe(l);
    }
    println!("strong slot after unsubscribe: {} listeners", strong.len());

    Ok(())
}
