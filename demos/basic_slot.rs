//! # Example: basic_slot
//!
//! Demonstrates a single event slot with sync and async listeners.
//!
//! Shows how to:
//! - Subscribe closures with [`Listener::from_fn`] / [`Listener::from_async`].
//! - Fire the event with [`EventSlot::invoke`] (async listeners detached) and
//!   [`EventSlot::invoke_async`] (everything awaited in order).
//! - Switch between logged and propagated listener failures.
//!
//! ## Flow
//! ```text
//! on_line.invoke("first")
//!     ├─► print_line (sync, inline)
//!     ├─► slow_upper (async, spawned)
//!     └─► reject_empty (sync, inline) ──► LogObserver (tracing::error!)
//!
//! strict.invoke_async("")
//!     └─► reject_empty ──► Err(EventError::ListenerExecution)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_slot
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventslot::{EventError, EventSlot, Listener, SlotBuilder};

fn reject_empty() -> Listener<String> {
    Listener::from_fn(|line: &String| {
        if line.is_empty() {
            return Err("empty line".into());
        }
        Ok(())
    })
    .with_name("reject_empty")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let on_line = EventSlot::<String>::new("on_line");

    on_line.subscribe(
        Listener::from_fn(|line: &String| {
            println!("[sync]  {line}");
            Ok(())
        })
        .with_name("print_line"),
    )?;
    on_line.subscribe(
        Listener::from_async(|line: Arc<String>| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            println!("[async] {}", line.to_uppercase());
            Ok(())
        })
        .with_name("slow_upper"),
    )?;
    on_line.subscribe(reject_empty())?;

    // Fire-and-forget: returns after the sync listeners; slow_upper runs in the background.
    on_line.invoke("first".to_string())?;
    println!("invoke returned");
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Fully awaited: slow_upper finishes before this returns. The empty line is logged.
    on_line.invoke_async(String::new()).await?;
    println!("invoke_async returned");

    // Propagating slot: the first failure is returned to the caller.
    let strict: EventSlot<String> = SlotBuilder::new()
        .name("strict_line")
        .propagate_exceptions(true)
        .build();
    strict.subscribe(reject_empty())?;

    match strict.invoke_async(String::new()).await {
        Err(err @ EventError::ListenerExecution { .. }) => {
            println!("propagated: {} ({})", err, err.as_label());
        }
        other => println!("unexpected: {other:?}"),
    }

    Ok(())
}
