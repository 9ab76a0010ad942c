//! # Example: stop_during_delay
//!
//! Stops a supervisor while it is waiting out the respawn delay.
//!
//! Shows how to:
//! - Set the default respawn delay via [`SupervisorConfig`]
//! - Interrupt a pending relaunch with [`Supervisor::stop`]
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► sup.start()          `/bin/sh -c true` exits immediately
//!   │     └─► monitor: exit observed, sleeps 2s before relaunching
//!   ├─► sleep 300ms          (now inside the delay window)
//!   └─► sup.stop()           cancels the sleep; no relaunch happens
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example stop_during_delay
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use procvisor::{ProcessSpec, Subscribe, Supervisor, SupervisorConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== stop_during_delay example ===\n");

    // 1. Optional logging subscriber
    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = {
        use procvisor::EventLogger;
        vec![Arc::new(EventLogger)]
    };
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    // 2. A long default delay makes the window easy to hit
    let mut cfg = SupervisorConfig::default();
    cfg.timeout_respawn = Duration::from_secs(2);

    // 3. The child exits immediately, so the loop goes straight into the delay
    let spec = ProcessSpec::new("one-shot", "/bin/sh").with_args(["-c", "true"]);
    let sup = Supervisor::builder(spec)
        .with_config(cfg)
        .with_subscribers(subs)
        .build();

    sup.start().await?;
    println!("[main] started; the child exits immediately");

    // 4. Land inside the respawn delay
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!("[main] stopping mid-delay...");

    let before = Instant::now();
    sup.stop().await?;
    println!("[main] stop returned in {:?}", before.elapsed());

    println!("[main] running: {}", sup.is_running().await);
    println!("\n=== example completed ===");
    Ok(())
}
