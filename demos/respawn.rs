//! # Example: respawn
//!
//! Supervises a short-lived shell command and lets it respawn a few times.
//!
//! Shows how to:
//! - Build a [`ProcessSpec`] for an external command
//! - Start supervision and observe relaunches via [`Supervisor::process`]
//! - Shut the loop down with [`Supervisor::stop`]
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► Supervisor::builder(spec).build()
//!   ├─► sup.start()
//!   │     ├─► spawn `/bin/sh -c 'echo ...; sleep 1'`
//!   │     └─► monitor loop: wait → exit → delay → relaunch
//!   ├─► watch the child pid change for ~5 seconds
//!   └─► sup.stop()
//!         ├─► cancel the loop, SIGTERM the current child
//!         └─► join the monitor
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example respawn
//! ```

use std::sync::Arc;
use std::time::Duration;

use procvisor::{ProcessSpec, Subscribe, Supervisor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== respawn example ===\n");

    // 1. Optional: add a subscriber to see lifecycle events (requires "logging" feature)
    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = {
        use procvisor::EventLogger;
        vec![Arc::new(EventLogger)]
    };
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    // 2. A child that exits after a second, so the loop keeps relaunching it
    let spec = ProcessSpec::new("echo-loop", "/bin/sh")
        .with_args(["-c", "echo \"[child] hello from $$\"; sleep 1"])
        .with_timeout_respawn(Some(Duration::from_millis(500)));

    // 3. Build and start
    let sup = Supervisor::builder(spec).with_subscribers(subs).build();
    sup.start().await?;
    println!("[main] supervision started\n");

    // 4. Watch the pid change across relaunches
    let mut last_pid = None;
    for _ in 0..10 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let pid = sup.process().await.map(|h| h.id());
        if pid != last_pid {
            println!("[main] current child: {pid:?}");
            last_pid = pid;
        }
    }

    // 5. Stop: cancels the loop and terminates whatever child is current
    println!("\n[main] stopping...");
    sup.stop().await?;
    println!("[main] stopped; child: {:?}", sup.process().await);

    println!("\n=== example completed ===");
    Ok(())
}
