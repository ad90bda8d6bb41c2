//! Show queue status.

use anyhow::{Context, Result};

use super::App;

/// Queue counts reported by `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    /// Items waiting for the next pass.
    pub pending: usize,
    /// Items parked after failing.
    pub parked: usize,
}

/// Run the status command.
pub fn run(app: &App) -> Result<Counts> {
    let counts = Counts {
        pending: app.queue.count().context("Failed to read queue")?,
        parked: app.queue.error_count().context("Failed to read queue")?,
    };

    println!("=== fieldsync status ===");
    println!();
    println!("Queue:");
    println!("  Pending: {}", counts.pending);
    println!("  Parked:  {}", counts.parked);
    if counts.parked > 0 {
        println!();
        println!("Run 'fieldsync queue list' to inspect parked items,");
        println!("'fieldsync queue requeue' to retry them.");
    }
    println!();
    println!("Remote:");
    println!("  URL:     {}", app.config.remote.base_url);
    println!(
        "  Network: {}",
        if app.monitor.is_online() { "online" } else { "offline" }
    );
    println!();
    println!("Storage:");
    println!("  Data dir: {}", app.data_dir.display());
    println!("  Queue:    {}", app.config.queue_dir(&app.data_dir).display());
    println!();
    println!("Policy:");
    let retry = app.config.retry_policy();
    println!(
        "  Retries:  {} per call, {} attempts total (first delay {} ms)",
        retry.max_retries,
        retry.max_attempts(),
        retry.initial_delay.as_millis()
    );
    match app.config.replay_policy().max_attempts {
        Some(max) => println!("  Parking:  after {} failed passes", max),
        None => println!("  Parking:  only on rejection"),
    }

    Ok(counts)
}
