//! Drain the queue now.

use anyhow::{Context, Result};
use sync_client::{PassOutcome, SyncReport};

use super::App;

/// Run one sync pass. Offline, nothing is replayed.
pub async fn run(app: &App) -> Result<Option<SyncReport>> {
    if !app.monitor.is_online() {
        println!("Offline: {} item(s) waiting", app.queue.count()?);
        return Ok(None);
    }

    let report = app.engine().drain().await.context("Sync pass failed")?;

    match report.outcome {
        PassOutcome::Empty => println!("Nothing to sync."),
        PassOutcome::Coalesced => println!("A sync pass is already running."),
        PassOutcome::Completed => {
            println!("Sync complete");
            println!("  Replayed: {}", report.replayed);
            println!("  Failed:   {}", report.failed);
            println!("  Parked:   {}", report.parked);
            println!("  Pending:  {}", app.queue.count()?);
        }
    }

    Ok(Some(report))
}
