//! Inspect and edit the queue.

use anyhow::{Context, Result};
use sync_client::{ItemId, ItemStatus, QueueItem};

use super::App;

/// List queued items, oldest first.
pub fn list(app: &App) -> Result<Vec<QueueItem>> {
    let items = app.queue.list().context("Failed to read queue")?;

    if items.is_empty() {
        println!("Queue is empty.");
        return Ok(items);
    }

    println!(
        "{:<18} {:<10} {:<8} {:>8}  {:<22} CREATED",
        "ID", "TYPE", "STATUS", "ATTEMPTS", "ENDPOINT"
    );
    for item in &items {
        println!(
            "{:<18} {:<10} {:<8} {:>8}  {:<22} {}",
            item.id.to_string(),
            item.operation_type.to_string(),
            status_label(item.status),
            item.attempts,
            item.endpoint,
            item.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(error) = &item.last_error {
            println!("{:<18} last error: {}", "", error);
        }
    }

    Ok(items)
}

/// Discard one item.
pub fn remove(app: &App, id: &str) -> Result<bool> {
    let id: ItemId = id
        .parse()
        .with_context(|| format!("Invalid item id: {}", id))?;
    let removed = app.queue.remove(&id).context("Failed to update queue")?;

    if removed {
        println!("Removed {}", id);
    } else {
        println!("{} is not queued", id);
    }
    Ok(removed)
}

/// Move parked items back to pending.
pub fn requeue(app: &App) -> Result<usize> {
    let count = app
        .queue
        .requeue_errored()
        .context("Failed to update queue")?;
    println!("Requeued {} parked item(s)", count);
    Ok(count)
}

fn status_label(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Pending => "pending",
        ItemStatus::Syncing => "syncing",
        ItemStatus::Error => "error",
    }
}
