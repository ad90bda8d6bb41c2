//! # fieldsync
//!
//! Submit writes that survive lost connectivity, inspect the offline
//! queue, and replay it.
//!
//! ## Commands
//!
//! - `submit`: Send a write, or queue it when offline
//! - `queue`: List, remove, or requeue queued writes
//! - `sync`: Replay the queue now
//! - `status`: Show queue counts and configuration
//!
//! ## Example
//!
//! ```bash
//! # In the field, no signal
//! fieldsync --offline submit listing --payload '{"crop":"Onion","quantityKg":500}'
//!
//! # Back in range
//! fieldsync sync
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod http;

use commands::submit::Kind;
use commands::{queue, status, submit, sync, App};
use config::Config;

/// Offline-first write client.
#[derive(Parser, Debug)]
#[command(name = "fieldsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the queue and config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: fieldsync.toml in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat the network as unreachable; writes are queued
    #[arg(long, global = true)]
    offline: bool,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit a write
    Submit {
        /// Kind of write
        #[arg(value_enum)]
        kind: Kind,

        /// JSON payload
        #[arg(long, short)]
        payload: String,
    },

    /// Inspect and edit the queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Replay queued writes now
    Sync,

    /// Show queue status
    Status,
}

#[derive(Subcommand, Debug)]
enum QueueAction {
    /// List queued writes, oldest first
    List,

    /// Discard a queued write
    Remove {
        /// Item id as shown by `queue list`
        id: String,
    },

    /// Move parked writes back to pending
    Requeue,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

    let config = Config::load(cli.config.as_deref(), &data_dir)?;
    tracing::debug!(
        "Data dir {}, remote {}",
        data_dir.display(),
        config.remote.base_url
    );
    let app = App::open(&data_dir, config, cli.offline)?;

    match cli.command {
        Commands::Submit { kind, payload } => {
            submit::run(&app, kind, &payload).await?;
        }
        Commands::Queue { action } => match action {
            QueueAction::List => {
                queue::list(&app)?;
            }
            QueueAction::Remove { id } => {
                queue::remove(&app, &id)?;
            }
            QueueAction::Requeue => {
                queue::requeue(&app)?;
            }
        },
        Commands::Sync => {
            sync::run(&app).await?;
        }
        Commands::Status => {
            status::run(&app)?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,fieldsync=debug,fieldsync_client=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Get the default data directory for fieldsync.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "fieldsync", "fieldsync")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
