//! CLI command implementations.

pub mod queue;
pub mod status;
pub mod submit;
pub mod sync;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sync_client::{
    ConnectivityMonitor, FileStore, OperationQueue, RemoteEndpoint, RetryExecutor, SyncEngine,
    WriteGateway,
};

use crate::config::Config;
use crate::http::HttpRemote;

/// Everything a command needs, opened once per invocation.
pub struct App {
    /// Data directory.
    pub data_dir: PathBuf,
    /// Loaded configuration.
    pub config: Config,
    /// The durable queue.
    pub queue: Arc<OperationQueue>,
    /// Remote the queue replays against.
    pub remote: Arc<dyn RemoteEndpoint>,
    /// Connectivity as declared on the command line.
    pub monitor: ConnectivityMonitor,
}

impl App {
    /// Open the queue in `data_dir` and connect to the configured HTTP remote.
    pub fn open(data_dir: &Path, config: Config, offline: bool) -> Result<Self> {
        let remote = HttpRemote::new(&config.remote.base_url, config.timeout())
            .context("Failed to create HTTP client")?;
        Self::with_remote(data_dir, config, offline, Arc::new(remote))
    }

    /// Open the queue in `data_dir` with the given remote.
    pub fn with_remote(
        data_dir: &Path,
        config: Config,
        offline: bool,
        remote: Arc<dyn RemoteEndpoint>,
    ) -> Result<Self> {
        let queue_dir = config.queue_dir(data_dir);
        let store = FileStore::open(&queue_dir)
            .with_context(|| format!("Failed to open queue store at {}", queue_dir.display()))?;
        let queue = OperationQueue::with_key(Arc::new(store), config.queue.key.clone());

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            config,
            queue: Arc::new(queue),
            remote,
            monitor: ConnectivityMonitor::new(!offline),
        })
    }

    /// Gateway for submitting writes.
    pub fn gateway(&self) -> WriteGateway {
        WriteGateway::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.remote),
            self.monitor.clone(),
            RetryExecutor::new(self.config.retry_policy()),
        )
    }

    /// Engine for draining the queue.
    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.remote),
            RetryExecutor::new(self.config.retry_policy()),
            self.config.replay_policy(),
        )
    }
}
