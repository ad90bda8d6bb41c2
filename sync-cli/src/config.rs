//! Configuration loading for fieldsync.
//!
//! Configuration is loaded from a TOML file (default: `fieldsync.toml` in the
//! data directory). Every section and field is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sync_client::DEFAULT_QUEUE_KEY;
use sync_core::{ReplayPolicy, RetryPolicy};

/// Config file name looked up in the data directory.
pub const CONFIG_FILE: &str = "fieldsync.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote service configuration.
    pub remote: RemoteConfig,
    /// Live-call retry configuration.
    pub retry: RetryConfig,
    /// Queue storage configuration.
    pub queue: QueueConfig,
    /// Replay configuration.
    pub sync: SyncConfig,
}

/// Remote service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL endpoints are resolved against (default: http://localhost:8080).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds (default: 1000).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

/// Queue storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Store directory, relative to the data directory (default: queue).
    #[serde(default = "default_queue_path")]
    pub path: PathBuf,
    /// Store key holding the queue snapshot (default: offline-queue).
    #[serde(default = "default_queue_key")]
    pub key: String,
}

/// Replay configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Failed passes before an item is parked; 0 = never (default: 20).
    #[serde(default = "default_max_replay_attempts")]
    pub max_replay_attempts: u32,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    sync_core::backoff::DEFAULT_MAX_RETRIES
}

fn default_initial_delay_ms() -> u64 {
    sync_core::backoff::DEFAULT_INITIAL_DELAY.as_millis() as u64
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("queue")
}

fn default_queue_key() -> String {
    DEFAULT_QUEUE_KEY.to_string()
}

fn default_max_replay_attempts() -> u32 {
    sync_core::replay::DEFAULT_MAX_REPLAY_ATTEMPTS
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: default_queue_path(),
            key: default_queue_key(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_replay_attempts: default_max_replay_attempts(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the explicit config file, or `fieldsync.toml` in the data
    /// directory if present, or defaults.
    pub fn load(explicit: Option<&Path>, data_dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let path = data_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Retry policy for live calls and replays.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_retries,
            Duration::from_millis(self.retry.initial_delay_ms),
        )
    }

    /// Replay (eviction) policy.
    pub fn replay_policy(&self) -> ReplayPolicy {
        ReplayPolicy::new(self.sync.max_replay_attempts)
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    /// Queue store directory. Relative paths resolve against `data_dir`.
    pub fn queue_dir(&self, data_dir: &Path) -> PathBuf {
        if self.queue.path.is_absolute() {
            self.queue.path.clone()
        } else {
            data_dir.join(&self.queue.path)
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.remote.base_url, "http://localhost:8080");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_delay_ms, 1000);
        assert_eq!(config.queue.path, PathBuf::from("queue"));
        assert_eq!(config.queue.key, "offline-queue");
        assert_eq!(config.sync.max_replay_attempts, 20);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [remote]
            base_url = "https://agri.example.org/api"

            [sync]
            max_replay_attempts = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.remote.base_url, "https://agri.example.org/api");
        assert_eq!(config.remote.timeout_secs, 30);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.replay_policy(), ReplayPolicy::unlimited());
    }

    #[test]
    fn empty_file_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.queue.key, DEFAULT_QUEUE_KEY);
    }

    #[test]
    fn policies_from_config() {
        let config: Config = toml::from_str(
            r#"
            [retry]
            max_retries = 5
            initial_delay_ms = 250
            "#,
        )
        .unwrap();

        let policy = config.retry_policy();
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.initial_delay, Duration::from_millis(250));
    }

    #[test]
    fn queue_dir_resolution() {
        let data_dir = Path::new("/var/lib/fieldsync");
        let mut config = Config::default();
        assert_eq!(
            config.queue_dir(data_dir),
            PathBuf::from("/var/lib/fieldsync/queue")
        );

        config.queue.path = PathBuf::from("/mnt/sd/queue");
        assert_eq!(config.queue_dir(data_dir), PathBuf::from("/mnt/sd/queue"));
    }

    #[test]
    fn load_prefers_explicit_then_data_dir() {
        let dir = tempdir().unwrap();
        assert_eq!(
            Config::load(None, dir.path()).unwrap().remote.timeout_secs,
            30
        );

        std::fs::write(dir.path().join(CONFIG_FILE), "[remote]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(Config::load(None, dir.path()).unwrap().remote.timeout_secs, 5);

        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[remote]\ntimeout_secs = 9\n").unwrap();
        assert_eq!(
            Config::load(Some(&explicit), dir.path())
                .unwrap()
                .remote
                .timeout_secs,
            9
        );
    }

    #[test]
    fn missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = Config::load(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
        assert!(err.to_string().contains("nope.toml"));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[retry]\nmax_retries = \"lots\"\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
