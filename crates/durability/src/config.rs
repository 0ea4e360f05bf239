//! Persistence configuration
//!
//! Controls snapshot cadence, location, naming and the handoff queue
//! between the store actor and the snapshot writer.

use std::path::PathBuf;
use std::time::Duration;

/// Default snapshot interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Default snapshot file prefix
pub const DEFAULT_FILE_PREFIX: &str = "snapkv";

/// Default depth of the snapshot handoff queue
pub const DEFAULT_QUEUE_DEPTH: usize = 10;

/// What the store actor does when the snapshot queue is full at a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Log and skip this tick; the next tick carries fresher state anyway
    #[default]
    SkipTick,
    /// Suspend the actor until the writer frees a slot
    Wait,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Snapshot cadence in seconds
    pub interval_secs: u64,
    /// Directory holding snapshot files
    pub snapshot_dir: PathBuf,
    /// File name prefix; files are `<prefix>-<unix-seconds>.json`
    pub file_prefix: String,
    /// Bound of the snapshot handoff queue
    pub queue_depth: usize,
    /// Behavior when the handoff queue is full
    pub overflow: OverflowPolicy,
    /// fsync snapshot files and their directory after writing
    pub fsync: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        PersistenceConfig {
            interval_secs: DEFAULT_INTERVAL_SECS,
            snapshot_dir: std::env::temp_dir(),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            overflow: OverflowPolicy::default(),
            fsync: true,
        }
    }
}

impl PersistenceConfig {
    /// Create config for testing
    ///
    /// Snapshots go to `dir`, the cadence is one second and fsync is off.
    pub fn for_testing(dir: impl Into<PathBuf>) -> Self {
        PersistenceConfig {
            interval_secs: 1,
            snapshot_dir: dir.into(),
            fsync: false,
            ..Default::default()
        }
    }

    /// Set snapshot interval in seconds
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    /// Set snapshot directory
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Set snapshot file prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set handoff queue depth
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth;
        self
    }

    /// Set overflow policy
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Enable or disable fsync
    pub fn with_fsync(mut self, fsync: bool) -> Self {
        self.fsync = fsync;
        self
    }

    /// Snapshot cadence as a `Duration`
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        if self.file_prefix.is_empty() {
            return Err(ConfigError::InvalidPrefix(self.file_prefix.clone()));
        }
        if self.file_prefix.contains(&['/', '\\'][..]) || self.file_prefix.starts_with('.') {
            return Err(ConfigError::InvalidPrefix(self.file_prefix.clone()));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Snapshot interval must be at least one second
    #[error("Snapshot interval must be at least one second")]
    ZeroInterval,

    /// Snapshot queue must hold at least one mapping
    #[error("Snapshot queue depth must be at least 1")]
    ZeroQueueDepth,

    /// Prefix is empty, hidden, or contains a path separator
    #[error("Invalid snapshot file prefix: {0:?}")]
    InvalidPrefix(String),
}
