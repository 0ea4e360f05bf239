//! Store configuration

use snapkv_durability::PersistenceConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Default depth of the actor's inbound operation queue
pub const DEFAULT_OPERATION_QUEUE_DEPTH: usize = 100;

/// Store configuration
///
/// Combines persistence settings with the actor's own queue and the
/// optional request timeout applied by [`StoreHandle`](crate::StoreHandle).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Snapshot settings
    pub persistence: PersistenceConfig,
    /// Bound of the inbound operation queue
    pub operation_queue_depth: usize,
    /// How long a submitter waits for its acknowledgement; None waits forever
    pub request_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            persistence: PersistenceConfig::default(),
            operation_queue_depth: DEFAULT_OPERATION_QUEUE_DEPTH,
            request_timeout: None,
        }
    }
}

impl StoreConfig {
    /// Create config for testing, with snapshots in `dir`
    pub fn for_testing(dir: impl Into<PathBuf>) -> Self {
        StoreConfig {
            persistence: PersistenceConfig::for_testing(dir),
            ..Default::default()
        }
    }

    /// Set persistence configuration
    pub fn with_persistence(mut self, persistence: PersistenceConfig) -> Self {
        self.persistence = persistence;
        self
    }

    /// Set snapshot interval in seconds
    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.persistence.interval_secs = secs;
        self
    }

    /// Set operation queue depth
    pub fn with_operation_queue_depth(mut self, depth: usize) -> Self {
        self.operation_queue_depth = depth;
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.persistence.validate()?;
        if self.operation_queue_depth == 0 {
            return Err(ConfigError::ZeroOperationQueue);
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid persistence configuration
    #[error("Invalid persistence config: {0}")]
    Persistence(#[from] snapkv_durability::ConfigError),

    /// Operation queue must hold at least one operation
    #[error("Operation queue depth must be at least 1")]
    ZeroOperationQueue,

    /// A zero timeout would fail every request
    #[error("Request timeout must be non-zero")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.operation_queue_depth, 100);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.persistence.interval_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = StoreConfig::for_testing("/tmp/snapkv-test")
            .with_interval_secs(2)
            .with_operation_queue_depth(8)
            .with_request_timeout(Duration::from_millis(500));

        assert_eq!(config.persistence.interval_secs, 2);
        assert_eq!(config.persistence.snapshot_dir, PathBuf::from("/tmp/snapkv-test"));
        assert_eq!(config.operation_queue_depth, 8);
        assert_eq!(config.request_timeout, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_validate_invalid_config() {
        let config = StoreConfig::default().with_operation_queue_depth(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroOperationQueue));

        let config = StoreConfig::default().with_request_timeout(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));

        let config = StoreConfig::default().with_interval_secs(0);
        assert!(matches!(config.validate(), Err(ConfigError::Persistence(_))));
    }
}
