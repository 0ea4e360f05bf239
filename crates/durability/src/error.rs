//! Persistence error types
//!
//! Write-side failures are absorbed by the engine (logged, cycle skipped).
//! Restore-side failures are surfaced so the caller can fall back to an
//! empty mapping.

use std::io;
use std::path::PathBuf;

/// Errors from a single persist cycle
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The mapping could not be encoded
    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Opening, writing, syncing or renaming the snapshot failed
    #[error("Snapshot write to {path} failed: {source}")]
    Io {
        /// File or directory being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Errors from restoring the latest snapshot
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    /// No file matching the naming convention exists
    #[error("No snapshot found in {dir}")]
    NotFound {
        /// Directory that was scanned
        dir: PathBuf,
    },

    /// The latest snapshot could not be read or parsed
    #[error("Snapshot {path} is corrupt: {reason}")]
    Corrupt {
        /// Snapshot file
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// The snapshot directory could not be scanned
    #[error("Cannot scan snapshot directory {path}: {source}")]
    Io {
        /// Directory that was scanned
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl RestoreError {
    /// Whether this is the "no snapshot exists" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, RestoreError::NotFound { .. })
    }
}
