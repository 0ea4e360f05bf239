//! Persistence engine
//!
//! Owns the snapshot pipeline: serialize, hash-compare, write, rotate. It
//! also restores the latest snapshot at startup.
//!
//! # State
//!
//! - `last_hash`: hash of the last successfully written snapshot. Only the
//!   engine's own writer mutates it, so it needs no locking.
//! - `stats`: counters shared with observers through [`StatsHandle`].
//!
//! # Known gap
//!
//! The engine trusts `last_hash` without re-validating the on-disk file.
//! If the snapshot is modified or deleted externally, an unchanged mapping
//! will not be rewritten until it changes.

use parking_lot::Mutex;
use snapkv_core::KeyValueMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::PersistenceConfig;
use crate::disk_snapshot::{LoadedSnapshot, SnapshotReader, SnapshotWriter};
use crate::encoding::encode_map;
use crate::error::{PersistError, RestoreError};
use crate::hash::fnv1a_32;
use crate::retention::{self, RotationReport};

/// Information about a written snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Unix timestamp (seconds) embedded in the file name
    pub timestamp: u64,
    /// Final snapshot path
    pub path: PathBuf,
    /// FNV-1a hash of the serialized mapping
    pub hash: u32,
    /// Number of entries written
    pub entries: usize,
}

/// Result of a persist attempt that didn't fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// A new snapshot file was written and older ones rotated away
    Written(SnapshotInfo),
    /// Content matched the last written snapshot; nothing was touched
    Unchanged {
        /// Hash shared by the current mapping and the last snapshot
        hash: u32,
    },
}

/// Persist cycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistStats {
    /// Snapshots written
    pub written: u64,
    /// Cycles skipped because content was unchanged
    pub unchanged: u64,
    /// Cycles aborted by a serialization or I/O failure
    pub failed: u64,
    /// Superseded files removed by rotation
    pub deleted: u64,
}

/// Shared read access to an engine's counters
#[derive(Debug, Clone, Default)]
pub struct StatsHandle(Arc<Mutex<PersistStats>>);

impl StatsHandle {
    /// Current counter values
    pub fn snapshot(&self) -> PersistStats {
        *self.0.lock()
    }

    fn update(&self, f: impl FnOnce(&mut PersistStats)) {
        f(&mut self.0.lock());
    }
}

/// Snapshot pipeline and restore routine
#[derive(Debug)]
pub struct PersistenceEngine {
    pub(crate) config: PersistenceConfig,
    writer: SnapshotWriter,
    reader: SnapshotReader,
    last_hash: Option<u32>,
    stats: StatsHandle,
}

impl PersistenceEngine {
    /// Create an engine for `config`
    ///
    /// No file system access happens until the first persist or restore.
    pub fn new(config: PersistenceConfig) -> Self {
        let writer = SnapshotWriter::new(
            config.snapshot_dir.clone(),
            config.file_prefix.clone(),
            config.fsync,
        );
        let reader = SnapshotReader::new(config.snapshot_dir.clone(), config.file_prefix.clone());
        PersistenceEngine {
            config,
            writer,
            reader,
            last_hash: None,
            stats: StatsHandle::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    /// Hash of the last successfully written snapshot
    pub fn last_hash(&self) -> Option<u32> {
        self.last_hash
    }

    /// Set the retained hash
    pub fn with_last_hash(mut self, hash: u32) -> Self {
        self.last_hash = Some(hash);
        self
    }

    /// Seed the retained hash from a mapping already on disk
    ///
    /// Used after restore so an unchanged store does not rewrite an
    /// identical snapshot on the first tick.
    pub fn seed(&mut self, map: &KeyValueMap) {
        match encode_map(map) {
            Ok(bytes) => self.last_hash = Some(fnv1a_32(&bytes)),
            Err(e) => {
                warn!(target: "snapkv::persist", error = %e, "Cannot hash restored mapping, first tick will rewrite it");
            }
        }
    }

    /// Current counters
    pub fn stats(&self) -> PersistStats {
        self.stats.snapshot()
    }

    /// Handle for observing counters from other threads
    pub fn stats_handle(&self) -> StatsHandle {
        self.stats.clone()
    }

    /// Persist `map`, surfacing failures
    ///
    /// 1. Serialize to canonical JSON
    /// 2. Hash with FNV-1a
    /// 3. Skip if the hash equals the last written one
    /// 4. Write a new timestamped file, retain the hash, rotate
    pub fn try_persist(&mut self, map: &KeyValueMap) -> Result<PersistOutcome, PersistError> {
        let bytes = encode_map(map)?;
        let hash = fnv1a_32(&bytes);
        debug!(target: "snapkv::persist", current = hash, previous = ?self.last_hash, "Comparing snapshot hashes");

        if self.last_hash == Some(hash) {
            self.stats.update(|s| s.unchanged += 1);
            debug!(target: "snapkv::persist", hash, "Snapshot unchanged, write skipped");
            return Ok(PersistOutcome::Unchanged { hash });
        }

        let timestamp = unix_now();
        let path = self.writer.write(timestamp, &bytes)?;
        self.last_hash = Some(hash);
        self.stats.update(|s| s.written += 1);
        info!(target: "snapkv::persist", path = %path.display(), entries = map.len(), bytes = bytes.len() + 1, hash, "Snapshot persisted");

        self.rotate(&path);

        Ok(PersistOutcome::Written(SnapshotInfo {
            timestamp,
            path,
            hash,
            entries: map.len(),
        }))
    }

    /// Persist `map`, absorbing failures
    ///
    /// Returns the written snapshot, or None if the write was skipped or
    /// failed. Failures are logged and leave the retained hash unchanged;
    /// there is no retry before the next cycle.
    pub fn persist(&mut self, map: &KeyValueMap) -> Option<SnapshotInfo> {
        match self.try_persist(map) {
            Ok(PersistOutcome::Written(info)) => Some(info),
            Ok(PersistOutcome::Unchanged { .. }) => None,
            Err(e) => {
                self.stats.update(|s| s.failed += 1);
                error!(target: "snapkv::persist", error = %e, "Persist cycle aborted");
                None
            }
        }
    }

    /// Delete every snapshot except `keep`
    pub fn rotate(&mut self, keep: &Path) -> RotationReport {
        let report = retention::rotate(&self.config.snapshot_dir, &self.config.file_prefix, keep);
        self.stats.update(|s| s.deleted += report.deleted as u64);
        report
    }

    /// Load the most recent snapshot
    ///
    /// The caller is expected to fall back to an empty mapping on any error.
    pub fn restore(&self) -> Result<LoadedSnapshot, RestoreError> {
        match self.reader.load_latest() {
            Ok(loaded) => {
                info!(target: "snapkv::persist", path = %loaded.path.display(), entries = loaded.map.len(), "Snapshot restored");
                Ok(loaded)
            }
            Err(e @ RestoreError::NotFound { .. }) => {
                warn!(target: "snapkv::persist", dir = %self.config.snapshot_dir.display(), "No snapshot to restore");
                Err(e)
            }
            Err(e) => {
                error!(target: "snapkv::persist", error = %e, "Snapshot restore failed");
                Err(e)
            }
        }
    }
}

fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
