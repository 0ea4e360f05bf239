//! Snapshot reader for restore
//!
//! Locates the latest snapshot by embedded timestamp and decodes it.

use std::fs;
use std::path::{Path, PathBuf};

use snapkv_core::KeyValueMap;

use crate::encoding::decode_map;
use crate::error::RestoreError;
use crate::format::snapshot::find_latest_snapshot;

/// A snapshot loaded from disk
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    /// Timestamp embedded in the file name
    pub timestamp: u64,
    /// File the snapshot was read from
    pub path: PathBuf,
    /// Restored mapping
    pub map: KeyValueMap,
}

/// Snapshot reader
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    snapshot_dir: PathBuf,
    prefix: String,
}

impl SnapshotReader {
    /// Create a new snapshot reader
    pub fn new(snapshot_dir: PathBuf, prefix: impl Into<String>) -> Self {
        SnapshotReader {
            snapshot_dir,
            prefix: prefix.into(),
        }
    }

    /// Load the snapshot with the largest embedded timestamp
    ///
    /// # Errors
    ///
    /// - `NotFound`: no file matches the naming convention
    /// - `Corrupt`: the latest file can't be read or isn't a string map
    /// - `Io`: the directory can't be scanned
    pub fn load_latest(&self) -> Result<LoadedSnapshot, RestoreError> {
        let latest = find_latest_snapshot(&self.snapshot_dir, &self.prefix).map_err(|source| {
            RestoreError::Io {
                path: self.snapshot_dir.clone(),
                source,
            }
        })?;

        let (timestamp, path) = latest.ok_or_else(|| RestoreError::NotFound {
            dir: self.snapshot_dir.clone(),
        })?;

        let map = read_snapshot_file(&path)?;
        Ok(LoadedSnapshot {
            timestamp,
            path,
            map,
        })
    }
}

/// Read and decode a single snapshot file
pub fn read_snapshot_file(path: &Path) -> Result<KeyValueMap, RestoreError> {
    let bytes = fs::read(path).map_err(|e| RestoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    decode_map(&bytes).map_err(|e| RestoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_latest_picks_largest_timestamp() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("snapkv-10.json"), br#"{"old":"1"}"#).unwrap();
        fs::write(dir.path().join("snapkv-20.json"), b"{\"new\":\"2\"}\n").unwrap();

        let reader = SnapshotReader::new(dir.path().to_path_buf(), "snapkv");
        let loaded = reader.load_latest().unwrap();
        assert_eq!(loaded.timestamp, 20);
        assert_eq!(loaded.map.len(), 1);
        assert_eq!(loaded.map.get("new").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_load_latest_not_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("unrelated.json"), b"{}").unwrap();

        let reader = SnapshotReader::new(dir.path().to_path_buf(), "snapkv");
        assert!(matches!(reader.load_latest(), Err(RestoreError::NotFound { .. })));
    }

    #[test]
    fn test_load_latest_corrupt_does_not_fall_back() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("snapkv-1.json"), br#"{"ok":"1"}"#).unwrap();
        fs::write(dir.path().join("snapkv-2.json"), b"{\"truncated\":").unwrap();

        let reader = SnapshotReader::new(dir.path().to_path_buf(), "snapkv");
        match reader.load_latest() {
            Err(RestoreError::Corrupt { path, .. }) => {
                assert_eq!(path, dir.path().join("snapkv-2.json"));
            }
            other => panic!("expected Corrupt, got {:?}", other),
        }
    }
}
