//! Crash-safe snapshot writer
//!
//! Uses the write-fsync-rename pattern:
//! 1. Write to temporary file (`.<prefix>-<ts>.json.tmp`)
//! 2. fsync the temporary file
//! 3. Atomic rename to final path (`<prefix>-<ts>.json`)
//! 4. fsync the parent directory
//!
//! Either the complete snapshot exists under its final name or it doesn't.
//! Steps 2 and 4 are skipped when fsync is disabled. A failed directory
//! sync after the rename is logged and the write still counts: the file is
//! already in place, and callers must rotate around it.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::PersistError;
use crate::format::snapshot::{snapshot_path, temp_snapshot_path};

/// Snapshot writer
#[derive(Clone)]
pub struct SnapshotWriter {
    snapshot_dir: PathBuf,
    prefix: String,
    fsync: bool,
    sync_dir: fn(&Path) -> io::Result<()>,
}

impl fmt::Debug for SnapshotWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotWriter")
            .field("snapshot_dir", &self.snapshot_dir)
            .field("prefix", &self.prefix)
            .field("fsync", &self.fsync)
            .finish()
    }
}

impl SnapshotWriter {
    /// Create a new snapshot writer
    ///
    /// The directory is created on first write if it doesn't exist.
    pub fn new(snapshot_dir: PathBuf, prefix: impl Into<String>, fsync: bool) -> Self {
        SnapshotWriter {
            snapshot_dir,
            prefix: prefix.into(),
            fsync,
            sync_dir: sync_directory,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_dir_sync(mut self, sync_dir: fn(&Path) -> io::Result<()>) -> Self {
        self.sync_dir = sync_dir;
        self
    }

    /// Get the snapshot directory
    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Write `bytes` as the snapshot taken at `timestamp`
    ///
    /// The file content is `bytes` followed by a newline. Returns the final
    /// path. An existing snapshot with the same timestamp is replaced.
    pub fn write(&self, timestamp: u64, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        let final_path = snapshot_path(&self.snapshot_dir, &self.prefix, timestamp);
        let temp_path = temp_snapshot_path(&self.snapshot_dir, &self.prefix, timestamp);

        fs::create_dir_all(&self.snapshot_dir).map_err(|source| PersistError::Io {
            path: self.snapshot_dir.clone(),
            source,
        })?;

        if let Err(source) = self.write_temp(&temp_path, bytes) {
            let _ = fs::remove_file(&temp_path);
            return Err(PersistError::Io {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(PersistError::Io {
                path: final_path,
                source,
            });
        }

        if self.fsync {
            if let Err(e) = (self.sync_dir)(&self.snapshot_dir) {
                warn!(target: "snapkv::persist", dir = %self.snapshot_dir.display(), path = %final_path.display(), error = %e, "Snapshot renamed but directory sync failed");
            }
        }

        Ok(final_path)
    }

    fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(temp_path)?;
        file.write_all(bytes)?;
        file.write_all(b"\n")?;
        file.flush()?;
        if self.fsync {
            file.sync_all()?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn sync_directory(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

// Directories cannot be opened for syncing on Windows.
#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_final_file_with_newline() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().to_path_buf(), "snapkv", true);

        let path = writer.write(1700000000, br#"{"k":"v"}"#).unwrap();
        assert_eq!(path, dir.path().join("snapkv-1700000000.json"));
        assert_eq!(fs::read(&path).unwrap(), b"{\"k\":\"v\"}\n");
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().to_path_buf(), "snapkv", false);
        writer.write(1, b"{}").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["snapkv-1.json".to_string()]);
    }

    #[test]
    fn test_write_same_timestamp_replaces() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().to_path_buf(), "snapkv", false);
        writer.write(7, br#"{"a":"1"}"#).unwrap();
        let path = writer.write(7, br#"{"a":"2"}"#).unwrap();

        assert_eq!(fs::read(path).unwrap(), b"{\"a\":\"2\"}\n");
    }

    #[test]
    fn test_write_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let writer = SnapshotWriter::new(nested.clone(), "snapkv", false);
        writer.write(3, b"{}").unwrap();
        assert!(nested.join("snapkv-3.json").exists());
    }

    #[test]
    fn test_directory_sync_failure_still_written() {
        let dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(dir.path().to_path_buf(), "snapkv", true)
            .with_dir_sync(|_| Err(io::Error::new(io::ErrorKind::Other, "sync failed")));

        let path = writer.write(5, br#"{"k":"v"}"#).unwrap();
        assert_eq!(path, dir.path().join("snapkv-5.json"));
        assert_eq!(fs::read(&path).unwrap(), b"{\"k\":\"v\"}\n");
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let writer = SnapshotWriter::new(blocker, "snapkv", false);
        let err = writer.write(1, b"{}").unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }
}
