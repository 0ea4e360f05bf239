//! Snapshot rotation
//!
//! Retains exactly one live snapshot: after a successful write every other
//! file matching the naming convention is deleted, along with temporary
//! files left behind by interrupted writes.
//!
//! # Failure handling
//!
//! - An unreadable directory aborts the rotation (logged, nothing deleted)
//! - A failed deletion is logged and the scan continues

use std::fs;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

use crate::format::snapshot::{is_temp_file_name, parse_snapshot_timestamp};

/// Outcome of one rotation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationReport {
    /// Files deleted
    pub deleted: usize,
    /// Files whose deletion failed
    pub failed: usize,
}

/// Delete every snapshot in `dir` except `keep`
///
/// `keep` is matched by file name, so it may be given as a full path.
pub fn rotate(dir: &Path, prefix: &str, keep: &Path) -> RotationReport {
    rotate_with(dir, prefix, keep, |path| fs::remove_file(path))
}

/// [`rotate`] with a caller-supplied removal step
pub(crate) fn rotate_with<F>(dir: &Path, prefix: &str, keep: &Path, mut remove: F) -> RotationReport
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let mut report = RotationReport::default();
    let keep_name = keep.file_name();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(target: "snapkv::persist", dir = %dir.display(), error = %e, "Cannot read snapshot directory, rotation skipped");
            return report;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(target: "snapkv::persist", dir = %dir.display(), error = %e, "Cannot read directory entry");
                continue;
            }
        };
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
            continue;
        }

        let file_name = entry.file_name();
        if Some(file_name.as_os_str()) == keep_name {
            continue;
        }
        let name = file_name.to_string_lossy();
        if parse_snapshot_timestamp(prefix, &name).is_none() && !is_temp_file_name(prefix, &name) {
            continue;
        }

        let path = entry.path();
        match remove(&path) {
            Ok(()) => {
                info!(target: "snapkv::persist", path = %path.display(), "Deleted superseded snapshot");
                report.deleted += 1;
            }
            Err(e) => {
                error!(target: "snapkv::persist", path = %path.display(), error = %e, "Cannot delete superseded snapshot");
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_rotate_keeps_only_named_snapshot() {
        let dir = TempDir::new().unwrap();
        for name in ["snapkv-1.json", "snapkv-2.json", "snapkv-3.json", ".snapkv-4.json.tmp"] {
            fs::write(dir.path().join(name), b"{}").unwrap();
        }

        let report = rotate(dir.path(), "snapkv", &dir.path().join("snapkv-3.json"));
        assert_eq!(report, RotationReport { deleted: 3, failed: 0 });
        assert_eq!(names(dir.path()), vec!["snapkv-3.json"]);
    }

    #[test]
    fn test_rotate_ignores_foreign_files() {
        let dir = TempDir::new().unwrap();
        for name in ["snapkv-1.json", "other-1.json", "snapkv-notes.json", "snapkv-2.txt"] {
            fs::write(dir.path().join(name), b"{}").unwrap();
        }
        fs::create_dir(dir.path().join("snapkv-9.json")).unwrap();

        let report = rotate(dir.path(), "snapkv", Path::new("snapkv-1.json"));
        assert_eq!(report.deleted, 0);
        assert_eq!(
            names(dir.path()),
            vec!["other-1.json", "snapkv-1.json", "snapkv-2.txt", "snapkv-9.json", "snapkv-notes.json"]
        );
    }

    #[test]
    fn test_rotate_continues_past_failed_deletions() {
        let dir = TempDir::new().unwrap();
        for name in ["snapkv-1.json", "snapkv-2.json", "snapkv-3.json", ".snapkv-4.json.tmp", "snapkv-5.json"] {
            fs::write(dir.path().join(name), b"{}").unwrap();
        }

        let mut attempted = Vec::new();
        let report = rotate_with(dir.path(), "snapkv", Path::new("snapkv-5.json"), |path| {
            attempted.push(path.file_name().unwrap().to_string_lossy().to_string());
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        });

        assert_eq!(report, RotationReport { deleted: 0, failed: 4 });
        attempted.sort();
        assert_eq!(attempted, vec![".snapkv-4.json.tmp", "snapkv-1.json", "snapkv-2.json", "snapkv-3.json"]);
        assert_eq!(names(dir.path()).len(), 5);
    }

    #[test]
    fn test_rotate_mixed_failures() {
        let dir = TempDir::new().unwrap();
        for name in ["snapkv-1.json", "snapkv-2.json", "snapkv-3.json"] {
            fs::write(dir.path().join(name), b"{}").unwrap();
        }

        let report = rotate_with(dir.path(), "snapkv", Path::new("snapkv-3.json"), |path| {
            if path.ends_with("snapkv-1.json") {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
            } else {
                fs::remove_file(path)
            }
        });

        assert_eq!(report, RotationReport { deleted: 1, failed: 1 });
        assert_eq!(names(dir.path()), vec!["snapkv-1.json", "snapkv-3.json"]);
    }

    #[test]
    fn test_rotate_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let report = rotate(&dir.path().join("gone"), "snapkv", Path::new("snapkv-1.json"));
        assert_eq!(report, RotationReport::default());
    }
}
