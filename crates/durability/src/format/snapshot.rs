//! Snapshot file naming
//!
//! Snapshots are named `<prefix>-<unix-seconds>.json`. The embedded
//! timestamp is the only ordering information: the latest snapshot is the
//! one with the numerically largest timestamp, so no manifest is needed.
//!
//! While being written a snapshot lives at `.<prefix>-<unix-seconds>.json.tmp`,
//! which never matches the naming convention.
//!
//! Concurrent writers could collide within the same second. This is
//! acceptable only because there is a single snapshot writer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Snapshot file extension
pub const SNAPSHOT_EXTENSION: &str = ".json";

/// Suffix appended to in-flight snapshot files
pub const TEMP_SUFFIX: &str = ".tmp";

/// File name for a snapshot taken at `timestamp`
pub fn snapshot_file_name(prefix: &str, timestamp: u64) -> String {
    format!("{}-{}{}", prefix, timestamp, SNAPSHOT_EXTENSION)
}

/// Path of a snapshot taken at `timestamp`
pub fn snapshot_path(dir: &Path, prefix: &str, timestamp: u64) -> PathBuf {
    dir.join(snapshot_file_name(prefix, timestamp))
}

/// Path of the temporary file used while writing a snapshot
pub fn temp_snapshot_path(dir: &Path, prefix: &str, timestamp: u64) -> PathBuf {
    dir.join(format!(
        ".{}{}",
        snapshot_file_name(prefix, timestamp),
        TEMP_SUFFIX
    ))
}

/// Parse the timestamp embedded in a snapshot file name
///
/// Returns None if the name doesn't match `<prefix>-<digits>.json` exactly.
pub fn parse_snapshot_timestamp(prefix: &str, file_name: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(SNAPSHOT_EXTENSION)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether `file_name` is a leftover temporary snapshot file
pub fn is_temp_file_name(prefix: &str, file_name: &str) -> bool {
    file_name
        .strip_prefix('.')
        .and_then(|rest| rest.strip_suffix(TEMP_SUFFIX))
        .and_then(|name| parse_snapshot_timestamp(prefix, name))
        .is_some()
}

/// Iterate `(timestamp, path)` for snapshot files in scan order
fn scan(dir: &Path, prefix: &str) -> io::Result<Vec<(u64, PathBuf)>> {
    let mut found = Vec::new();

    if !dir.exists() {
        return Ok(found);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if let Some(timestamp) = parse_snapshot_timestamp(prefix, &file_name) {
            found.push((timestamp, entry.path()));
        }
    }

    Ok(found)
}

/// List all snapshot files in a directory, sorted by timestamp
///
/// A missing directory yields an empty list.
pub fn list_snapshots(dir: &Path, prefix: &str) -> io::Result<Vec<(u64, PathBuf)>> {
    let mut snapshots = scan(dir, prefix)?;
    snapshots.sort_by_key(|(timestamp, _)| *timestamp);
    Ok(snapshots)
}

/// Find the snapshot with the largest embedded timestamp
///
/// Ties keep the first maximum encountered in directory scan order.
pub fn find_latest_snapshot(dir: &Path, prefix: &str) -> io::Result<Option<(u64, PathBuf)>> {
    let mut latest: Option<(u64, PathBuf)> = None;
    for (timestamp, path) in scan(dir, prefix)? {
        match &latest {
            Some((best, _)) if timestamp <= *best => {}
            _ => latest = Some((timestamp, path)),
        }
    }
    Ok(latest)
}
