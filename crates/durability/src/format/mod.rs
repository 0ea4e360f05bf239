//! On-disk formats
//!
//! - `snapshot`: snapshot file naming, discovery and latest-by-timestamp
//!   selection

pub mod snapshot;

pub use snapshot::{
    find_latest_snapshot, is_temp_file_name, list_snapshots, parse_snapshot_timestamp,
    snapshot_file_name, snapshot_path, temp_snapshot_path, SNAPSHOT_EXTENSION, TEMP_SUFFIX,
};
