//! Durability layer for snapkv
//!
//! This crate handles everything that touches disk:
//!
//! - Snapshot naming: `<prefix>-<unix-seconds>.json`, latest by timestamp
//! - Canonical JSON encoding and FNV-1a content hashing
//! - Crash-safe snapshot writes and single-file rotation
//! - Restore of the latest snapshot at startup
//! - The snapshot writer thread, its bounded queue and the tick source

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod disk_snapshot;
pub mod encoding;
pub mod engine;
pub mod error;
pub mod format;
pub mod hash;
pub mod retention;
pub mod worker;

pub use config::{ConfigError, OverflowPolicy, PersistenceConfig};
pub use disk_snapshot::{LoadedSnapshot, SnapshotReader, SnapshotWriter};
pub use encoding::{decode_map, encode_map};
pub use engine::{PersistOutcome, PersistStats, PersistenceEngine, SnapshotInfo, StatsHandle};
pub use error::{PersistError, RestoreError};
pub use format::{find_latest_snapshot, list_snapshots, parse_snapshot_timestamp, snapshot_file_name};
pub use hash::fnv1a_32;
pub use retention::{rotate, RotationReport};
pub use worker::{
    HandoffOutcome, PersistencePipeline, PersistenceWorker, SnapshotQueue, SnapshotTicker,
};
