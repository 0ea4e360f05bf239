//! Snapshot file I/O
//!
//! - `writer`: crash-safe write (temp file, sync, rename, sync directory)
//! - `reader`: load the latest snapshot for restore

pub mod reader;
pub mod writer;

pub use reader::{LoadedSnapshot, SnapshotReader};
pub use writer::SnapshotWriter;
