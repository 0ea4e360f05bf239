//! snapkv - in-memory key-value store with periodic snapshots
//!
//! A single actor owns the key-value mapping and serializes every read and
//! write. On a timer, the actor hands a copy of the mapping to a dedicated
//! writer thread, which skips unchanged content, writes a crash-safe
//! snapshot file, and removes the one it supersedes. At startup the newest
//! snapshot is restored.
//!
//! # Quick Start
//!
//! ```ignore
//! use snapkv::{KvService, StoreConfig};
//!
//! let service = KvService::open(StoreConfig::default()).await?;
//! let store = service.handle();
//!
//! store.create("user:123", "Alice").await?;
//! let entry = store.get("user:123").await?;
//!
//! // Final snapshot, then the writer exits
//! service.shutdown().await?;
//! ```
//!
//! # Layers
//!
//! - `snapkv-core`: mapping type, operation protocol, operation errors
//! - `snapkv-durability`: snapshot files, hashing, rotation, restore, writer
//! - `snapkv-engine`: actor, handle, service lifecycle

pub use snapkv_core::{single_entry, Error, KeyValueMap, Operation, OperationType, Reply, Result};
pub use snapkv_durability::{
    find_latest_snapshot, list_snapshots, OverflowPolicy, PersistStats, PersistenceConfig,
    PersistenceEngine, RestoreError,
};
pub use snapkv_engine::{KvService, RestoreStatus, ServiceError, StoreConfig, StoreHandle};
