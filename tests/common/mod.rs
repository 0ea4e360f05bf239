//! Shared test utilities for integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use snapkv::{list_snapshots, KvService, StoreConfig};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prefix used by every snapshot in these tests
pub const PREFIX: &str = "snapkv";

/// A snapshot directory that outlives individual service instances
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        TestStore {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Config that never ticks during a test; snapshots come from shutdown
    /// or explicit requests
    pub fn config(&self) -> StoreConfig {
        StoreConfig::for_testing(self.dir.path()).with_interval_secs(3600)
    }

    pub async fn open(&self) -> KvService {
        KvService::open(self.config()).await.unwrap()
    }

    pub fn snapshots(&self) -> Vec<(u64, PathBuf)> {
        list_snapshots(self.dir.path(), PREFIX).unwrap()
    }
}
