//! Snapshot file lifecycle through the facade

use crate::common::TestStore;
use snapkv::{KeyValueMap, PersistenceConfig, PersistenceEngine};
use std::fs;

/// Test: Snapshot content is a plain JSON object of strings
#[tokio::test]
async fn test_snapshot_file_format() {
    let store = TestStore::new();

    let service = store.open().await;
    let handle = service.handle();
    handle.create("b", "2").await.unwrap();
    handle.create("a", "1").await.unwrap();
    service.shutdown().await.unwrap();

    let snapshots = store.snapshots();
    assert_eq!(snapshots.len(), 1);
    let content = fs::read_to_string(&snapshots[0].1).unwrap();
    assert_eq!(content, "{\"a\":\"1\",\"b\":\"2\"}\n");

    let parsed: KeyValueMap = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.len(), 2);
}

/// Test: Unchanged content across a restart writes no new file
#[tokio::test]
async fn test_unchanged_content_not_rewritten() {
    let store = TestStore::new();

    let service = store.open().await;
    service.handle().create("k", "v").await.unwrap();
    service.shutdown().await.unwrap();
    let first = store.snapshots();

    let service = store.open().await;
    service.handle().request_snapshot();
    let stats = service.shutdown().await.unwrap();
    assert_eq!(stats.written, 0);
    assert!(stats.unchanged >= 1);

    assert_eq!(store.snapshots(), first);
}

/// Test: Engine restore sees what the service wrote
#[tokio::test]
async fn test_engine_restore_matches_service_state() {
    let store = TestStore::new();

    let service = store.open().await;
    let handle = service.handle();
    handle.create("x", "1").await.unwrap();
    handle.create("y", "2").await.unwrap();
    service.shutdown().await.unwrap();

    let loaded = PersistenceEngine::new(PersistenceConfig::for_testing(store.path()))
        .restore()
        .unwrap();
    assert_eq!(loaded.map.get("x").map(String::as_str), Some("1"));
    assert_eq!(loaded.map.get("y").map(String::as_str), Some("2"));
}
