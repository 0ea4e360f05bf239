//! Restart recovery through the facade

use crate::common::TestStore;
use snapkv::{single_entry, RestoreStatus};
use std::fs;

/// Test: State written before shutdown is visible after reopen
#[tokio::test]
async fn test_state_survives_restart() {
    let store = TestStore::new();

    let service = store.open().await;
    let handle = service.handle();
    for i in 0..50 {
        handle.create(format!("key{}", i), format!("value{}", i)).await.unwrap();
    }
    service.shutdown().await.unwrap();

    let service = store.open().await;
    let handle = service.handle();
    for i in 0..50 {
        let expected = single_entry(format!("key{}", i), format!("value{}", i));
        assert_eq!(handle.get(format!("key{}", i)).await.unwrap(), Some(expected));
    }
    service.shutdown().await.unwrap();
}

/// Test: DELETE_ALL before shutdown restores to empty
#[tokio::test]
async fn test_cleared_store_restores_empty() {
    let store = TestStore::new();

    let service = store.open().await;
    let handle = service.handle();
    handle.create("gone", "soon").await.unwrap();
    handle.request_snapshot();
    handle.delete_all().await.unwrap();
    service.shutdown().await.unwrap();

    let service = store.open().await;
    match service.restore_status() {
        RestoreStatus::Restored { entries, .. } => assert_eq!(*entries, 0),
        other => panic!("unexpected restore status {:?}", other),
    }
    assert_eq!(service.handle().get("gone").await.unwrap(), None);
    service.shutdown().await.unwrap();
}

/// Test: Several restarts each restore the previous generation
#[tokio::test]
async fn test_repeated_restarts() {
    let store = TestStore::new();

    for generation in 0..3 {
        let service = store.open().await;
        let handle = service.handle();
        if generation > 0 {
            let previous = format!("gen{}", generation - 1);
            assert_eq!(
                handle.get(previous.clone()).await.unwrap(),
                Some(single_entry(previous, "done"))
            );
        }
        handle.create(format!("gen{}", generation), "done").await.unwrap();
        service.shutdown().await.unwrap();
    }

    assert_eq!(store.snapshots().len(), 1);
}

/// Test: Unrelated files in the snapshot directory are ignored
#[tokio::test]
async fn test_foreign_files_ignored() {
    let store = TestStore::new();
    fs::write(store.path().join("notes.txt"), b"hello").unwrap();
    fs::write(store.path().join("other-1700000000.json"), b"{\"x\":\"y\"}\n").unwrap();

    let service = store.open().await;
    assert_eq!(service.restore_status(), &RestoreStatus::NotFound);
    service.handle().create("k", "v").await.unwrap();
    service.shutdown().await.unwrap();

    assert!(store.path().join("notes.txt").exists());
    assert!(store.path().join("other-1700000000.json").exists());
    assert_eq!(store.snapshots().len(), 1);
}
