//! Store actor
//!
//! The actor is the sole owner of the key-value mapping. It runs as one
//! tokio task and multiplexes four event sources:
//!
//! - the inbound operation queue
//! - the snapshot ticker
//! - explicit snapshot requests from a [`StoreHandle`]
//! - the shutdown token
//!
//! Events are handled strictly one at a time, so every operation is applied
//! atomically with respect to the others and to snapshot handoffs. A
//! snapshot handoff is a full copy of the mapping; the writer thread never
//! sees the live map.
//!
//! On shutdown the inbound queue is closed, operations already buffered are
//! drained and applied, and a final snapshot is handed to the writer.

use crate::config::StoreConfig;
use crate::error::ServiceError;
use crate::handle::StoreHandle;
use snapkv_core::{single_entry, KeyValueMap, Operation, OperationKind};
use snapkv_durability::{HandoffOutcome, SnapshotQueue, SnapshotTicker};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

/// Owner of the mapping
pub struct StoreActor {
    map: KeyValueMap,
    operations: mpsc::Receiver<Operation>,
    snapshot_requests: Arc<Notify>,
    shutdown: CancellationToken,
    ticker: SnapshotTicker,
    queue: SnapshotQueue,
}

impl StoreActor {
    /// Spawn the actor on the current runtime
    ///
    /// `initial` becomes the mapping (usually the restored snapshot). The
    /// ticker and queue come from the persistence pipeline.
    pub fn spawn(
        initial: KeyValueMap,
        ticker: SnapshotTicker,
        queue: SnapshotQueue,
        config: &StoreConfig,
    ) -> (StoreHandle, ActorTask) {
        let (tx, rx) = mpsc::channel(config.operation_queue_depth.max(1));
        let snapshot_requests = Arc::new(Notify::new());
        let shutdown = CancellationToken::new();

        let actor = StoreActor {
            map: initial,
            operations: rx,
            snapshot_requests: Arc::clone(&snapshot_requests),
            shutdown: shutdown.clone(),
            ticker,
            queue,
        };

        let handle = StoreHandle::new(tx, snapshot_requests, config.request_timeout);
        let join = tokio::spawn(actor.run());
        (handle, ActorTask { join, shutdown })
    }

    /// Event loop; returns the final mapping
    pub async fn run(mut self) -> KeyValueMap {
        info!(
            target: "snapkv::store",
            entries = self.map.len(),
            interval_secs = self.ticker.period().as_secs(),
            "Store actor started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!(target: "snapkv::store", "Shutdown requested");
                    break;
                }
                received = self.operations.recv() => match received {
                    Some(operation) => self.apply(operation),
                    None => {
                        debug!(target: "snapkv::store", "All handles dropped");
                        break;
                    }
                },
                _ = self.ticker.tick() => self.hand_off("tick").await,
                _ = self.snapshot_requests.notified() => self.hand_off("request").await,
            }
        }

        self.operations.close();
        let mut drained = 0usize;
        while let Some(operation) = self.operations.recv().await {
            self.apply(operation);
            drained += 1;
        }

        match self.queue.send(self.map.clone()).await {
            HandoffOutcome::Enqueued => {
                debug!(target: "snapkv::store", entries = self.map.len(), "Final snapshot handed off")
            }
            _ => warn!(target: "snapkv::store", "Snapshot writer stopped before final snapshot"),
        }

        info!(
            target: "snapkv::store",
            entries = self.map.len(),
            drained,
            "Store actor stopped"
        );
        self.map
    }

    fn apply(&mut self, operation: Operation) {
        let op = operation.operation_type();
        if operation.is_cancelled() {
            debug!(target: "snapkv::store", %op, key = ?operation.key(), "Discarding cancelled operation");
            return;
        }

        let (kind, ack) = operation.into_parts();
        let success = match kind {
            OperationKind::Create { key, value } => {
                trace!(target: "snapkv::store", %op, key = %key, "Applying");
                self.map.insert(key, value);
                true
            }
            OperationKind::Get { key, data } => match self.map.get(&key) {
                Some(value) => {
                    let entry = single_entry(key.as_str(), value.as_str());
                    if data.send(entry).is_err() {
                        debug!(target: "snapkv::store", %op, key = %key, "Data reply not delivered");
                    }
                    true
                }
                None => {
                    trace!(target: "snapkv::store", %op, key = %key, "Key not found");
                    false
                }
            },
            OperationKind::DeleteAll => {
                trace!(target: "snapkv::store", %op, removed = self.map.len(), "Applying");
                self.map = KeyValueMap::new();
                true
            }
        };

        if !ack.acknowledge(success) {
            debug!(target: "snapkv::store", %op, success, "Acknowledgement not delivered");
        }
    }

    async fn hand_off(&self, trigger: &'static str) {
        debug!(target: "snapkv::store", trigger, entries = self.map.len(), "Handing off snapshot");
        match self.queue.offer(self.map.clone()).await {
            HandoffOutcome::Enqueued => {}
            HandoffOutcome::SkippedFull => {
                warn!(target: "snapkv::store", trigger, "Snapshot queue full, skipping this snapshot")
            }
            HandoffOutcome::Closed => {
                warn!(target: "snapkv::store", trigger, "Snapshot writer stopped, skipping this snapshot")
            }
        }
    }
}

/// Join side of a spawned [`StoreActor`]
#[derive(Debug)]
pub struct ActorTask {
    join: JoinHandle<KeyValueMap>,
    shutdown: CancellationToken,
}

impl ActorTask {
    /// Signal shutdown and wait for the actor to finish
    ///
    /// Returns the final mapping.
    pub async fn stop(self) -> Result<KeyValueMap, ServiceError> {
        self.shutdown.cancel();
        self.join
            .await
            .map_err(|e| ServiceError::TaskFailed(e.to_string()))
    }

    /// Whether the actor has exited
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
