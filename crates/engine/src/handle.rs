//! Submit side of the store actor

use snapkv_core::{Error, KeyValueMap, Operation, PendingReply, Reply, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::debug;

/// Cloneable handle for submitting operations to a running store
///
/// Each call enqueues one operation and waits for its reply. Submitting
/// waits for room when the operation queue is full. With a request timeout
/// configured, a call that outlives it returns [`Error::Timeout`] and the
/// operation is cancelled; if the actor has not dequeued it yet it is never
/// applied.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    operations: mpsc::Sender<Operation>,
    snapshot_requests: Arc<Notify>,
    request_timeout: Option<Duration>,
}

impl StoreHandle {
    pub(crate) fn new(
        operations: mpsc::Sender<Operation>,
        snapshot_requests: Arc<Notify>,
        request_timeout: Option<Duration>,
    ) -> Self {
        StoreHandle {
            operations,
            snapshot_requests,
            request_timeout,
        }
    }

    /// Enqueue an operation built by the caller and wait for its reply
    pub async fn submit(&self, operation: Operation, pending: PendingReply) -> Result<Reply> {
        let op = pending.operation_type();
        let exchange = async {
            self.operations
                .send(operation)
                .await
                .map_err(|_| Error::StoreClosed)?;
            pending.wait().await
        };

        match self.request_timeout {
            Some(after) => match tokio::time::timeout(after, exchange).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    debug!(target: "snapkv::store", %op, ?after, "Request timed out");
                    Err(Error::Timeout { op, after })
                }
            },
            None => exchange.await,
        }
    }

    /// Insert or overwrite `key`
    ///
    /// Returns the acknowledgement, which is always true once applied.
    pub async fn create(&self, key: impl Into<String>, value: impl Into<String>) -> Result<bool> {
        let (operation, pending) = Operation::create(key, value);
        Ok(self.submit(operation, pending).await?.success)
    }

    /// Look up `key`
    ///
    /// A hit yields a mapping holding exactly that one entry.
    pub async fn get(&self, key: impl Into<String>) -> Result<Option<KeyValueMap>> {
        let (operation, pending) = Operation::get(key);
        let reply = self.submit(operation, pending).await?;
        Ok(reply.data.filter(|_| reply.success))
    }

    /// Remove every entry
    pub async fn delete_all(&self) -> Result<bool> {
        let (operation, pending) = Operation::delete_all();
        Ok(self.submit(operation, pending).await?.success)
    }

    /// Ask the actor to hand a snapshot to the writer now
    ///
    /// Does not wait for the write. Requests made while one is already
    /// pending are coalesced.
    pub fn request_snapshot(&self) {
        self.snapshot_requests.notify_one();
    }

    /// Whether the actor has stopped accepting operations
    pub fn is_closed(&self) -> bool {
        self.operations.is_closed()
    }
}
