//! Operation protocol
//!
//! Every request to the store actor is an [`Operation`] built together with
//! its [`PendingReply`]. The operation travels to the actor through the
//! inbound queue; the pending reply stays with the submitter.
//!
//! # Reply discipline
//!
//! - Exactly one acknowledgement path per operation (boolean success)
//! - Exactly one data path for GET, fired before the acknowledgement and
//!   only when the key is present
//! - Each path is fired at most once by the actor and consumed once by
//!   the submitter; there is no batching or pipelining
//!
//! # Cancellation
//!
//! Each operation carries a [`CancellationToken`] shared with its pending
//! reply. The token is cancelled when the submitter stops waiting (the
//! `wait` future is dropped) or cancels explicitly. The actor checks the
//! token on dequeue and discards cancelled operations unapplied.

use crate::error::{Error, Result};
use crate::types::KeyValueMap;
use std::fmt;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// The three operation kinds, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Insert or overwrite a key
    Create,
    /// Exact-key lookup
    Get,
    /// Replace the mapping with an empty one
    DeleteAll,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationType::Create => "CREATE",
            OperationType::Get => "GET",
            OperationType::DeleteAll => "DELETE_ALL",
        };
        f.write_str(name)
    }
}

/// Operation payload as seen by the actor
#[derive(Debug)]
pub enum OperationKind {
    /// Insert or overwrite `key -> value`
    Create {
        /// Key to write
        key: String,
        /// Value to store
        value: String,
    },
    /// Look up `key`; on a hit the single-entry result goes to `data`
    Get {
        /// Key to look up
        key: String,
        /// Data reply path
        data: oneshot::Sender<KeyValueMap>,
    },
    /// Clear the mapping
    DeleteAll,
}

impl OperationKind {
    fn operation_type(&self) -> OperationType {
        match self {
            OperationKind::Create { .. } => OperationType::Create,
            OperationKind::Get { .. } => OperationType::Get,
            OperationKind::DeleteAll => OperationType::DeleteAll,
        }
    }
}

/// Acknowledgement reply path handed to the actor
#[derive(Debug)]
pub struct AckSender(oneshot::Sender<bool>);

impl AckSender {
    /// Deliver the acknowledgement
    ///
    /// Returns false if the submitter is no longer waiting. The reply is
    /// dropped in that case; nothing else happens.
    pub fn acknowledge(self, success: bool) -> bool {
        self.0.send(success).is_ok()
    }
}

/// A request message for the store actor
///
/// Created per request by the calling layer, consumed exactly once by the
/// actor, discarded after reply.
#[derive(Debug)]
pub struct Operation {
    kind: OperationKind,
    ack: oneshot::Sender<bool>,
    cancel: CancellationToken,
}

impl Operation {
    /// Build a CREATE operation
    pub fn create(key: impl Into<String>, value: impl Into<String>) -> (Self, PendingReply) {
        let kind = OperationKind::Create {
            key: key.into(),
            value: value.into(),
        };
        Self::build(kind, None)
    }

    /// Build a GET operation
    pub fn get(key: impl Into<String>) -> (Self, PendingReply) {
        let (data_tx, data_rx) = oneshot::channel();
        let kind = OperationKind::Get {
            key: key.into(),
            data: data_tx,
        };
        Self::build(kind, Some(data_rx))
    }

    /// Build a DELETE_ALL operation
    pub fn delete_all() -> (Self, PendingReply) {
        Self::build(OperationKind::DeleteAll, None)
    }

    fn build(
        kind: OperationKind,
        data: Option<oneshot::Receiver<KeyValueMap>>,
    ) -> (Self, PendingReply) {
        let (ack_tx, ack_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let pending = PendingReply {
            op: kind.operation_type(),
            ack: ack_rx,
            data,
            cancel: cancel.clone(),
        };
        let operation = Operation {
            kind,
            ack: ack_tx,
            cancel,
        };
        (operation, pending)
    }

    /// Kind of this operation
    pub fn operation_type(&self) -> OperationType {
        self.kind.operation_type()
    }

    /// Key carried by CREATE and GET
    pub fn key(&self) -> Option<&str> {
        match &self.kind {
            OperationKind::Create { key, .. } | OperationKind::Get { key, .. } => Some(key),
            OperationKind::DeleteAll => None,
        }
    }

    /// Whether the submitter has given up on this operation
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Split into payload and acknowledgement path for processing
    pub fn into_parts(self) -> (OperationKind, AckSender) {
        (self.kind, AckSender(self.ack))
    }
}

/// Outcome of a processed operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Acknowledgement value
    pub success: bool,
    /// Single-entry result; only present for a successful GET
    pub data: Option<KeyValueMap>,
}

/// Submitter's half of an operation's reply paths
#[derive(Debug)]
pub struct PendingReply {
    op: OperationType,
    ack: oneshot::Receiver<bool>,
    data: Option<oneshot::Receiver<KeyValueMap>>,
    cancel: CancellationToken,
}

impl PendingReply {
    /// Kind of the operation this reply belongs to
    pub fn operation_type(&self) -> OperationType {
        self.op
    }

    /// Token shared with the operation
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the operation
    ///
    /// If the actor has not dequeued it yet, it will be discarded unapplied.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the actor's reply
    ///
    /// Dropping the returned future before it completes cancels the
    /// operation.
    pub async fn wait(self) -> Result<Reply> {
        let PendingReply {
            op,
            ack,
            data,
            cancel,
        } = self;
        let guard = cancel.clone().drop_guard();
        let outcome = receive(op, ack, data, &cancel).await;
        guard.disarm();
        outcome
    }
}

async fn receive(
    op: OperationType,
    ack: oneshot::Receiver<bool>,
    data: Option<oneshot::Receiver<KeyValueMap>>,
    cancel: &CancellationToken,
) -> Result<Reply> {
    let success = match ack.await {
        Ok(success) => success,
        Err(_) if cancel.is_cancelled() => return Err(Error::Cancelled(op)),
        Err(_) => return Err(Error::ReplyDropped(op)),
    };

    let data = match (success, data) {
        (true, Some(rx)) => Some(rx.await.map_err(|_| Error::ReplyDropped(op))?),
        _ => None,
    };

    Ok(Reply { success, data })
}
