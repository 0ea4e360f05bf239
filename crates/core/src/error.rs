//! Error types for operation submission
//!
//! A lookup miss is not an error: it is a negative acknowledgement carried
//! by [`Reply`](crate::Reply). The variants below describe the ways a
//! submitter can fail to obtain any reply at all.

use crate::protocol::OperationType;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for submitting operations to the store actor
#[derive(Debug, Error)]
pub enum Error {
    /// The store actor is no longer accepting operations
    #[error("Store actor is not running")]
    StoreClosed,

    /// The store actor dropped a reply path without answering
    #[error("Store actor dropped the reply for a {0} operation")]
    ReplyDropped(OperationType),

    /// The operation was cancelled before the actor processed it
    #[error("{0} operation was cancelled")]
    Cancelled(OperationType),

    /// No acknowledgement arrived within the configured request timeout
    #[error("{op} operation timed out after {after:?}")]
    Timeout {
        /// Operation that timed out
        op: OperationType,
        /// Configured timeout
        after: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_store_closed() {
        let msg = Error::StoreClosed.to_string();
        assert!(msg.contains("not running"));
    }

    #[test]
    fn test_error_display_timeout() {
        let err = Error::Timeout {
            op: OperationType::Get,
            after: Duration::from_millis(250),
        };
        let msg = err.to_string();
        assert!(msg.contains("GET"));
        assert!(msg.contains("250ms"));
    }

    #[test]
    fn test_error_display_reply_dropped() {
        let msg = Error::ReplyDropped(OperationType::DeleteAll).to_string();
        assert!(msg.contains("DELETE_ALL"));
    }
}
