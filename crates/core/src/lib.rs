//! Core types for snapkv
//!
//! This crate defines the foundational types shared by the store actor,
//! the persistence engine and the request layer:
//! - KeyValueMap: the mapping that is the sole unit of durable state
//! - Operation: request message with its acknowledgement and data reply slots
//! - PendingReply: the submitter's half of an operation's reply paths
//! - Error: error type for operation submission

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod protocol;
pub mod types;

pub use error::{Error, Result};
pub use protocol::{AckSender, Operation, OperationKind, OperationType, PendingReply, Reply};
pub use types::{single_entry, KeyValueMap};
