//! Store engine for snapkv
//!
//! This crate wires the layers together:
//! - StoreActor: the single owner of the key-value mapping
//! - StoreHandle: the submit side of the operation protocol
//! - KvService: startup restore, persistence worker, actor lifecycle
//!
//! The mapping is never shared. Callers only ever talk to the actor
//! through its operation queue, and the persistence worker only ever sees
//! copies handed over on timer ticks.

#![warn(clippy::all)]

pub mod actor;
pub mod config;
pub mod error;
pub mod handle;
pub mod service;

pub use actor::{ActorTask, StoreActor};
pub use config::{ConfigError, StoreConfig, DEFAULT_OPERATION_QUEUE_DEPTH};
pub use error::ServiceError;
pub use handle::StoreHandle;
pub use service::{KvService, RestoreStatus};
