//! Service lifecycle errors
//!
//! Operation-level failures use [`snapkv_core::Error`]; these cover
//! starting and stopping the service.

use crate::config::ConfigError;
use std::io;

/// Errors from opening or shutting down a [`KvService`](crate::KvService)
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The snapshot writer thread could not be spawned
    #[error("Cannot start snapshot writer: {0}")]
    Io(#[from] io::Error),

    /// The actor task panicked or was aborted
    #[error("Store actor task failed: {0}")]
    TaskFailed(String),

    /// The snapshot writer thread panicked
    #[error("Snapshot writer thread panicked")]
    WriterPanicked,
}
