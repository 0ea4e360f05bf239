//! Cross-crate integration tests.
//!
//! These exercise the full lifecycle (open → write → shutdown → reopen)
//! through the public facade.

#[path = "../common/mod.rs"]
mod common;

mod restart_recovery;
mod snapshot_lifecycle;
