//! Service lifecycle
//!
//! [`KvService::open`] performs startup in order:
//!
//! 1. Validate the configuration
//! 2. Restore the newest snapshot, falling back to an empty store
//! 3. Seed the dedup hash from the restored mapping
//! 4. Start the snapshot writer thread
//! 5. Spawn the store actor
//!
//! [`KvService::shutdown`] reverses it: the actor drains its queue and hands
//! off a final snapshot, then the writer thread finishes the queue and
//! exits.

use crate::actor::{ActorTask, StoreActor};
use crate::config::StoreConfig;
use crate::error::ServiceError;
use crate::handle::StoreHandle;
use snapkv_core::KeyValueMap;
use snapkv_durability::{
    PersistStats, PersistenceEngine, PersistencePipeline, PersistenceWorker, RestoreError,
    StatsHandle,
};
use std::path::PathBuf;
use tracing::{info, warn};

/// What startup found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreStatus {
    /// A snapshot was loaded
    Restored {
        /// File the mapping came from
        path: PathBuf,
        /// Number of entries restored
        entries: usize,
    },
    /// No snapshot existed; started empty
    NotFound,
    /// The newest snapshot could not be read; started empty
    Failed(String),
}

/// A running store: actor, handle, and snapshot writer
pub struct KvService {
    handle: StoreHandle,
    actor: ActorTask,
    worker: PersistenceWorker,
    stats: StatsHandle,
    restore_status: RestoreStatus,
}

impl KvService {
    /// Restore state and start the store
    ///
    /// Must be called within a tokio runtime.
    pub async fn open(config: StoreConfig) -> Result<Self, ServiceError> {
        config.validate()?;

        let mut engine = PersistenceEngine::new(config.persistence.clone());
        let (initial, restore_status) = match engine.restore() {
            Ok(loaded) => {
                engine.seed(&loaded.map);
                let status = RestoreStatus::Restored {
                    path: loaded.path,
                    entries: loaded.map.len(),
                };
                (loaded.map, status)
            }
            Err(RestoreError::NotFound { .. }) => (KeyValueMap::new(), RestoreStatus::NotFound),
            Err(e) => {
                warn!(target: "snapkv::store", error = %e, "Restore failed, starting with an empty store");
                (KeyValueMap::new(), RestoreStatus::Failed(e.to_string()))
            }
        };

        let PersistencePipeline {
            queue,
            ticker,
            worker,
            stats,
        } = engine.start()?;

        let (handle, actor) = StoreActor::spawn(initial, ticker, queue, &config);

        info!(
            target: "snapkv::store",
            snapshot_dir = %config.persistence.snapshot_dir.display(),
            interval_secs = config.persistence.interval_secs,
            "Store service started"
        );

        Ok(KvService {
            handle,
            actor,
            worker,
            stats,
            restore_status,
        })
    }

    /// A new handle to the store
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Outcome of the startup restore
    pub fn restore_status(&self) -> &RestoreStatus {
        &self.restore_status
    }

    /// Current persistence counters
    pub fn persist_stats(&self) -> PersistStats {
        self.stats.snapshot()
    }

    /// Stop the actor, write the final snapshot, and join the writer
    ///
    /// Handles still held elsewhere get [`snapkv_core::Error::StoreClosed`]
    /// afterwards.
    pub async fn shutdown(self) -> Result<PersistStats, ServiceError> {
        let KvService { actor, worker, .. } = self;

        let final_map = actor.stop().await?;
        let stats = tokio::task::spawn_blocking(move || worker.join())
            .await
            .map_err(|e| ServiceError::TaskFailed(e.to_string()))?
            .ok_or(ServiceError::WriterPanicked)?;

        info!(
            target: "snapkv::store",
            entries = final_map.len(),
            written = stats.written,
            unchanged = stats.unchanged,
            failed = stats.failed,
            "Store service stopped"
        );
        Ok(stats)
    }
}
