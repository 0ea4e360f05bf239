//! Snapshot writer worker and tick source
//!
//! [`PersistenceEngine::start`] moves the engine onto a dedicated thread
//! that drains a bounded queue of mappings. The store actor owns the other
//! end: on every tick of the [`SnapshotTicker`] it offers a copy of its
//! mapping to the [`SnapshotQueue`].
//!
//! ```text
//! SnapshotTicker ──tick──▶ store actor ──offer(map)──▶ SnapshotQueue ──▶ snapkv-persist thread
//! ```
//!
//! # Thread Lifecycle
//!
//! The writer thread runs until every `SnapshotQueue` clone is dropped,
//! then persists whatever is still queued and exits.
//! [`PersistenceWorker::join`] waits for that.

use snapkv_core::KeyValueMap;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::config::OverflowPolicy;
use crate::engine::{PersistStats, PersistenceEngine, StatsHandle};

/// Recurring snapshot timer
///
/// The first tick fires one period after creation. Missed ticks are
/// skipped rather than delivered in a burst.
#[derive(Debug)]
pub struct SnapshotTicker {
    interval: Interval,
    period: Duration,
}

impl SnapshotTicker {
    /// Create a ticker with the given period
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        SnapshotTicker { interval, period }
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    /// Tick period
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Result of offering a mapping to the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffOutcome {
    /// The mapping is queued for writing
    Enqueued,
    /// The queue was full and the overflow policy skipped this tick
    SkippedFull,
    /// The writer has stopped
    Closed,
}

/// Sending half of the snapshot queue
#[derive(Debug, Clone)]
pub struct SnapshotQueue {
    tx: mpsc::Sender<KeyValueMap>,
    overflow: OverflowPolicy,
}

impl SnapshotQueue {
    /// Offer a mapping according to the overflow policy
    pub async fn offer(&self, map: KeyValueMap) -> HandoffOutcome {
        match self.overflow {
            OverflowPolicy::SkipTick => match self.tx.try_send(map) {
                Ok(()) => HandoffOutcome::Enqueued,
                Err(TrySendError::Full(_)) => HandoffOutcome::SkippedFull,
                Err(TrySendError::Closed(_)) => HandoffOutcome::Closed,
            },
            OverflowPolicy::Wait => self.send(map).await,
        }
    }

    /// Enqueue a mapping, waiting for room if the queue is full
    pub async fn send(&self, map: KeyValueMap) -> HandoffOutcome {
        match self.tx.send(map).await {
            Ok(()) => HandoffOutcome::Enqueued,
            Err(_) => HandoffOutcome::Closed,
        }
    }

    /// Free slots in the queue
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Overflow policy in effect
    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }
}

/// Handle to the writer thread
#[derive(Debug)]
pub struct PersistenceWorker {
    handle: JoinHandle<PersistStats>,
}

impl PersistenceWorker {
    /// Wait for the writer thread to exit
    ///
    /// Returns the final counters, or None if the thread panicked. Blocks
    /// until every `SnapshotQueue` clone has been dropped.
    pub fn join(self) -> Option<PersistStats> {
        match self.handle.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                error!(target: "snapkv::persist", "Snapshot writer thread panicked");
                None
            }
        }
    }

    /// Whether the writer thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Everything produced by starting the engine
#[derive(Debug)]
pub struct PersistencePipeline {
    /// Queue the store actor offers mappings to
    pub queue: SnapshotQueue,
    /// Tick source the store actor listens to
    pub ticker: SnapshotTicker,
    /// Writer thread
    pub worker: PersistenceWorker,
    /// Live counters
    pub stats: StatsHandle,
}

impl PersistenceEngine {
    /// Establish the recurring timer and start the writer thread
    ///
    /// Must be called from within a tokio runtime (the ticker is a tokio
    /// interval). The writer itself is an OS thread so disk latency never
    /// occupies a runtime worker.
    pub fn start(mut self) -> io::Result<PersistencePipeline> {
        let (tx, mut rx) = mpsc::channel::<KeyValueMap>(self.config.queue_depth.max(1));
        let ticker = SnapshotTicker::new(self.config.interval());
        let queue = SnapshotQueue {
            tx,
            overflow: self.config.overflow,
        };
        let stats = self.stats_handle();
        let interval_secs = self.config.interval_secs;
        let dir = self.config.snapshot_dir.clone();

        let handle = thread::Builder::new()
            .name("snapkv-persist".to_string())
            .spawn(move || {
                info!(target: "snapkv::persist", interval_secs, dir = %dir.display(), "Snapshot writer started");
                while let Some(map) = rx.blocking_recv() {
                    debug!(target: "snapkv::persist", entries = map.len(), "Received mapping for snapshot");
                    self.persist(&map);
                }
                info!(target: "snapkv::persist", "Snapshot writer stopped");
                self.stats()
            })?;

        Ok(PersistencePipeline {
            queue,
            ticker,
            worker: PersistenceWorker { handle },
            stats,
        })
    }
}
