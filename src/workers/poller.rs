use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, error, info};

use crate::api::ReplicationChannel;
use crate::engine::SharedEngine;

/// Viewer-side worker that mirrors the remote document into the local engine
pub struct SnapshotPollerWorker {
    channel: ReplicationChannel,
    engine: SharedEngine,
    poll_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl SnapshotPollerWorker {
    /// Create a new poller worker
    pub fn new(
        channel: ReplicationChannel,
        engine: SharedEngine,
        poll_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            channel,
            engine,
            poll_interval,
            shutdown,
        }
    }

    /// Run the worker loop. The first poll happens immediately.
    pub async fn run(mut self) {
        info!("Snapshot poller started (interval: {:?})", self.poll_interval);

        let mut interval = time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.poll_once().await;
                }
                _ = self.shutdown.changed() => break,
            }
        }

        info!("Snapshot poller stopped");
    }

    /// Perform a single poll cycle. Returns whether local state was replaced.
    pub async fn poll_once(&self) -> bool {
        let snapshot = match self.channel.poll().await {
            Ok(Some(snapshot)) => snapshot,
            // Already logged, keep the current view until the next poll
            Ok(None) => return false,
            Err(e) => {
                error!("Refusing to poll: {}", e);
                return false;
            }
        };

        let mut engine = self.engine.write().await;
        let previous_live = engine.live_item().map(|item| item.id.clone());

        match engine.apply_remote(snapshot) {
            Ok(true) => {
                let live = engine.live_item();
                if live.map(|item| &item.id) != previous_live.as_ref() {
                    match live {
                        Some(item) => info!("Now live: {} (base {})", item.name, item.base_price),
                        None => info!("No item live"),
                    }
                }
                debug!(
                    "Applied snapshot {:?} ({} bids, {}s left)",
                    engine.last_applied(),
                    engine.bids().len(),
                    engine.countdown().remaining()
                );
                true
            }
            Ok(false) => false,
            Err(e) => {
                error!("Failed to apply snapshot: {}", e);
                false
            }
        }
    }
}
