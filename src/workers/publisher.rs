use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::api::ReplicationChannel;
use crate::db::LocalStateStore;
use crate::engine::AuctionEngine;
use crate::models::Snapshot;

/// Host-side hook run after every state change: saves the state locally and
/// hands a fresh snapshot to the publisher without waiting on the network.
#[derive(Clone)]
pub struct Broadcaster {
    snapshot_tx: watch::Sender<Option<Snapshot>>,
    local_store: Option<Arc<LocalStateStore>>,
}

impl Broadcaster {
    pub fn new(
        snapshot_tx: watch::Sender<Option<Snapshot>>,
        local_store: Option<Arc<LocalStateStore>>,
    ) -> Self {
        Self {
            snapshot_tx,
            local_store,
        }
    }

    /// Call with the engine lock held, so local saves and queued snapshots
    /// follow the order of the mutations that produced them.
    pub async fn broadcast(&self, engine: &AuctionEngine) {
        let state = engine.to_state();
        if let Some(store) = &self.local_store {
            if let Err(e) = store.save_state(&state).await {
                error!("Failed to save local state: {:#}", e);
            }
        }

        // Replaces any snapshot the publisher has not picked up yet
        self.snapshot_tx.send_replace(Some(Snapshot::now(state)));
    }
}

/// Worker that pushes the newest pending snapshot to the remote document
pub struct SnapshotPublisherWorker {
    channel: ReplicationChannel,
    snapshot_rx: watch::Receiver<Option<Snapshot>>,
    shutdown: watch::Receiver<bool>,
}

impl SnapshotPublisherWorker {
    /// Create a new publisher worker
    pub fn new(
        channel: ReplicationChannel,
        snapshot_rx: watch::Receiver<Option<Snapshot>>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            channel,
            snapshot_rx,
            shutdown,
        }
    }

    /// Run the worker loop
    pub async fn run(mut self) {
        info!("Snapshot publisher started");

        loop {
            tokio::select! {
                changed = self.snapshot_rx.changed() => {
                    if changed.is_err() {
                        warn!("Snapshot queue closed");
                        break;
                    }
                    let pending = self.snapshot_rx.borrow_and_update().clone();
                    if let Some(snapshot) = pending {
                        self.publish(&snapshot).await;
                    }
                }
                _ = self.shutdown.changed() => break,
            }
        }

        info!("Snapshot publisher stopped");
    }

    async fn publish(&self, snapshot: &Snapshot) {
        if let Err(e) = self.channel.publish(snapshot).await {
            error!("Refusing to publish: {}", e);
        }
    }
}
