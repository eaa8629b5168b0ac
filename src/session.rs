//! Lifecycle of one participant in the auction room.
//!
//! A host session applies actions to the engine and broadcasts every change;
//! a viewer session polls the remote document. Both run a local countdown.
//! Leaving a session stops every worker it spawned.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::api::{ReplicationChannel, SnapshotStore, SyncStatus};
use crate::db::LocalStateStore;
use crate::engine::{AuctionEngine, SaleOutcome, SharedEngine};
use crate::error::AuctionResult;
use crate::models::{AuctionConfig, AuctionState, Bid, Bidder, Item, RoleFilter, SessionRole};
use crate::workers::{Broadcaster, CountdownWorker, SnapshotPollerWorker, SnapshotPublisherWorker};

/// Worker timing
#[derive(Debug, Clone, Copy)]
pub struct SessionTiming {
    pub poll_interval: Duration,
    pub tick_interval: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            tick_interval: Duration::from_secs(1),
        }
    }
}

pub struct AuctionSession {
    role: SessionRole,
    engine: SharedEngine,
    channel: ReplicationChannel,
    broadcaster: Option<Broadcaster>,
    local_store: Option<Arc<LocalStateStore>>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl AuctionSession {
    /// Spawn the workers for the engine's role. A host publishes its current
    /// state straight away.
    pub async fn start(
        engine: AuctionEngine,
        store: Arc<dyn SnapshotStore>,
        local_store: Option<Arc<LocalStateStore>>,
        timing: SessionTiming,
    ) -> Self {
        let role = engine.role();
        let engine: SharedEngine = Arc::new(RwLock::new(engine));
        let channel = ReplicationChannel::new(store, role);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handles = Vec::new();

        let broadcaster = if role.is_host() {
            let (snapshot_tx, snapshot_rx) = watch::channel(None);
            let publisher =
                SnapshotPublisherWorker::new(channel.clone(), snapshot_rx, shutdown_rx.clone());
            handles.push(tokio::spawn(publisher.run()));
            Some(Broadcaster::new(snapshot_tx, local_store.clone()))
        } else {
            let poller = SnapshotPollerWorker::new(
                channel.clone(),
                Arc::clone(&engine),
                timing.poll_interval,
                shutdown_rx.clone(),
            );
            handles.push(tokio::spawn(poller.run()));
            None
        };

        let countdown = CountdownWorker::new(
            Arc::clone(&engine),
            broadcaster.clone(),
            timing.tick_interval,
            shutdown_rx,
        );
        handles.push(tokio::spawn(countdown.run()));

        let session = Self {
            role,
            engine,
            channel,
            broadcaster,
            local_store,
            shutdown_tx,
            handles,
        };

        if let Some(broadcaster) = &session.broadcaster {
            let engine = session.engine.read().await;
            broadcaster.broadcast(&engine).await;
        }

        info!("Joined auction as {}", role.as_str());
        session
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    pub async fn state(&self) -> AuctionState {
        self.engine.read().await.to_state()
    }

    pub async fn sync_status(&self) -> SyncStatus {
        self.channel.status().await
    }

    /// Apply a host action and broadcast the result. Rejected actions change
    /// nothing and broadcast nothing. The broadcast happens under the same
    /// write lock as the action, so countdown ticks cannot reorder it.
    async fn apply<T>(
        &self,
        action: impl FnOnce(&mut AuctionEngine) -> AuctionResult<T>,
    ) -> AuctionResult<T> {
        let mut engine = self.engine.write().await;
        let result = action(&mut *engine)?;

        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.broadcast(&engine).await;
        }
        Ok(result)
    }

    pub async fn place_bid(&self, bidder_id: &str) -> AuctionResult<Bid> {
        self.apply(|engine| engine.place_bid(bidder_id)).await
    }

    pub async fn undo_last_bid(&self) -> AuctionResult<Bid> {
        self.apply(|engine| engine.undo_last_bid()).await
    }

    pub async fn start_next(
        &self,
        explicit_id: Option<&str>,
        filter: RoleFilter,
    ) -> AuctionResult<Option<String>> {
        self.apply(|engine| engine.start_next(explicit_id, filter)).await
    }

    pub async fn finalize_sale(&self, sold: bool) -> AuctionResult<SaleOutcome> {
        self.apply(|engine| engine.finalize_sale(sold)).await
    }

    pub async fn update_config(&self, config: AuctionConfig) -> AuctionResult<()> {
        self.apply(|engine| engine.update_config(config)).await
    }

    pub async fn add_bidder(&self, name: &str) -> AuctionResult<Bidder> {
        self.apply(|engine| engine.add_bidder(name)).await
    }

    pub async fn remove_bidder(&self, bidder_id: &str) -> AuctionResult<Bidder> {
        self.apply(|engine| engine.remove_bidder(bidder_id)).await
    }

    pub async fn update_bidder(
        &self,
        bidder_id: &str,
        name: &str,
        budget: u64,
    ) -> AuctionResult<Bidder> {
        self.apply(|engine| engine.update_bidder(bidder_id, name, budget))
            .await
    }

    pub async fn remove_item(&self, item_id: &str) -> AuctionResult<Item> {
        self.apply(|engine| engine.remove_item(item_id)).await
    }

    pub async fn append_items(&self, items: Vec<Item>) -> AuctionResult<usize> {
        self.apply(|engine| engine.append_items(items)).await
    }

    /// Wipe local durable state and return to the default auction.
    /// Nothing is published; the remote document keeps its last value.
    pub async fn reset(&self) -> Result<()> {
        let mut engine = self.engine.write().await;
        if let Some(store) = &self.local_store {
            store.reset().await?;
        }
        engine.reset();
        warn!("Auction reset to defaults");
        Ok(())
    }

    /// Stop all workers and wait for them to finish
    pub async fn leave(mut self) {
        let _ = self.shutdown_tx.send(true);

        for handle in std::mem::take(&mut self.handles) {
            if let Err(e) = handle.await {
                warn!("Worker ended abnormally: {}", e);
            }
        }

        info!("Left auction");
    }
}

impl Drop for AuctionSession {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
