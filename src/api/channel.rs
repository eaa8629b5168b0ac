use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::SnapshotStore;
use crate::error::{AuctionError, AuctionResult};
use crate::models::{SessionRole, Snapshot};

/// Outcome of the most recent transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Error,
}

/// Role-checked access to the remote snapshot document.
///
/// Only a host may publish and only a viewer may poll. Nothing stops two
/// processes that both claim to be host from racing; the later publish wins.
#[derive(Clone)]
pub struct ReplicationChannel {
    store: Arc<dyn SnapshotStore>,
    role: SessionRole,
    status: Arc<RwLock<SyncStatus>>,
}

impl ReplicationChannel {
    pub fn new(store: Arc<dyn SnapshotStore>, role: SessionRole) -> Self {
        Self {
            store,
            role,
            status: Arc::new(RwLock::new(SyncStatus::Idle)),
        }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub async fn status(&self) -> SyncStatus {
        *self.status.read().await
    }

    async fn set_status(&self, status: SyncStatus) {
        *self.status.write().await = status;
    }

    /// Overwrite the remote document. Transport failures only flip the status.
    pub async fn publish(&self, snapshot: &Snapshot) -> AuctionResult<SyncStatus> {
        if !self.role.is_host() {
            return Err(AuctionError::NotHost);
        }

        self.set_status(SyncStatus::Syncing).await;

        let status = match self.store.publish(snapshot).await {
            Ok(()) => {
                debug!("Published snapshot {}", snapshot.last_updated);
                SyncStatus::Idle
            }
            Err(e) => {
                warn!("Failed to publish snapshot: {:#}", e);
                SyncStatus::Error
            }
        };

        self.set_status(status).await;
        Ok(status)
    }

    /// Fetch the remote document. Failures are logged and yield `None`.
    pub async fn poll(&self) -> AuctionResult<Option<Snapshot>> {
        if self.role.is_host() {
            return Err(AuctionError::NotViewer);
        }

        match self.store.fetch().await {
            Ok(snapshot) => {
                self.set_status(SyncStatus::Idle).await;
                Ok(Some(snapshot))
            }
            Err(e) => {
                warn!("Failed to poll snapshot: {:#}", e);
                self.set_status(SyncStatus::Error).await;
                Ok(None)
            }
        }
    }
}
