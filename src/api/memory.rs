//! In-process snapshot document for tests and single-machine demos.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::api::SnapshotStore;
use crate::models::Snapshot;

/// Shared in-memory document. Clones point at the same document, so a host
/// and viewers in one process can replicate through it.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    document: Arc<RwLock<Option<String>>>,
    fail: Arc<AtomicBool>,
    publishes: Arc<AtomicUsize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored document with an arbitrary payload
    pub async fn put_raw(&self, payload: impl Into<String>) {
        *self.document.write().await = Some(payload.into());
    }

    /// Make every call fail until cleared, like an unreachable endpoint
    pub fn set_fail_mode(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of successful publishes
    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(anyhow!("snapshot store unreachable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        self.check_reachable()?;
        let payload = snapshot.to_json()?;
        *self.document.write().await = Some(payload);
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn fetch(&self) -> Result<Snapshot> {
        self.check_reachable()?;
        let document = self.document.read().await;
        let payload = document
            .as_deref()
            .ok_or_else(|| anyhow!("snapshot document is empty"))?;
        Snapshot::from_json(payload).context("Rejected remote snapshot")
    }
}
