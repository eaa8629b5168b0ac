use anyhow::Result;
use async_trait::async_trait;

use crate::models::Snapshot;

/// A single addressable remote document holding the whole auction.
///
/// There is no versioning: `publish` replaces the document unconditionally
/// and the last writer wins.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Replace the remote document with `snapshot`
    async fn publish(&self, snapshot: &Snapshot) -> Result<()>;

    /// Retrieve and validate the current remote document
    async fn fetch(&self) -> Result<Snapshot>;
}
