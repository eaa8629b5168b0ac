use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::api::SnapshotStore;
use crate::models::Snapshot;

/// Remote snapshot document behind a plain JSON blob endpoint
pub struct JsonBlobStore {
    client: Client,
    url: String,
}

impl JsonBlobStore {
    /// Create a new client for the document at `url`
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonBlobStore {
    async fn publish(&self, snapshot: &Snapshot) -> Result<()> {
        debug!("Publishing snapshot to {}", self.url);

        let response = self
            .client
            .put(&self.url)
            .json(snapshot)
            .send()
            .await
            .context("Failed to publish snapshot")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Snapshot store error: {} - {}", status, text);
        }

        Ok(())
    }

    async fn fetch(&self) -> Result<Snapshot> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to fetch snapshot")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Snapshot store error: {} - {}", status, text);
        }

        let body = response
            .text()
            .await
            .context("Failed to read snapshot body")?;

        Snapshot::from_json(&body).context("Rejected remote snapshot")
    }
}
