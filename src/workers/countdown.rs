use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::info;

use crate::engine::SharedEngine;
use crate::workers::Broadcaster;

/// Worker that drives the engine's countdown on a fixed interval
pub struct CountdownWorker {
    engine: SharedEngine,
    broadcaster: Option<Broadcaster>,
    tick_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl CountdownWorker {
    /// Create a new countdown worker. Only a host passes a broadcaster.
    pub fn new(
        engine: SharedEngine,
        broadcaster: Option<Broadcaster>,
        tick_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            engine,
            broadcaster,
            tick_interval,
            shutdown,
        }
    }

    /// Run the worker loop
    pub async fn run(mut self) {
        info!("Countdown started (interval: {:?})", self.tick_interval);

        let mut interval = time::interval(self.tick_interval);
        interval.tick().await; // Skip first tick (fires immediately)

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = self.shutdown.changed() => break,
            }
        }

        info!("Countdown stopped");
    }

    async fn tick(&self) {
        let mut engine = self.engine.write().await;
        if !engine.tick() {
            return;
        }

        // Broadcast before releasing the lock so a host action cannot slip in
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.broadcast(&engine).await;
        }
    }
}
