use std::env;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::engine::StalenessPolicy;
use crate::models::SessionRole;

/// Shared public document every host and viewer meets at
pub const DEFAULT_SYNC_SERVICE_URL: &str =
    "https://jsonblob.com/api/jsonBlob/1344446549230534656";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote snapshot document URL
    pub sync_service_url: String,

    /// Role requested for this process; `None` defers to the saved role
    pub role: Option<SessionRole>,

    /// Interval between viewer polls
    pub poll_interval: Duration,

    /// Countdown tick length
    pub tick_interval: Duration,

    /// SQLite database path
    pub database_url: String,

    /// Discard fetched snapshots that are not newer than the applied one
    pub reject_stale_snapshots: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let role = match env::var("AUCTION_ROLE") {
            Ok(value) => Some(
                SessionRole::parse(&value)
                    .with_context(|| format!("AUCTION_ROLE must be host or viewer, got {}", value))?,
            ),
            Err(_) => None,
        };

        Ok(Config {
            sync_service_url: env::var("SYNC_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_SYNC_SERVICE_URL.to_string()),

            role,

            poll_interval: parse_interval_ms(
                "POLL_INTERVAL_MS",
                env::var("POLL_INTERVAL_MS").ok(),
                2000,
            )?,

            tick_interval: parse_interval_ms(
                "TICK_INTERVAL_MS",
                env::var("TICK_INTERVAL_MS").ok(),
                1000,
            )?,

            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/auction.db".to_string()),

            reject_stale_snapshots: env::var("REJECT_STALE_SNAPSHOTS")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .context("REJECT_STALE_SNAPSHOTS must be true or false")?,
        })
    }

    pub fn staleness_policy(&self) -> StalenessPolicy {
        if self.reject_stale_snapshots {
            StalenessPolicy::RejectStale
        } else {
            StalenessPolicy::Overwrite
        }
    }
}

/// Worker periods must be non-zero; a zero period would kill the worker.
fn parse_interval_ms(name: &str, raw: Option<String>, default_ms: u64) -> Result<Duration> {
    let millis: u64 = match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {}", name, value))?,
        None => default_ms,
    };
    ensure!(millis > 0, "{} must be greater than zero", name);
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_defaults_and_parses() {
        let poll = parse_interval_ms("POLL_INTERVAL_MS", None, 2000).unwrap();
        assert_eq!(poll, Duration::from_secs(2));

        let tick = parse_interval_ms("TICK_INTERVAL_MS", Some("250".to_string()), 1000).unwrap();
        assert_eq!(tick, Duration::from_millis(250));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = parse_interval_ms("TICK_INTERVAL_MS", Some("0".to_string()), 1000).unwrap_err();
        assert!(err.to_string().contains("TICK_INTERVAL_MS"));

        assert!(parse_interval_ms("POLL_INTERVAL_MS", Some("0".to_string()), 2000).is_err());
        assert!(parse_interval_ms("POLL_INTERVAL_MS", Some("soon".to_string()), 2000).is_err());
    }
}
