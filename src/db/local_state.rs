use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use tracing::{info, warn};

use crate::models::{AuctionState, SessionRole};

/// SQLite cache of the last auction state and the chosen role.
///
/// Only read at startup to seed the engine; never consulted while a session
/// is publishing or polling.
pub struct LocalStateStore {
    pool: Pool<Sqlite>,
}

impl LocalStateStore {
    /// Open the store and initialize the database
    pub async fn new(database_url: &str) -> Result<Self> {
        // Create data directory if needed
        if let Some(path) = database_url.strip_prefix("sqlite:") {
            if !path.starts_with(":memory:") {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)
                            .context("Failed to create database directory")?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .create_if_missing(true);

        // Every connection to an in-memory database sees a different database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init_schema().await?;

        info!("Local state store initialized");
        Ok(store)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auction_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                payload TEXT NOT NULL,
                saved_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create auction_state table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_role (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                role TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create session_role table")?;

        Ok(())
    }

    /// Replace the saved state
    pub async fn save_state(&self, state: &AuctionState) -> Result<()> {
        let payload = serde_json::to_string(state).context("Failed to serialize state")?;

        sqlx::query(
            r#"
            INSERT INTO auction_state (id, payload, saved_at) VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET payload = excluded.payload, saved_at = excluded.saved_at
            "#,
        )
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save auction state")?;

        Ok(())
    }

    /// Load the saved state. A payload that no longer parses or validates is
    /// ignored so startup falls back to defaults.
    pub async fn load_state(&self) -> Result<Option<AuctionState>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT payload FROM auction_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load auction state")?;

        let Some((payload,)) = row else {
            return Ok(None);
        };

        let state = match serde_json::from_str::<AuctionState>(&payload) {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring unreadable saved state: {}", e);
                return Ok(None);
            }
        };

        if let Err(e) = state.validate() {
            warn!("Ignoring invalid saved state: {}", e);
            return Ok(None);
        }

        Ok(Some(state))
    }

    pub async fn save_role(&self, role: SessionRole) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO session_role (id, role) VALUES (1, ?)
            ON CONFLICT(id) DO UPDATE SET role = excluded.role
            "#,
        )
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to save role")?;

        Ok(())
    }

    pub async fn load_role(&self) -> Result<Option<SessionRole>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT role FROM session_role WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load role")?;

        Ok(row.and_then(|(role,)| SessionRole::parse(&role)))
    }

    /// Forget everything saved locally
    pub async fn reset(&self) -> Result<()> {
        sqlx::query("DELETE FROM auction_state")
            .execute(&self.pool)
            .await
            .context("Failed to clear auction state")?;

        sqlx::query("DELETE FROM session_role")
            .execute(&self.pool)
            .await
            .context("Failed to clear role")?;

        info!("Local state cleared");
        Ok(())
    }
}
