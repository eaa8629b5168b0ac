use std::env;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use live_auction::db::LocalStateStore;
use live_auction::engine::{AuctionEngine, StalenessPolicy};
use live_auction::models::{AuctionState, SessionRole};
use live_auction::roster::parse_roster;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "import_roster=info,live_auction=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse arguments
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        error!("Usage: import_roster <roster.json|roster.csv>");
        std::process::exit(2);
    };

    dotenvy::dotenv().ok();
    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/auction.db".to_string());

    let store = LocalStateStore::new(&database_url).await?;
    let state = store.load_state().await?.unwrap_or_else(|| {
        info!("No saved auction found, starting from defaults");
        AuctionState::default()
    });

    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    let items = match parse_roster(&text) {
        Ok(items) => items,
        Err(e) => {
            error!("Imported 0 items: {}", e);
            return Ok(());
        }
    };

    // Setup happens on the host side, so edit through a host engine
    let mut engine = AuctionEngine::new(SessionRole::Host, state, StalenessPolicy::default());
    let count = engine.append_items(items)?;
    store.save_state(&engine.to_state()).await?;

    info!(
        "Imported {} items into {} ({} total)",
        count,
        database_url,
        engine.items().len()
    );
    Ok(())
}
