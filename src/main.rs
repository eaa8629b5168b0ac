use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use live_auction::api::{JsonBlobStore, SnapshotStore};
use live_auction::config::Config;
use live_auction::db::LocalStateStore;
use live_auction::engine::AuctionEngine;
use live_auction::export::{export_file_name, squad_export, squad_summary};
use live_auction::models::{AuctionState, ItemRole, RoleFilter, SessionRole};
use live_auction::roster::parse_roster;
use live_auction::session::{AuctionSession, SessionTiming};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "live_auction=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting live-auction");

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded");

    // Initialize local persistence
    let local_store = Arc::new(LocalStateStore::new(&config.database_url).await?);

    let role = match config.role {
        Some(role) => role,
        None => local_store
            .load_role()
            .await?
            .unwrap_or(SessionRole::Viewer),
    };
    local_store.save_role(role).await?;

    let initial_state = match local_store.load_state().await? {
        Some(state) => {
            info!("Restored saved auction state");
            state
        }
        None => AuctionState::default(),
    };

    let engine = AuctionEngine::new(role, initial_state, config.staleness_policy());
    let store: Arc<dyn SnapshotStore> = Arc::new(JsonBlobStore::new(&config.sync_service_url));
    let timing = SessionTiming {
        poll_interval: config.poll_interval,
        tick_interval: config.tick_interval,
    };

    let session =
        AuctionSession::start(engine, store, Some(Arc::clone(&local_store)), timing).await;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = run_console(&session), if role.is_host() => {
            if let Err(e) = result {
                error!("Console exited with error: {:#}", e);
            }
        }
    }

    session.leave().await;
    info!("Shutting down live-auction");
    Ok(())
}

/// Read host commands from stdin until `quit` or end of input
async fn run_console(session: &AuctionSession) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut filter = RoleFilter::All;

    info!("Commands: status | bid <team-id> | undo | next [item-id] | filter <role|all> | sold | unsold | team <name> | budget <team-id> <amount> | drop <item-id> | import <path> | export <team-id> | reset | quit");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, Some(arg.trim())),
            None => (line, None),
        };

        match (command, arg) {
            ("", _) => continue,
            ("quit", _) => break,
            ("status", _) => print_status(session).await,
            ("bid", Some(team_id)) => report(session.place_bid(team_id).await),
            ("undo", _) => report(session.undo_last_bid().await),
            ("next", item_id) => report(session.start_next(item_id, filter).await),
            ("filter", Some(role)) => {
                filter = match role {
                    "all" => RoleFilter::All,
                    other => match ItemRole::parse(other) {
                        Some(role) => RoleFilter::Only(role),
                        None => {
                            warn!("Unknown role: {}", other);
                            continue;
                        }
                    },
                };
                info!("Role filter set to {:?}", filter);
            }
            ("sold", _) => report(session.finalize_sale(true).await),
            ("unsold", _) => report(session.finalize_sale(false).await),
            ("team", Some(name)) => report(session.add_bidder(name).await),
            ("budget", Some(rest)) => match rest.split_once(char::is_whitespace) {
                Some((team_id, budget)) => match budget.trim().parse::<u64>() {
                    Ok(budget) => {
                        let name = session
                            .state()
                            .await
                            .bidders
                            .iter()
                            .find(|b| b.id == team_id)
                            .map(|b| b.name.clone())
                            .unwrap_or_default();
                        report(session.update_bidder(team_id, &name, budget).await)
                    }
                    Err(_) => warn!("Budget must be a number: {}", budget),
                },
                None => warn!("Usage: budget <team-id> <amount>"),
            },
            ("drop", Some(item_id)) => report(session.remove_item(item_id).await),
            ("import", Some(path)) => {
                if let Err(e) = import_file(session, path).await {
                    warn!("Imported 0 items: {:#}", e);
                }
            }
            ("export", Some(team_id)) => {
                if let Err(e) = export_squad(session, team_id).await {
                    warn!("Export failed: {:#}", e);
                }
            }
            ("reset", _) => session.reset().await?,
            _ => warn!("Unknown command: {}", line),
        }
    }

    Ok(())
}

fn report<T: std::fmt::Debug>(result: live_auction::error::AuctionResult<T>) {
    match result {
        Ok(value) => info!("OK {:?}", value),
        Err(e) => warn!("Rejected: {}", e),
    }
}

async fn print_status(session: &AuctionSession) {
    let state = session.state().await;
    let sync = session.sync_status().await;

    match state.live_item() {
        Some(item) => info!(
            "Live: {} ({}) | price {} | {} bids | {}s left{} | sync {:?}",
            item.name,
            item.role.as_str(),
            item.asking_base(),
            state.bids.len(),
            state.time_left,
            if state.is_timer_running { "" } else { " (stopped)" },
            sync,
        ),
        None => info!("No item live | sync {:?}", sync),
    }

    for bidder in &state.bidders {
        info!(
            "  [{}] {} | spent {} of {} | squad {}",
            bidder.id,
            bidder.name,
            bidder.spent,
            bidder.budget,
            state.squad(&bidder.id).count()
        );
    }
}

async fn import_file(session: &AuctionSession, path: &str) -> Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;
    let items = parse_roster(&text)?;
    let count = session.append_items(items).await?;
    info!("Imported {} items from {}", count, path);
    Ok(())
}

async fn export_squad(session: &AuctionSession, team_id: &str) -> Result<()> {
    let state = session.state().await;
    let bidder = state
        .bidders
        .iter()
        .find(|b| b.id == team_id)
        .with_context(|| format!("Unknown team {}", team_id))?;

    println!("{}", squad_summary(bidder, &state.items));

    let file_name = export_file_name(bidder);
    let json = serde_json::to_string_pretty(&squad_export(bidder, &state.items))?;
    tokio::fs::write(&file_name, json)
        .await
        .with_context(|| format!("Failed to write {}", file_name))?;
    info!("Saved {}", file_name);
    Ok(())
}
