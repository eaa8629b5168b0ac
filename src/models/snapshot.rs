use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;
use crate::models::{
    AuctionConfig, Bid, Bidder, Item, ItemMetadata, ItemRole, ItemStatus,
};

/// Complete auction state, as persisted locally and replicated to viewers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionState {
    pub config: AuctionConfig,

    pub bidders: Vec<Bidder>,

    pub items: Vec<Item>,

    /// Ledger for the Live item, newest first
    pub bids: Vec<Bid>,

    /// Seconds left on the countdown
    pub time_left: u32,

    pub is_timer_running: bool,
}

impl Default for AuctionState {
    fn default() -> Self {
        let config = AuctionConfig::default();
        let budget = config.default_budget;

        let bidders = [
            "Mumbai Mavericks",
            "Delhi Dynamos",
            "Chennai Kings",
            "Bangalore Blasters",
        ]
        .iter()
        .enumerate()
        .map(|(idx, name)| Bidder::new((idx + 1).to_string(), *name, budget))
        .collect();

        let opener = Item {
            id: "1".to_string(),
            name: "Aryan Sharma".to_string(),
            role: ItemRole::AllRounder,
            age: 24,
            base_price: 50_000,
            current_bid: 0,
            status: ItemStatus::Live,
            owner_id: None,
            metadata: ItemMetadata {
                matches: 45,
                strike_rate: 145.5,
            },
            verified: true,
            image: "https://images.unsplash.com/photo-1540739414822-5c5703f4c812?w=800&fit=crop"
                .to_string(),
        };

        Self {
            time_left: config.time_per_item,
            config,
            bidders,
            items: vec![opener],
            bids: Vec::new(),
            is_timer_running: false,
        }
    }
}

impl AuctionState {
    /// The item currently accepting bids
    pub fn live_item(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.status == ItemStatus::Live)
    }

    /// Items won by a bidder
    pub fn squad<'a>(&'a self, bidder_id: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.owner_id.as_deref() == Some(bidder_id))
    }

    /// Check the structural invariants a replicated document must satisfy
    pub fn validate(&self) -> Result<(), SnapshotError> {
        self.config
            .validate_tiers()
            .map_err(|e| SnapshotError::InvalidTiers(e.to_string()))?;

        let mut ids = HashSet::new();
        for item in &self.items {
            if !ids.insert(item.id.as_str()) {
                return Err(SnapshotError::DuplicateItem(item.id.clone()));
            }
        }

        let live: Vec<&Item> = self
            .items
            .iter()
            .filter(|item| item.status == ItemStatus::Live)
            .collect();
        if live.len() > 1 {
            return Err(SnapshotError::MultipleLive(live.len()));
        }

        let live_id = live.first().map(|item| item.id.as_str());
        if let Some(bid) = self
            .bids
            .iter()
            .find(|bid| Some(bid.item_id.as_str()) != live_id)
        {
            return Err(SnapshotError::OrphanBid(bid.id.clone()));
        }

        Ok(())
    }
}

/// The unit of replication: full state plus the publish time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(flatten)]
    pub state: AuctionState,

    /// Publish time in epoch milliseconds
    pub last_updated: i64,
}

impl Snapshot {
    /// Stamp a state with the current time
    pub fn now(state: AuctionState) -> Self {
        Self {
            state,
            last_updated: Utc::now().timestamp_millis(),
        }
    }

    /// Parse and validate a remote document. Nothing is applied on failure.
    pub fn from_json(payload: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(payload)?;
        snapshot.state.validate()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }
}
