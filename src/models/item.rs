use serde::{Deserialize, Serialize};

/// Playing role of an auctioned player
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ItemRole {
    Batsman,
    Bowler,
    #[serde(rename = "All-rounder")]
    AllRounder,
    Wicketkeeper,
}

impl ItemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemRole::Batsman => "Batsman",
            ItemRole::Bowler => "Bowler",
            ItemRole::AllRounder => "All-rounder",
            ItemRole::Wicketkeeper => "Wicketkeeper",
        }
    }

    /// Parse a role label, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "batsman" => Some(ItemRole::Batsman),
            "bowler" => Some(ItemRole::Bowler),
            "all-rounder" | "allrounder" => Some(ItemRole::AllRounder),
            "wicketkeeper" => Some(ItemRole::Wicketkeeper),
            _ => None,
        }
    }
}

/// Lifecycle of an item: Draft -> Live -> Sold | Unsold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemStatus {
    Draft,
    Live,
    Sold,
    Unsold,
}

/// Optional career numbers shown alongside a player
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    pub matches: u32,
    pub strike_rate: f64,
}

/// A player put up for auction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique item identifier
    pub id: String,

    pub name: String,

    pub role: ItemRole,

    pub age: u32,

    /// Opening price; the first bid is computed from it
    pub base_price: u64,

    /// Highest accepted bid while Live, frozen at the winning price once Sold
    pub current_bid: u64,

    pub status: ItemStatus,

    /// Winning bidder id, set only when Sold
    pub owner_id: Option<String>,

    pub metadata: ItemMetadata,

    pub verified: bool,

    /// Image URL or data URI
    pub image: String,
}

impl Item {
    /// Create a fresh Draft item
    pub fn draft(id: impl Into<String>, name: impl Into<String>, role: ItemRole, base_price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            age: 20,
            base_price,
            current_bid: 0,
            status: ItemStatus::Draft,
            owner_id: None,
            metadata: ItemMetadata::default(),
            verified: false,
            image: String::new(),
        }
    }

    /// Price the next bid is computed from
    pub fn asking_base(&self) -> u64 {
        if self.current_bid > 0 {
            self.current_bid
        } else {
            self.base_price
        }
    }
}

/// View-level filter applied when picking the next item to auction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleFilter {
    #[default]
    All,
    Only(ItemRole),
}

impl RoleFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            RoleFilter::All => true,
            RoleFilter::Only(role) => item.role == *role,
        }
    }
}
