/// Rejected auction operations. State is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuctionError {
    #[error("Only the host can do that")]
    NotHost,

    #[error("Only a viewer can apply remote snapshots")]
    NotViewer,

    #[error("No item is live")]
    NoLiveItem,

    #[error("Unknown bidder: {0}")]
    UnknownBidder(String),

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("{0} is already the highest bidder")]
    AlreadyHighest(String),

    #[error("Squad full for {0}")]
    SquadFull(String),

    #[error("Insufficient purse for {bidder}: {amount} exceeds remaining {remaining}")]
    InsufficientPurse {
        bidder: String,
        amount: u64,
        remaining: u64,
    },

    #[error("No bids to undo")]
    EmptyLedger,

    #[error("Invalid bid tiers: {0}")]
    InvalidTiers(String),

    #[error("Duplicate item id: {0}")]
    DuplicateItem(String),

    #[error("Bidder {0} still owns items or holds a bid")]
    BidderInUse(String),

    #[error("Item {0} is live or sold")]
    ItemLocked(String),

    #[error("Budget {budget} is below the {spent} already spent by {bidder}")]
    BudgetBelowSpent {
        bidder: String,
        budget: u64,
        spent: u64,
    },
}

/// A replicated or persisted document that failed the schema check
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid bid tiers: {0}")]
    InvalidTiers(String),

    #[error("Duplicate item id: {0}")]
    DuplicateItem(String),

    #[error("{0} items are live at once")]
    MultipleLive(usize),

    #[error("Bid {0} does not belong to the live item")]
    OrphanBid(String),
}

/// Roster import failure; nothing from the file is applied
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Roster is empty")]
    Empty,

    #[error("JSON roster must be an array of objects")]
    NotAnArray,

    #[error("Row {row}: expected {expected} columns, found {found}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("CSV header has no name column")]
    MissingNameColumn,
}

/// Convenience type alias.
pub type AuctionResult<T> = Result<T, AuctionError>;
