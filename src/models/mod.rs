pub mod bid;
pub mod bidder;
pub mod config;
pub mod item;
pub mod session;
pub mod snapshot;

pub use bid::Bid;
pub use bidder::Bidder;
pub use config::{AuctionConfig, BidRange};
pub use item::{Item, ItemMetadata, ItemRole, ItemStatus, RoleFilter};
pub use session::SessionRole;
pub use snapshot::{AuctionState, Snapshot};

use rand::distributions::{Alphanumeric, DistString};

/// Generate a fresh identifier: millisecond timestamp plus a random suffix
pub fn new_id() -> String {
    let suffix = Alphanumeric
        .sample_string(&mut rand::thread_rng(), 6)
        .to_lowercase();
    format!("{}{}", chrono::Utc::now().timestamp_millis(), suffix)
}
