use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An accepted bid on the Live item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,

    /// Item the bid was placed on
    pub item_id: String,

    /// Name of the bidding team
    pub bidder_name: String,

    pub amount: u64,

    pub timestamp: DateTime<Utc>,
}
