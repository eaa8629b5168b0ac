use serde::{Deserialize, Serialize};

use crate::error::AuctionError;

/// Increment used when no tier covers a price. Only reachable with a
/// configuration that bypassed tier validation.
pub const FALLBACK_INCREMENT: u64 = 1000;

/// A contiguous price band with its bid increment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidRange {
    /// Inclusive lower bound
    pub min: u64,

    /// Inclusive upper bound, `None` means unbounded
    pub max: Option<u64>,

    /// Amount added to the current price by one bid
    pub increment: u64,
}

impl BidRange {
    pub fn new(min: u64, max: Option<u64>, increment: u64) -> Self {
        Self { min, max, increment }
    }

    /// Whether `price` falls inside this tier (both bounds inclusive)
    pub fn contains(&self, price: u64) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }
}

/// Auction-wide settings, edited by the host during setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionConfig {
    /// Event title
    pub title: String,

    /// Bid increment tiers, ordered by `min`
    pub bid_ranges: Vec<BidRange>,

    /// Countdown length in seconds, restored on every bid and item change
    pub time_per_item: u32,

    /// Squad size limit per bidder
    pub max_items_per_bidder: u32,

    /// Budget given to newly added bidders
    pub default_budget: u64,

    /// Presentation only
    pub primary_color: String,

    /// Presentation only
    pub font_family: String,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            title: "Public Premier League".to_string(),
            bid_ranges: vec![
                BidRange::new(0, Some(50_000), 2_000),
                BidRange::new(50_001, Some(200_000), 5_000),
                BidRange::new(200_001, None, 10_000),
            ],
            time_per_item: 60,
            max_items_per_bidder: 15,
            default_budget: 10_000_000,
            primary_color: "#39FF14".to_string(),
            font_family: "Space Grotesk".to_string(),
        }
    }
}

impl AuctionConfig {
    /// Look up the increment for the tier containing `price`.
    ///
    /// Falls back to [`FALLBACK_INCREMENT`] when no tier matches.
    pub fn increment_for_price(&self, price: u64) -> u64 {
        self.bid_ranges
            .iter()
            .find(|range| range.contains(price))
            .map(|range| range.increment)
            .unwrap_or(FALLBACK_INCREMENT)
    }

    /// Check that the tiers cover every non-negative price exactly once.
    pub fn validate_tiers(&self) -> Result<(), AuctionError> {
        validate_tiers(&self.bid_ranges)
    }
}

/// Tiers must be sorted by `min`, start at 0, be contiguous without overlap,
/// end with one unbounded tier and carry non-zero increments.
pub fn validate_tiers(ranges: &[BidRange]) -> Result<(), AuctionError> {
    let invalid = |reason: String| Err(AuctionError::InvalidTiers(reason));

    let Some(first) = ranges.first() else {
        return invalid("no tiers configured".to_string());
    };
    if first.min != 0 {
        return invalid(format!("first tier starts at {}, expected 0", first.min));
    }

    let mut expected_min = 0u64;
    for (idx, range) in ranges.iter().enumerate() {
        if range.increment == 0 {
            return invalid(format!("tier {} has a zero increment", idx));
        }
        if range.min != expected_min {
            return invalid(format!(
                "tier {} starts at {}, expected {}",
                idx, range.min, expected_min
            ));
        }

        let is_last = idx + 1 == ranges.len();
        match range.max {
            None if is_last => {}
            None => return invalid(format!("tier {} is unbounded but not last", idx)),
            Some(_) if is_last => {
                return invalid("last tier must be unbounded".to_string());
            }
            Some(max) if max < range.min => {
                return invalid(format!("tier {} has max {} below min {}", idx, max, range.min));
            }
            Some(max) => match max.checked_add(1) {
                Some(next) => expected_min = next,
                None => return invalid(format!("tier {} ends at u64::MAX", idx)),
            },
        }
    }

    Ok(())
}
