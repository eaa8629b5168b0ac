use serde::{Deserialize, Serialize};

/// A team competing for items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bidder {
    /// Unique bidder identifier
    pub id: String,

    /// Display name, also the key recorded on bids
    pub name: String,

    /// Total purse
    pub budget: u64,

    /// Sum of winning prices, only changed by a sale
    pub spent: u64,
}

impl Bidder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, budget: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            budget,
            spent: 0,
        }
    }

    /// Whether a commitment of `amount` still fits the purse
    pub fn can_afford(&self, amount: u64) -> bool {
        self.spent
            .checked_add(amount)
            .is_some_and(|total| total <= self.budget)
    }

    pub fn remaining(&self) -> u64 {
        self.budget.saturating_sub(self.spent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_afford_is_inclusive() {
        let mut bidder = Bidder::new("1", "Mumbai", 100_000);
        bidder.spent = 95_000;

        assert!(bidder.can_afford(5_000));
        assert!(!bidder.can_afford(10_000));
        assert!(!bidder.can_afford(u64::MAX));
        assert_eq!(bidder.remaining(), 5_000);
    }
}
