//! Auction state machine for one room.
//!
//! Items move `Draft -> Live -> Sold | Unsold`. Only the Live item accepts
//! bids, and at most one item is Live at a time. Every host operation checks
//! its preconditions before touching state, so a rejected call leaves the
//! engine exactly as it was.

pub mod countdown;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{AuctionError, AuctionResult};
use crate::models::{
    new_id, AuctionConfig, AuctionState, Bid, Bidder, Item, ItemStatus, RoleFilter, SessionRole,
    Snapshot,
};

pub use countdown::Countdown;

/// Engine shared between the session and its workers
pub type SharedEngine = Arc<RwLock<AuctionEngine>>;

/// What a viewer does with a fetched snapshot that is not newer than the
/// last one it applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalenessPolicy {
    /// Apply every valid snapshot, accepting temporary rewinds
    #[default]
    Overwrite,
    /// Discard snapshots whose `lastUpdated` is not newer
    RejectStale,
}

/// Result of hammering the Live item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOutcome {
    pub item_id: String,
    pub status: ItemStatus,
    /// Winning bidder id, only when a bidder was charged
    pub winner_id: Option<String>,
    pub amount: Option<u64>,
}

pub struct AuctionEngine {
    role: SessionRole,
    staleness: StalenessPolicy,
    config: AuctionConfig,
    bidders: Vec<Bidder>,
    items: Vec<Item>,
    /// Newest first, scoped to the Live item
    bids: Vec<Bid>,
    countdown: Countdown,
    /// `lastUpdated` of the most recent remote snapshot applied
    last_applied: Option<i64>,
}

impl AuctionEngine {
    pub fn new(role: SessionRole, state: AuctionState, staleness: StalenessPolicy) -> Self {
        let mut engine = Self {
            role,
            staleness,
            config: AuctionConfig::default(),
            bidders: Vec::new(),
            items: Vec::new(),
            bids: Vec::new(),
            countdown: Countdown::new(0, false),
            last_applied: None,
        };
        engine.load(state);
        engine
    }

    fn load(&mut self, state: AuctionState) {
        self.countdown = Countdown::new(state.time_left, state.is_timer_running);
        self.config = state.config;
        self.bidders = state.bidders;
        self.items = state.items;
        self.bids = state.bids;
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn bidders(&self) -> &[Bidder] {
        &self.bidders
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    pub fn live_item(&self) -> Option<&Item> {
        self.items.iter().find(|item| item.status == ItemStatus::Live)
    }

    pub fn bidder(&self, bidder_id: &str) -> Option<&Bidder> {
        self.bidders.iter().find(|b| b.id == bidder_id)
    }

    /// Number of items a bidder has won
    pub fn squad_size(&self, bidder_id: &str) -> usize {
        self.items
            .iter()
            .filter(|item| item.owner_id.as_deref() == Some(bidder_id))
            .count()
    }

    /// Full state for persistence and publishing
    pub fn to_state(&self) -> AuctionState {
        AuctionState {
            config: self.config.clone(),
            bidders: self.bidders.clone(),
            items: self.items.clone(),
            bids: self.bids.clone(),
            time_left: self.countdown.remaining(),
            is_timer_running: self.countdown.is_running(),
        }
    }

    fn require_host(&self) -> AuctionResult<()> {
        if self.role.is_host() {
            Ok(())
        } else {
            Err(AuctionError::NotHost)
        }
    }

    fn live_index(&self) -> AuctionResult<usize> {
        self.items
            .iter()
            .position(|item| item.status == ItemStatus::Live)
            .ok_or(AuctionError::NoLiveItem)
    }

    /// Amount the next bid on the Live item would commit
    pub fn next_bid_amount(&self) -> Option<u64> {
        self.live_item().map(|item| {
            let price = item.asking_base();
            price.saturating_add(self.config.increment_for_price(price))
        })
    }

    /// Raise the Live item by one increment on behalf of a bidder.
    ///
    /// Every accepted bid restores the full countdown and keeps it running.
    pub fn place_bid(&mut self, bidder_id: &str) -> AuctionResult<Bid> {
        self.require_host()?;
        let live_idx = self.live_index()?;

        let bidder = self
            .bidder(bidder_id)
            .ok_or_else(|| AuctionError::UnknownBidder(bidder_id.to_string()))?;

        if self
            .bids
            .first()
            .is_some_and(|top| top.bidder_name == bidder.name)
        {
            return Err(AuctionError::AlreadyHighest(bidder.name.clone()));
        }

        if self.squad_size(&bidder.id) >= self.config.max_items_per_bidder as usize {
            return Err(AuctionError::SquadFull(bidder.name.clone()));
        }

        let item = &self.items[live_idx];
        let price = item.asking_base();
        let amount = price.saturating_add(self.config.increment_for_price(price));

        if !bidder.can_afford(amount) {
            return Err(AuctionError::InsufficientPurse {
                bidder: bidder.name.clone(),
                amount,
                remaining: bidder.remaining(),
            });
        }

        let bid = Bid {
            id: new_id(),
            item_id: item.id.clone(),
            bidder_name: bidder.name.clone(),
            amount,
            timestamp: Utc::now(),
        };

        info!("Bid | {} | {} -> {}", item.name, bid.bidder_name, amount);

        self.bids.insert(0, bid.clone());
        self.items[live_idx].current_bid = amount;
        self.countdown.reset(self.config.time_per_item);
        self.countdown.start();

        Ok(bid)
    }

    /// Drop the newest bid and fall back to the one beneath it.
    ///
    /// The countdown is restored but not resumed if it had stopped.
    pub fn undo_last_bid(&mut self) -> AuctionResult<Bid> {
        self.require_host()?;
        if self.bids.is_empty() {
            return Err(AuctionError::EmptyLedger);
        }

        let removed = self.bids.remove(0);
        let fallback = self.bids.first().map_or(0, |bid| bid.amount);

        if let Some(item) = self.items.iter_mut().find(|i| i.id == removed.item_id) {
            item.current_bid = fallback;
        }
        self.countdown.reset(self.config.time_per_item);

        info!(
            "Undo | {} by {} withdrawn, price back to {}",
            removed.amount, removed.bidder_name, fallback
        );
        Ok(removed)
    }

    /// Put the next item under the hammer.
    ///
    /// Any Live item goes back to Draft with its ledger cleared. The target is
    /// `explicit_id` when it names a Draft item, otherwise the first Draft item
    /// passing `filter`. Returns the promoted item id, or `None` when nothing
    /// was eligible; in that case the countdown is also stopped.
    pub fn start_next(
        &mut self,
        explicit_id: Option<&str>,
        filter: RoleFilter,
    ) -> AuctionResult<Option<String>> {
        self.require_host()?;

        for item in self.items.iter_mut().filter(|i| i.status == ItemStatus::Live) {
            debug!("Reverting {} to draft", item.name);
            item.status = ItemStatus::Draft;
            item.current_bid = 0;
        }
        self.bids.clear();

        let explicit = explicit_id.and_then(|id| {
            self.items
                .iter()
                .position(|i| i.id == id && i.status == ItemStatus::Draft)
        });
        let target = explicit.or_else(|| {
            self.items
                .iter()
                .position(|i| i.status == ItemStatus::Draft && filter.matches(i))
        });

        let Some(idx) = target else {
            self.countdown.stop();
            info!("No draft item left to start");
            return Ok(None);
        };

        let item = &mut self.items[idx];
        item.status = ItemStatus::Live;
        self.countdown.reset(self.config.time_per_item);

        info!("Live | {} ({}) at base {}", item.name, item.role.as_str(), item.base_price);
        Ok(Some(item.id.clone()))
    }

    /// Close bidding on the Live item.
    ///
    /// With `sold` and a winning bid, the newest bidder is charged and takes
    /// ownership. With `sold` but an empty ledger the item is labelled Sold
    /// without an owner and nobody is charged.
    pub fn finalize_sale(&mut self, sold: bool) -> AuctionResult<SaleOutcome> {
        self.require_host()?;
        let live_idx = self.live_index()?;

        let winner = if sold {
            self.bids.first().and_then(|top| {
                self.bidders
                    .iter()
                    .position(|b| b.name == top.bidder_name)
                    .map(|idx| (idx, top.amount))
            })
        } else {
            None
        };

        if let Some((bidder_idx, amount)) = winner {
            let bidder = &self.bidders[bidder_idx];
            if !bidder.can_afford(amount) {
                return Err(AuctionError::InsufficientPurse {
                    bidder: bidder.name.clone(),
                    amount,
                    remaining: bidder.remaining(),
                });
            }
        }

        let status = if sold { ItemStatus::Sold } else { ItemStatus::Unsold };
        let item = &mut self.items[live_idx];
        item.status = status;
        item.owner_id = None;

        let mut outcome = SaleOutcome {
            item_id: item.id.clone(),
            status,
            winner_id: None,
            amount: None,
        };

        if let Some((bidder_idx, amount)) = winner {
            let bidder = &mut self.bidders[bidder_idx];
            bidder.spent += amount;
            item.owner_id = Some(bidder.id.clone());
            item.current_bid = amount;
            outcome.winner_id = Some(bidder.id.clone());
            outcome.amount = Some(amount);
            info!("Sold | {} to {} for {}", item.name, bidder.name, amount);
        } else {
            info!("Closed | {} as {:?} without a charge", item.name, status);
        }

        self.countdown.stop();
        self.countdown.reset(self.config.time_per_item);
        self.bids.clear();

        Ok(outcome)
    }

    /// Advance the countdown by one tick. Returns whether state changed.
    pub fn tick(&mut self) -> bool {
        let changed = self.countdown.tick();
        if changed && !self.countdown.is_running() {
            info!("Countdown expired, waiting for the host to close the item");
        }
        changed
    }

    /// Replace the whole configuration after checking tier coverage
    pub fn update_config(&mut self, config: AuctionConfig) -> AuctionResult<()> {
        self.require_host()?;
        config.validate_tiers()?;
        self.config = config;
        Ok(())
    }

    /// Register a new bidder with the configured default budget
    pub fn add_bidder(&mut self, name: &str) -> AuctionResult<Bidder> {
        self.require_host()?;
        let bidder = Bidder::new(new_id(), name.trim(), self.config.default_budget);
        self.bidders.push(bidder.clone());
        Ok(bidder)
    }

    /// Remove a bidder that has neither won items nor bids on the ledger
    pub fn remove_bidder(&mut self, bidder_id: &str) -> AuctionResult<Bidder> {
        self.require_host()?;
        let idx = self
            .bidders
            .iter()
            .position(|b| b.id == bidder_id)
            .ok_or_else(|| AuctionError::UnknownBidder(bidder_id.to_string()))?;

        let bidder = &self.bidders[idx];
        let on_ledger = self.bids.iter().any(|bid| bid.bidder_name == bidder.name);
        if on_ledger || self.squad_size(bidder_id) > 0 {
            return Err(AuctionError::BidderInUse(bidder.name.clone()));
        }

        Ok(self.bidders.remove(idx))
    }

    /// Rename a bidder or change its budget. The ledger names bidders, so a
    /// rename is refused while the bidder holds a bid.
    pub fn update_bidder(&mut self, bidder_id: &str, name: &str, budget: u64) -> AuctionResult<Bidder> {
        self.require_host()?;
        let idx = self
            .bidders
            .iter()
            .position(|b| b.id == bidder_id)
            .ok_or_else(|| AuctionError::UnknownBidder(bidder_id.to_string()))?;

        let name = name.trim();
        let bidder = &self.bidders[idx];
        if budget < bidder.spent {
            return Err(AuctionError::BudgetBelowSpent {
                bidder: bidder.name.clone(),
                budget,
                spent: bidder.spent,
            });
        }
        if name != bidder.name && self.bids.iter().any(|bid| bid.bidder_name == bidder.name) {
            return Err(AuctionError::BidderInUse(bidder.name.clone()));
        }

        let bidder = &mut self.bidders[idx];
        bidder.name = name.to_string();
        bidder.budget = budget;
        Ok(bidder.clone())
    }

    /// Drop an item from the catalogue. Live and Sold items stay put.
    pub fn remove_item(&mut self, item_id: &str) -> AuctionResult<Item> {
        self.require_host()?;
        let idx = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| AuctionError::UnknownItem(item_id.to_string()))?;

        if matches!(self.items[idx].status, ItemStatus::Live | ItemStatus::Sold) {
            return Err(AuctionError::ItemLocked(self.items[idx].name.clone()));
        }

        let item = self.items.remove(idx);
        info!("Removed item {} ({})", item.name, item.id);
        Ok(item)
    }

    /// Append imported items as Draft. All or nothing on id collisions.
    pub fn append_items(&mut self, items: Vec<Item>) -> AuctionResult<usize> {
        self.require_host()?;

        let mut seen: std::collections::HashSet<&str> =
            self.items.iter().map(|i| i.id.as_str()).collect();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(AuctionError::DuplicateItem(item.id.clone()));
            }
        }

        let count = items.len();
        self.items.extend(items.into_iter().map(|mut item| {
            item.status = ItemStatus::Draft;
            item.current_bid = 0;
            item.owner_id = None;
            item
        }));

        info!("Appended {} items", count);
        Ok(count)
    }

    /// Overwrite local state wholesale with a fetched snapshot.
    ///
    /// Returns `false` when the staleness policy discarded it.
    pub fn apply_remote(&mut self, snapshot: Snapshot) -> AuctionResult<bool> {
        if self.role.is_host() {
            return Err(AuctionError::NotViewer);
        }

        if self.staleness == StalenessPolicy::RejectStale
            && self
                .last_applied
                .is_some_and(|last| snapshot.last_updated <= last)
        {
            debug!(
                "Discarding stale snapshot ({} <= {:?})",
                snapshot.last_updated, self.last_applied
            );
            return Ok(false);
        }

        self.last_applied = Some(snapshot.last_updated);
        self.load(snapshot.state);
        Ok(true)
    }

    pub fn last_applied(&self) -> Option<i64> {
        self.last_applied
    }

    /// Return to the built-in default state
    pub fn reset(&mut self) {
        self.last_applied = None;
        self.load(AuctionState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BidRange, ItemRole};

    fn tiered_config() -> AuctionConfig {
        AuctionConfig {
            bid_ranges: vec![
                BidRange::new(0, Some(50_000), 2_000),
                BidRange::new(50_001, Some(200_000), 5_000),
                BidRange::new(200_001, None, 10_000),
            ],
            time_per_item: 30,
            max_items_per_bidder: 2,
            ..AuctionConfig::default()
        }
    }

    fn host_with(items: Vec<Item>, bidders: Vec<Bidder>) -> AuctionEngine {
        let config = tiered_config();
        let state = AuctionState {
            time_left: config.time_per_item,
            config,
            bidders,
            items,
            bids: Vec::new(),
            is_timer_running: false,
        };
        AuctionEngine::new(SessionRole::Host, state, StalenessPolicy::Overwrite)
    }

    fn two_bidders() -> Vec<Bidder> {
        vec![
            Bidder::new("a", "Alpha", 1_000_000),
            Bidder::new("b", "Bravo", 1_000_000),
        ]
    }

    fn live_engine() -> AuctionEngine {
        let mut engine = host_with(
            vec![
                Item::draft("p1", "First", ItemRole::Batsman, 50_000),
                Item::draft("p2", "Second", ItemRole::Bowler, 10_000),
            ],
            two_bidders(),
        );
        engine.start_next(None, RoleFilter::All).unwrap();
        engine
    }

    fn live_count(engine: &AuctionEngine) -> usize {
        engine
            .items()
            .iter()
            .filter(|i| i.status == ItemStatus::Live)
            .count()
    }

    #[test]
    fn test_first_bid_uses_tier_of_base_price() {
        let mut engine = live_engine();

        let bid = engine.place_bid("a").unwrap();
        assert_eq!(bid.amount, 52_000);
        assert_eq!(engine.live_item().unwrap().current_bid, 52_000);

        // 52_000 sits in the second tier
        let bid = engine.place_bid("b").unwrap();
        assert_eq!(bid.amount, 57_000);
        assert_eq!(engine.bids().len(), 2);
        assert_eq!(engine.bids()[0].bidder_name, "Bravo");
    }

    #[test]
    fn test_bid_starts_and_resets_countdown() {
        let mut engine = live_engine();
        assert!(!engine.countdown().is_running());

        engine.place_bid("a").unwrap();
        engine.tick();
        engine.tick();
        assert_eq!(engine.countdown().remaining(), 28);

        engine.place_bid("b").unwrap();
        assert_eq!(engine.countdown().remaining(), 30);
        assert!(engine.countdown().is_running());
    }

    #[test]
    fn test_repeated_highest_bid_rejected_without_change() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();
        let before = engine.to_state();

        for _ in 0..2 {
            let err = engine.place_bid("a").unwrap_err();
            assert_eq!(err, AuctionError::AlreadyHighest("Alpha".to_string()));
            assert_eq!(engine.to_state(), before);
        }
    }

    #[test]
    fn test_insufficient_purse() {
        let mut bidders = two_bidders();
        bidders[0].budget = 100_000;
        bidders[0].spent = 95_000;
        let mut engine = host_with(
            vec![Item::draft("p1", "First", ItemRole::Batsman, 8_000)],
            bidders,
        );
        engine.start_next(None, RoleFilter::All).unwrap();

        let err = engine.place_bid("a").unwrap_err();
        assert!(matches!(err, AuctionError::InsufficientPurse { amount: 10_000, .. }));
        assert_eq!(engine.bidder("a").unwrap().spent, 95_000);
        assert!(engine.bids().is_empty());
    }

    #[test]
    fn test_squad_full() {
        let mut engine = host_with(
            vec![
                Item::draft("p1", "One", ItemRole::Batsman, 1_000),
                Item::draft("p2", "Two", ItemRole::Batsman, 1_000),
                Item::draft("p3", "Three", ItemRole::Batsman, 1_000),
            ],
            two_bidders(),
        );

        for _ in 0..2 {
            engine.start_next(None, RoleFilter::All).unwrap();
            engine.place_bid("a").unwrap();
            engine.finalize_sale(true).unwrap();
        }

        engine.start_next(None, RoleFilter::All).unwrap();
        let err = engine.place_bid("a").unwrap_err();
        assert_eq!(err, AuctionError::SquadFull("Alpha".to_string()));
        assert!(engine.place_bid("b").is_ok());
    }

    #[test]
    fn test_precondition_order() {
        let mut viewer = AuctionEngine::new(
            SessionRole::Viewer,
            AuctionState::default(),
            StalenessPolicy::Overwrite,
        );
        assert_eq!(viewer.place_bid("1"), Err(AuctionError::NotHost));

        let mut engine = host_with(
            vec![Item::draft("p1", "First", ItemRole::Batsman, 1_000)],
            two_bidders(),
        );
        assert_eq!(engine.place_bid("zz"), Err(AuctionError::NoLiveItem));

        engine.start_next(None, RoleFilter::All).unwrap();
        assert_eq!(
            engine.place_bid("zz"),
            Err(AuctionError::UnknownBidder("zz".to_string()))
        );
    }

    #[test]
    fn test_undo_single_bid_returns_to_zero() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();
        engine.tick();

        let removed = engine.undo_last_bid().unwrap();
        assert_eq!(removed.amount, 52_000);
        assert_eq!(engine.live_item().unwrap().current_bid, 0);
        assert!(engine.bids().is_empty());
        assert_eq!(engine.countdown().remaining(), 30);
    }

    #[test]
    fn test_undo_falls_back_to_previous_bid() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();
        engine.place_bid("b").unwrap();

        engine.undo_last_bid().unwrap();
        assert_eq!(engine.live_item().unwrap().current_bid, 52_000);
        assert_eq!(engine.bids()[0].bidder_name, "Alpha");

        // Alpha is highest again
        assert!(matches!(engine.place_bid("a"), Err(AuctionError::AlreadyHighest(_))));
    }

    #[test]
    fn test_undo_does_not_resume_stopped_countdown() {
        let mut state = AuctionState::default();
        state.config.time_per_item = 1;
        state.time_left = 1;
        let mut engine = AuctionEngine::new(SessionRole::Host, state, StalenessPolicy::Overwrite);

        engine.place_bid("1").unwrap();
        engine.tick();
        assert!(!engine.countdown().is_running());

        engine.undo_last_bid().unwrap();
        assert!(!engine.countdown().is_running());
        assert_eq!(engine.countdown().remaining(), 1);
    }

    #[test]
    fn test_undo_empty_ledger() {
        let mut engine = live_engine();
        assert_eq!(engine.undo_last_bid(), Err(AuctionError::EmptyLedger));
    }

    #[test]
    fn test_start_next_reverts_previous_live_item() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();

        let started = engine.start_next(Some("p2"), RoleFilter::All).unwrap();
        assert_eq!(started.as_deref(), Some("p2"));
        assert_eq!(live_count(&engine), 1);

        let first = engine.items().iter().find(|i| i.id == "p1").unwrap();
        assert_eq!(first.status, ItemStatus::Draft);
        assert_eq!(first.current_bid, 0);
        assert!(engine.bids().is_empty());
    }

    #[test]
    fn test_start_next_honours_role_filter() {
        let mut engine = host_with(
            vec![
                Item::draft("p1", "Bat", ItemRole::Batsman, 1_000),
                Item::draft("p2", "Ball", ItemRole::Bowler, 1_000),
            ],
            two_bidders(),
        );

        let started = engine
            .start_next(None, RoleFilter::Only(ItemRole::Bowler))
            .unwrap();
        assert_eq!(started.as_deref(), Some("p2"));
    }

    #[test]
    fn test_start_next_with_non_draft_explicit_falls_back() {
        let mut engine = live_engine();
        engine.finalize_sale(false).unwrap();

        let started = engine.start_next(Some("p1"), RoleFilter::All).unwrap();
        assert_eq!(started.as_deref(), Some("p2"));
    }

    #[test]
    fn test_start_next_without_target_only_reverts() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();

        let started = engine
            .start_next(None, RoleFilter::Only(ItemRole::Wicketkeeper))
            .unwrap();
        assert_eq!(started, None);
        assert_eq!(live_count(&engine), 0);
        assert!(engine.bids().is_empty());
        assert!(!engine.countdown().is_running());
    }

    #[test]
    fn test_start_then_unsold_round_trip() {
        let mut engine = live_engine();
        let budgets: Vec<u64> = engine.bidders().iter().map(|b| b.spent).collect();

        let outcome = engine.finalize_sale(false).unwrap();
        assert_eq!(outcome.status, ItemStatus::Unsold);
        assert_eq!(outcome.winner_id, None);

        let item = engine.items().iter().find(|i| i.id == "p1").unwrap();
        assert_eq!(item.status, ItemStatus::Unsold);
        assert_eq!(item.owner_id, None);
        assert!(engine.bids().is_empty());
        let after: Vec<u64> = engine.bidders().iter().map(|b| b.spent).collect();
        assert_eq!(budgets, after);
    }

    #[test]
    fn test_sale_charges_newest_bidder_and_freezes_price() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();
        engine.place_bid("b").unwrap();

        let outcome = engine.finalize_sale(true).unwrap();
        assert_eq!(outcome.winner_id.as_deref(), Some("b"));
        assert_eq!(outcome.amount, Some(57_000));

        let item = engine.items().iter().find(|i| i.id == "p1").unwrap();
        assert_eq!(item.status, ItemStatus::Sold);
        assert_eq!(item.owner_id.as_deref(), Some("b"));
        assert_eq!(item.current_bid, 57_000);
        assert_eq!(engine.bidder("b").unwrap().spent, 57_000);
        assert_eq!(engine.bidder("a").unwrap().spent, 0);
        assert!(engine.bids().is_empty());
        assert!(!engine.countdown().is_running());
        assert_eq!(engine.countdown().remaining(), 30);
    }

    // Sold with an empty ledger keeps the requested label but charges nobody.
    // The other reading, relabelling the item Unsold as a plain "no sale"
    // would, is deliberately not taken; see DESIGN.md.
    #[test]
    fn test_sold_without_bids_charges_nobody() {
        let mut engine = live_engine();

        let outcome = engine.finalize_sale(true).unwrap();
        assert_eq!(outcome.status, ItemStatus::Sold);
        assert_eq!(outcome.winner_id, None);

        let item = engine.items().iter().find(|i| i.id == "p1").unwrap();
        assert_eq!(item.owner_id, None);
        assert_ne!(item.status, ItemStatus::Live);
        assert!(engine.bidders().iter().all(|b| b.spent == 0));
        assert_eq!(engine.squad_size("a"), 0);
    }

    #[test]
    fn test_finalize_requires_live_item() {
        let mut engine = host_with(Vec::new(), two_bidders());
        assert_eq!(engine.finalize_sale(true), Err(AuctionError::NoLiveItem));
    }

    #[test]
    fn test_finalize_rechecks_purse() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();
        engine.bidders[0].budget = 10_000;

        let before = engine.to_state();
        assert!(matches!(
            engine.finalize_sale(true),
            Err(AuctionError::InsufficientPurse { .. })
        ));
        assert_eq!(engine.to_state(), before);
    }

    #[test]
    fn test_update_config_validates_tiers() {
        let mut engine = live_engine();
        let mut config = engine.config().clone();
        config.bid_ranges.pop();

        assert!(matches!(
            engine.update_config(config),
            Err(AuctionError::InvalidTiers(_))
        ));
        assert_eq!(engine.config().bid_ranges.len(), 3);
    }

    #[test]
    fn test_append_items_forces_draft_and_rejects_duplicates() {
        let mut engine = live_engine();
        let mut imported = Item::draft("p9", "Imported", ItemRole::Bowler, 5_000);
        imported.status = ItemStatus::Live;
        imported.current_bid = 999;

        assert_eq!(engine.append_items(vec![imported]).unwrap(), 1);
        let stored = engine.items().iter().find(|i| i.id == "p9").unwrap();
        assert_eq!(stored.status, ItemStatus::Draft);
        assert_eq!(stored.current_bid, 0);
        assert_eq!(live_count(&engine), 1);

        let dup = vec![
            Item::draft("p10", "New", ItemRole::Bowler, 5_000),
            Item::draft("p1", "Clash", ItemRole::Bowler, 5_000),
        ];
        assert!(matches!(engine.append_items(dup), Err(AuctionError::DuplicateItem(_))));
        assert_eq!(engine.items().len(), 3);
    }

    #[test]
    fn test_bidder_management() {
        let mut engine = live_engine();
        let added = engine.add_bidder(" Charlie ").unwrap();
        assert_eq!(added.name, "Charlie");
        assert_eq!(added.budget, engine.config().default_budget);

        engine.place_bid("a").unwrap();
        assert!(matches!(engine.remove_bidder("a"), Err(AuctionError::BidderInUse(_))));
        assert_eq!(engine.remove_bidder(&added.id).unwrap().name, "Charlie");
        assert!(matches!(engine.remove_bidder("nope"), Err(AuctionError::UnknownBidder(_))));
    }

    #[test]
    fn test_update_bidder() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();
        engine.finalize_sale(true).unwrap();

        let updated = engine.update_bidder("a", " Alpha XI ", 2_000_000).unwrap();
        assert_eq!(updated.name, "Alpha XI");
        assert_eq!(engine.bidder("a").unwrap().budget, 2_000_000);

        let before = engine.to_state();
        assert!(matches!(
            engine.update_bidder("a", "Alpha XI", 10_000),
            Err(AuctionError::BudgetBelowSpent { spent: 52_000, .. })
        ));
        assert_eq!(engine.to_state(), before);

        engine.start_next(None, RoleFilter::All).unwrap();
        engine.place_bid("b").unwrap();
        let before_rename = engine.to_state();
        assert!(matches!(
            engine.update_bidder("b", "Renamed", 1_000_000),
            Err(AuctionError::BidderInUse(_))
        ));
        assert_eq!(engine.to_state(), before_rename);

        // Budget alone may change while bidding
        assert!(engine.update_bidder("b", "Bravo", 3_000_000).is_ok());
    }

    #[test]
    fn test_remove_item_refuses_live_and_sold() {
        let mut engine = live_engine();
        assert!(matches!(engine.remove_item("p1"), Err(AuctionError::ItemLocked(_))));
        assert!(matches!(engine.remove_item("zz"), Err(AuctionError::UnknownItem(_))));

        engine.place_bid("a").unwrap();
        engine.finalize_sale(true).unwrap();
        assert!(matches!(engine.remove_item("p1"), Err(AuctionError::ItemLocked(_))));

        assert_eq!(engine.remove_item("p2").unwrap().name, "Second");
        assert_eq!(engine.items().len(), 1);
    }

    #[test]
    fn test_apply_remote_overwrites_viewer_state() {
        let mut host = live_engine();
        host.place_bid("a").unwrap();
        let snapshot = Snapshot {
            state: host.to_state(),
            last_updated: 100,
        };

        let mut viewer = AuctionEngine::new(
            SessionRole::Viewer,
            AuctionState::default(),
            StalenessPolicy::Overwrite,
        );
        assert!(viewer.apply_remote(snapshot.clone()).unwrap());
        assert_eq!(viewer.to_state(), host.to_state());

        assert_eq!(host.apply_remote(snapshot), Err(AuctionError::NotViewer));
    }

    #[test]
    fn test_older_snapshot_overwrites_by_default() {
        let mut viewer = AuctionEngine::new(
            SessionRole::Viewer,
            AuctionState::default(),
            StalenessPolicy::Overwrite,
        );
        let mut newer = AuctionState::default();
        newer.config.title = "newer".to_string();
        let mut older = AuctionState::default();
        older.config.title = "older".to_string();

        viewer.apply_remote(Snapshot { state: newer, last_updated: 200 }).unwrap();
        assert!(viewer.apply_remote(Snapshot { state: older, last_updated: 100 }).unwrap());
        assert_eq!(viewer.config().title, "older");
        assert_eq!(viewer.last_applied(), Some(100));
    }

    #[test]
    fn test_reject_stale_keeps_newer_state() {
        let mut viewer = AuctionEngine::new(
            SessionRole::Viewer,
            AuctionState::default(),
            StalenessPolicy::RejectStale,
        );
        let mut newer = AuctionState::default();
        newer.config.title = "newer".to_string();
        let mut older = AuctionState::default();
        older.config.title = "older".to_string();

        viewer.apply_remote(Snapshot { state: newer.clone(), last_updated: 200 }).unwrap();
        assert!(!viewer.apply_remote(Snapshot { state: older, last_updated: 100 }).unwrap());
        assert!(!viewer.apply_remote(Snapshot { state: newer, last_updated: 200 }).unwrap());
        assert_eq!(viewer.config().title, "newer");
        assert_eq!(viewer.last_applied(), Some(200));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut engine = live_engine();
        engine.place_bid("a").unwrap();

        engine.reset();
        assert_eq!(engine.to_state(), AuctionState::default());
    }
}
