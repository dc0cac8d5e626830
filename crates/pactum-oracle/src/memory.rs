//! In-memory feed registries
//!
//! Concrete registries backed by concurrent maps, used as the default wiring
//! in embedders that manage feed handles directly and as fixtures in tests.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use pactum_common::{Address, Denomination, Result};

use crate::feed::{FeedRegistry, PairFeedRegistry, PriceFeed, PriceRound};

/// A feed returning a fixed answer; mutable so tests can move the price
pub struct StaticFeed {
    round: Mutex<PriceRound>,
    decimals: u8,
}

impl StaticFeed {
    pub fn new(price: i128, updated_at: u64, decimals: u8) -> Arc<Self> {
        Arc::new(Self {
            round: Mutex::new(PriceRound { price, updated_at }),
            decimals,
        })
    }

    pub fn set(&self, price: i128, updated_at: u64) {
        *self.round.lock() = PriceRound { price, updated_at };
    }
}

impl PriceFeed for StaticFeed {
    fn latest_round(&self) -> Result<PriceRound> {
        Ok(*self.round.lock())
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }
}

/// Denomination-keyed registry with an optional ETH/USD reconciliation feed
#[derive(Default)]
pub struct InMemoryFeedRegistry {
    feeds: DashMap<(Address, Denomination), Arc<dyn PriceFeed>>,
    eth_usd: Mutex<Option<Arc<dyn PriceFeed>>>,
}

impl InMemoryFeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_asset_feed(
        &self,
        asset: Address,
        denomination: Denomination,
        feed: Arc<dyn PriceFeed>,
    ) {
        self.feeds.insert((asset, denomination), feed);
    }

    pub fn set_eth_usd_feed(&self, feed: Arc<dyn PriceFeed>) {
        *self.eth_usd.lock() = Some(feed);
    }
}

impl FeedRegistry for InMemoryFeedRegistry {
    fn asset_feed(
        &self,
        asset: &Address,
        denomination: Denomination,
    ) -> Option<Arc<dyn PriceFeed>> {
        self.feeds
            .get(&(*asset, denomination))
            .map(|feed| Arc::clone(&feed))
    }

    fn eth_usd_feed(&self) -> Option<Arc<dyn PriceFeed>> {
        self.eth_usd.lock().clone()
    }
}

/// Pair-keyed registry for conversion chains
#[derive(Default)]
pub struct InMemoryPairFeedRegistry {
    feeds: DashMap<(Address, Address), Arc<dyn PriceFeed>>,
}

impl InMemoryPairFeedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pair_feed(&self, base: Address, quote: Address, feed: Arc<dyn PriceFeed>) {
        self.feeds.insert((base, quote), feed);
    }
}

impl PairFeedRegistry for InMemoryPairFeedRegistry {
    fn pair_feed(&self, base: &Address, quote: &Address) -> Option<Arc<dyn PriceFeed>> {
        self.feeds
            .get(&(*base, *quote))
            .map(|feed| Arc::clone(&feed))
    }
}
