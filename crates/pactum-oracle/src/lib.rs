//! # Pactum Oracle
//!
//! External price data for the oracle-priced proposal variants:
//!
//! - [`feed`]: Chainlink-style feed traits, staleness/non-positive-answer
//!   validation, USD-first/ETH-fallback resolution, and ETH-USD
//!   denomination reconciliation
//! - [`sequencer`]: L2 sequencer uptime gate with a post-restart grace period
//! - [`ltv`]: loan-to-value collateral sizing over reconciled prices
//! - [`lp`]: concentrated-liquidity position appraisal with bounded
//!   feed-chain conversion
//! - [`memory`]: in-memory registry implementations
//!
//! Feed reads are synchronous reads inside the caller's atomic transaction;
//! a stale or missing feed fails the whole acceptance rather than retrying.

pub mod feed;
pub mod lp;
pub mod ltv;
pub mod memory;
pub mod sequencer;

pub use feed::{
    AssetPrice, FeedConfig, FeedRegistry, PairFeedRegistry, PriceFeed, PriceRound, PriceSource,
};
pub use lp::{
    ConversionChain, LpPosition, PoolPriceSource, PositionSource, MAX_INTERMEDIARY_DENOMINATIONS,
    Q96,
};
pub use ltv::collateral_for_credit;
pub use memory::{InMemoryFeedRegistry, InMemoryPairFeedRegistry, StaticFeed};
pub use sequencer::{check_sequencer, SequencerOracle, SequencerStatus};
