//! Concentrated-liquidity position appraisal
//!
//! Values a liquidity-position token in credit-asset units:
//! 1. Recover the position's underlying token amounts from its liquidity,
//!    its bound sqrt-prices, and the pool's current sqrt-price (Q96
//!    fixed point), plus fees already owed to the position
//! 2. Express the whole position in one of the pair's tokens
//! 3. Convert into the credit asset through a chain of pair feeds, capped at
//!    two intermediary denominations, with per-hop inversion flags for pairs
//!    that only exist inverted
//!
//! All products run through 256-bit intermediates; every division rounds
//! toward zero.

use serde::{Deserialize, Serialize};

use pactum_common::error::{OracleError, ProposalError};
use pactum_common::math::{checked_add, mul_div_floor};
use pactum_common::{Address, Result};

use crate::feed::{convert_amount, read_feed, PairFeedRegistry};

/// Q64.96 fixed-point unit used by pool sqrt-prices
pub const Q96: u128 = 1 << 96;

/// Maximum intermediary denominations in a conversion chain
pub const MAX_INTERMEDIARY_DENOMINATIONS: usize = 2;

/// A concentrated-liquidity position and its price bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpPosition {
    pub token0: Address,
    pub token1: Address,
    pub liquidity: u128,
    /// sqrt-price at the lower bound, Q64.96
    pub sqrt_price_lower_x96: u128,
    /// sqrt-price at the upper bound, Q64.96
    pub sqrt_price_upper_x96: u128,
    /// Fees already owed to the position, in token0 units
    pub fee_owed0: u128,
    /// Fees already owed to the position, in token1 units
    pub fee_owed1: u128,
}

impl LpPosition {
    /// Whether the position's pair equals (a, b) in either order
    pub fn matches_pair(&self, a: &Address, b: &Address) -> bool {
        (self.token0 == *a && self.token1 == *b) || (self.token0 == *b && self.token1 == *a)
    }
}

/// Source of position data (the position-token manager)
pub trait PositionSource: Send + Sync {
    fn position(&self, token_id: u128) -> Result<LpPosition>;
}

/// Source of current pool prices for a token pair
pub trait PoolPriceSource: Send + Sync {
    /// Current sqrt-price of the (token0, token1) pool, Q64.96
    fn sqrt_price_x96(&self, token0: &Address, token1: &Address) -> Result<u128>;
}

/// Underlying (token0, token1) amounts of a position at the given pool
/// price, including owed fees.
///
/// The current price is clamped into the position's range: out-of-range
/// positions hold only one of the two tokens.
pub fn position_token_amounts(
    position: &LpPosition,
    sqrt_price_x96: u128,
) -> Result<(u128, u128)> {
    let lower = position.sqrt_price_lower_x96;
    let upper = position.sqrt_price_upper_x96;
    let current = sqrt_price_x96.clamp(lower, upper);
    let liquidity = position.liquidity;

    // amount0 = L * (upper - current) * Q96 / (upper * current)
    let amount0 = if current < upper {
        let step = mul_div_floor(liquidity, upper - current, upper)?;
        mul_div_floor(step, Q96, current)?
    } else {
        0
    };

    // amount1 = L * (current - lower) / Q96
    let amount1 = if current > lower {
        mul_div_floor(liquidity, current - lower, Q96)?
    } else {
        0
    };

    Ok((
        checked_add(amount0, position.fee_owed0)?,
        checked_add(amount1, position.fee_owed1)?,
    ))
}

/// Conversion path from a pair token to the credit asset.
///
/// `invert_flags[i]` marks the i-th hop's feed as quoting the inverse pair.
/// Both vectors empty means the position token already is the credit asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionChain {
    pub intermediaries: Vec<Address>,
    pub invert_flags: Vec<bool>,
}

impl ConversionChain {
    /// Identity chain: no conversion
    pub fn identity() -> Self {
        Self::default()
    }

    /// Single-feed chain from the base token straight to the credit asset
    pub fn direct(invert: bool) -> Self {
        Self {
            intermediaries: Vec::new(),
            invert_flags: vec![invert],
        }
    }

    pub fn is_identity(&self) -> bool {
        self.intermediaries.is_empty() && self.invert_flags.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.intermediaries.len() > MAX_INTERMEDIARY_DENOMINATIONS {
            return Err(ProposalError::TooManyFeedHops {
                hops: self.intermediaries.len(),
                max: MAX_INTERMEDIARY_DENOMINATIONS,
            }
            .into());
        }
        if !self.is_identity() && self.invert_flags.len() != self.intermediaries.len() + 1 {
            return Err(ProposalError::InvalidInvertFlagCount {
                flags: self.invert_flags.len(),
                expected: self.intermediaries.len() + 1,
            }
            .into());
        }
        Ok(())
    }
}

/// Convert `amount` of `base` into `quote` units through the chain's feeds
pub fn convert_through_chain(
    registry: &dyn PairFeedRegistry,
    now: u64,
    max_price_age: u64,
    mut amount: u128,
    base: &Address,
    quote: &Address,
    chain: &ConversionChain,
) -> Result<u128> {
    chain.validate()?;

    if chain.is_identity() {
        return Ok(amount);
    }

    let mut path = Vec::with_capacity(chain.intermediaries.len() + 2);
    path.push(*base);
    path.extend_from_slice(&chain.intermediaries);
    path.push(*quote);

    for (i, invert) in chain.invert_flags.iter().copied().enumerate() {
        let (from, to) = (path[i], path[i + 1]);
        let (feed_base, feed_quote) = if invert { (to, from) } else { (from, to) };

        let feed = registry.pair_feed(&feed_base, &feed_quote).ok_or(
            OracleError::PairFeedNotFound {
                base: feed_base,
                quote: feed_quote,
            },
        )?;
        let (price, decimals) = read_feed(feed.as_ref(), &feed_base, now, max_price_age)?;
        amount = convert_amount(amount, price, decimals, invert)?;
    }

    Ok(amount)
}

/// Value a position in credit-asset units.
///
/// The side of the pair the chain starts from is picked for the caller: a
/// position over (credit, X) is valued in the credit token directly, any
/// other position is expressed in token0 and converted through `chain`.
pub fn appraise_position(
    registry: &dyn PairFeedRegistry,
    now: u64,
    max_price_age: u64,
    position: &LpPosition,
    sqrt_price_x96: u128,
    credit_asset: &Address,
    chain: &ConversionChain,
) -> Result<u128> {
    let (amount0, amount1) = position_token_amounts(position, sqrt_price_x96)?;

    if position.token1 == *credit_asset {
        // amount0 in token1 terms: amount0 * price, price = (sqrt/Q96)^2
        let step = mul_div_floor(amount0, sqrt_price_x96, Q96)?;
        let amount0_in_1 = mul_div_floor(step, sqrt_price_x96, Q96)?;
        return checked_add(amount1, amount0_in_1).map_err(Into::into);
    }

    // express everything in token0, then convert
    let step = mul_div_floor(amount1, Q96, sqrt_price_x96)?;
    let amount1_in_0 = mul_div_floor(step, Q96, sqrt_price_x96)?;
    let total0 = checked_add(amount0, amount1_in_0)?;

    if position.token0 == *credit_asset {
        return Ok(total0);
    }
    convert_through_chain(
        registry,
        now,
        max_price_age,
        total0,
        &position.token0,
        credit_asset,
        chain,
    )
}
