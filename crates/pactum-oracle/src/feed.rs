//! Price feed access
//!
//! Chainlink-style feed handles behind registry traits, plus the validation
//! every read goes through: non-positive answers and answers older than the
//! configured maximum age reject the whole acceptance. Assets resolve
//! against the USD denomination first, falling back to ETH; mixed
//! denominations are reconciled through the live ETH/USD feed before any
//! ratio is computed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pactum_common::error::OracleError;
use pactum_common::math::{checked_mul, mul_div_floor};
use pactum_common::{Address, Denomination, Result};

/// One price answer from a feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRound {
    /// Signed answer; non-positive values are rejected
    pub price: i128,
    /// Unix seconds of the answer's last update
    pub updated_at: u64,
}

/// A single price feed handle
pub trait PriceFeed: Send + Sync {
    fn latest_round(&self) -> Result<PriceRound>;
    fn decimals(&self) -> u8;
}

/// Registry of feeds keyed by (asset, reference denomination)
pub trait FeedRegistry: Send + Sync {
    /// Feed pricing `asset` in `denomination`, if one exists
    fn asset_feed(&self, asset: &Address, denomination: Denomination)
        -> Option<Arc<dyn PriceFeed>>;

    /// The ETH/USD feed used for denomination reconciliation
    fn eth_usd_feed(&self) -> Option<Arc<dyn PriceFeed>>;
}

/// Registry of feeds keyed by an (base, quote) asset pair, used for
/// multi-hop conversion chains
pub trait PairFeedRegistry: Send + Sync {
    fn pair_feed(&self, base: &Address, quote: &Address) -> Option<Arc<dyn PriceFeed>>;
}

/// Feed-read policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Maximum accepted age of a price answer in seconds
    pub max_price_age: u64,
    /// Grace period after a sequencer restart in seconds
    pub sequencer_grace_period: u64,
    /// WETH address mapped onto the ETH/USD feed (no native WETH feed exists)
    pub weth: Option<Address>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_price_age: 24 * 60 * 60,
            sequencer_grace_period: 600,
            weth: None,
        }
    }
}

/// A validated, positive price with its scale and denomination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPrice {
    pub price: u128,
    pub decimals: u8,
    pub denomination: Denomination,
}

/// Read a feed and apply the non-positive and staleness checks
pub fn read_feed(
    feed: &dyn PriceFeed,
    asset: &Address,
    now: u64,
    max_age: u64,
) -> Result<(u128, u8)> {
    let round = feed.latest_round()?;

    if round.price <= 0 {
        return Err(OracleError::NonPositivePrice {
            asset: *asset,
            price: round.price,
        }
        .into());
    }

    let age = now.saturating_sub(round.updated_at);
    if age > max_age {
        return Err(OracleError::StalePrice {
            asset: *asset,
            age,
            max_age,
        }
        .into());
    }

    Ok((round.price as u128, feed.decimals()))
}

/// Feed resolution and denomination reconciliation over a [`FeedRegistry`]
pub struct PriceSource<R: ?Sized> {
    registry: Arc<R>,
    config: FeedConfig,
}

impl<R: FeedRegistry + ?Sized> PriceSource<R> {
    pub fn new(registry: Arc<R>, config: FeedConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Price of `asset`, trying the USD denomination first, then ETH.
    ///
    /// WETH is mapped onto the ETH/USD feed.
    pub fn fetch_price(&self, now: u64, asset: &Address) -> Result<AssetPrice> {
        if Some(*asset) == self.config.weth {
            let feed = self
                .registry
                .eth_usd_feed()
                .ok_or(OracleError::FeedNotFound {
                    asset: *asset,
                    denomination: Denomination::Usd,
                })?;
            let (price, decimals) = read_feed(feed.as_ref(), asset, now, self.config.max_price_age)?;
            return Ok(AssetPrice {
                price,
                decimals,
                denomination: Denomination::Usd,
            });
        }

        for denomination in [Denomination::Usd, Denomination::Eth] {
            if let Some(feed) = self.registry.asset_feed(asset, denomination) {
                let (price, decimals) =
                    read_feed(feed.as_ref(), asset, now, self.config.max_price_age)?;
                return Ok(AssetPrice {
                    price,
                    decimals,
                    denomination,
                });
            }
        }

        Err(OracleError::FeedNotFound {
            asset: *asset,
            denomination: Denomination::Eth,
        }
        .into())
    }

    /// Prices of the credit and collateral assets brought to a common
    /// denomination and a common decimal scale.
    ///
    /// When one side is USD-denominated and the other ETH-denominated, the
    /// ETH-denominated price is multiplied through the live ETH/USD feed
    /// (multiplying rather than dividing keeps the reconciliation lossless).
    pub fn fetch_common_prices(
        &self,
        now: u64,
        credit: &Address,
        collateral: &Address,
    ) -> Result<(AssetPrice, AssetPrice)> {
        let credit_price = self.fetch_price(now, credit)?;
        let collateral_price = self.fetch_price(now, collateral)?;

        let (credit_price, collateral_price) = if credit_price.denomination
            == collateral_price.denomination
        {
            (credit_price, collateral_price)
        } else {
            // one side USD, the other ETH: reconcile through ETH/USD
            let feed = self
                .registry
                .eth_usd_feed()
                .ok_or(OracleError::NoCommonDenominator {
                    credit: *credit,
                    collateral: *collateral,
                })?;

            if credit_price.denomination == Denomination::Eth {
                (
                    self.convert_eth_to_usd(now, credit, credit_price, feed.as_ref())?,
                    collateral_price,
                )
            } else {
                (
                    credit_price,
                    self.convert_eth_to_usd(now, collateral, collateral_price, feed.as_ref())?,
                )
            }
        };

        debug!(
            credit_price = credit_price.price,
            collateral_price = collateral_price.price,
            denomination = %credit_price.denomination,
            "prices reconciled"
        );
        Ok(scale_to_common_decimals(credit_price, collateral_price)?)
    }

    fn convert_eth_to_usd(
        &self,
        now: u64,
        asset: &Address,
        price: AssetPrice,
        feed: &dyn PriceFeed,
    ) -> Result<AssetPrice> {
        let (eth_usd, eth_usd_decimals) =
            read_feed(feed, asset, now, self.config.max_price_age)?;

        Ok(AssetPrice {
            price: checked_mul(price.price, eth_usd)?,
            decimals: price
                .decimals
                .checked_add(eth_usd_decimals)
                .ok_or(pactum_common::ArithmeticError::Overflow)?,
            denomination: Denomination::Usd,
        })
    }
}

/// Rescale both prices to the larger of the two decimal counts
pub fn scale_to_common_decimals(
    a: AssetPrice,
    b: AssetPrice,
) -> Result<(AssetPrice, AssetPrice)> {
    let decimals = a.decimals.max(b.decimals);
    Ok((scale_price(a, decimals)?, scale_price(b, decimals)?))
}

/// Rescale one price to `decimals`, dividing toward zero when shrinking
pub fn scale_price(price: AssetPrice, decimals: u8) -> Result<AssetPrice> {
    let scaled = if decimals >= price.decimals {
        let factor = pow10(decimals - price.decimals)?;
        checked_mul(price.price, factor)?
    } else {
        let factor = pow10(price.decimals - decimals)?;
        price.price / factor
    };

    Ok(AssetPrice {
        price: scaled,
        decimals,
        denomination: price.denomination,
    })
}

/// 10^exp as u128, erroring past the representable range
pub fn pow10(exp: u8) -> Result<u128> {
    10u128
        .checked_pow(exp as u32)
        .ok_or_else(|| pactum_common::ArithmeticError::Overflow.into())
}

/// Convert an amount from base-asset units to quote units through one feed
/// price: `amount * price / 10^decimals`, or the inverse when `invert` is set
pub fn convert_amount(
    amount: u128,
    price: u128,
    decimals: u8,
    invert: bool,
) -> Result<u128> {
    let unit = pow10(decimals)?;
    if invert {
        Ok(mul_div_floor(amount, unit, price)?)
    } else {
        Ok(mul_div_floor(amount, price, unit)?)
    }
}
