//! Oracle-driven collateral sizing
//!
//! Given reconciled credit and collateral prices and a loan-to-value ratio in
//! basis points, computes how much collateral backs a requested credit
//! amount:
//!
//! ```text
//! collateral = credit * credit_price * LTV_DENOMINATOR / (collateral_price * ltv)
//! ```
//!
//! Both divisions happen after their multiplications, each through a 256-bit
//! intermediate, so the only precision lost is the final round toward zero.

use pactum_common::error::ProposalError;
use pactum_common::math::mul_div_floor;
use pactum_common::{Result, LTV_DENOMINATOR};

use crate::feed::AssetPrice;

/// Collateral amount backing `credit_amount` at `ltv` basis points.
///
/// Callers must pass prices already brought to a common denomination and
/// decimal scale (see [`crate::feed::PriceSource::fetch_common_prices`]).
pub fn collateral_for_credit(
    credit_amount: u128,
    credit_price: AssetPrice,
    collateral_price: AssetPrice,
    ltv: u128,
) -> Result<u128> {
    if ltv == 0 {
        return Err(ProposalError::ZeroLoanToValue.into());
    }
    debug_assert_eq!(credit_price.decimals, collateral_price.decimals);
    debug_assert_eq!(credit_price.denomination, collateral_price.denomination);

    // credit value in the common denomination, divided by the collateral
    // unit price; decimals cancel because both prices share a scale
    let base = mul_div_floor(credit_amount, credit_price.price, collateral_price.price)?;
    Ok(mul_div_floor(base, LTV_DENOMINATOR, ltv)?)
}
