//! Fungible proposal - linear collateral/credit scaling
//!
//! The acceptor picks the collateral amount; credit scales linearly through
//! a fixed-point ratio:
//!
//! ```text
//! credit = collateral_amount * credit_per_collateral_unit / 1e38
//! ```
//!
//! The 1e38 denominator lets one proposal cover both sub-unit and
//! multi-order-of-magnitude unit prices without losing precision.

use serde::{Deserialize, Serialize};

use pactum_common::error::{BoundsError, ProposalError};
use pactum_common::math::mul_div_floor;
use pactum_common::{Hash, Result, StructEncoder, CREDIT_PER_COLLATERAL_UNIT_DENOMINATOR};

use crate::base::{type_descriptor, ProposalBase};
use crate::variants::DerivedTerms;

/// Elastic-amount proposal with a linear price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleProposal {
    pub base: ProposalBase,
    /// Smallest collateral amount an acceptance may lock; must be nonzero
    pub min_collateral_amount: u128,
    /// Credit units per collateral unit, scaled by 1e38
    pub credit_per_collateral_unit: u128,
}

/// Acceptor-chosen collateral amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleValues {
    pub collateral_amount: u128,
}

/// Credit amount for a collateral amount under the 1e38 ratio convention
pub fn credit_amount_for(collateral_amount: u128, credit_per_collateral_unit: u128) -> Result<u128> {
    Ok(mul_div_floor(
        collateral_amount,
        credit_per_collateral_unit,
        CREDIT_PER_COLLATERAL_UNIT_DENOMINATOR,
    )?)
}

impl FungibleProposal {
    pub fn validate(&self) -> Result<()> {
        if self.min_collateral_amount == 0 {
            return Err(ProposalError::ZeroMinCollateralAmount.into());
        }
        Ok(())
    }

    pub fn struct_hash(&self) -> Hash {
        let descriptor = type_descriptor(
            "FungibleProposal",
            "min_collateral_amount u128,credit_per_collateral_unit u128",
        );
        let mut encoder = StructEncoder::new(&descriptor);
        self.base.encode_into(&mut encoder);
        encoder.push_u128(self.min_collateral_amount);
        encoder.push_u128(self.credit_per_collateral_unit);
        encoder.finish()
    }

    pub fn derive(&self, values: &FungibleValues) -> Result<DerivedTerms> {
        if values.collateral_amount < self.min_collateral_amount {
            return Err(BoundsError::CollateralBelowMinimum {
                amount: values.collateral_amount,
                minimum: self.min_collateral_amount,
            }
            .into());
        }

        let credit_amount =
            credit_amount_for(values.collateral_amount, self.credit_per_collateral_unit)?;

        Ok(DerivedTerms {
            collateral: self.base.collateral.with_amount(values.collateral_amount),
            credit_amount,
        })
    }
}
