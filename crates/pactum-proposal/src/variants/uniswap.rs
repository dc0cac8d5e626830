//! LP-position proposal - credit derived from a liquidity position's value
//!
//! Collateral is a concentrated-liquidity position token rather than a plain
//! balance. The acceptor supplies the position id; the position must be over
//! the proposal's allow-listed token pair (order-independent). Its fair
//! value is recovered from the pool's current price and converted into the
//! credit asset through a bounded feed chain, and the credit amount is that
//! value scaled by the loan-to-value ratio.

use serde::{Deserialize, Serialize};

use pactum_common::error::{BoundsError, ProposalError};
use pactum_common::math::mul_div_floor;
use pactum_common::{Address, Hash, Result, StructEncoder, LTV_DENOMINATOR};
use pactum_oracle::feed::PairFeedRegistry;
use pactum_oracle::lp::{appraise_position, ConversionChain, PoolPriceSource, PositionSource};

use crate::base::{type_descriptor, ProposalBase};
use crate::variants::DerivedTerms;

/// Liquidity-position-collateralized proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniswapLpProposal {
    pub base: ProposalBase,
    /// One side of the allowed pool pair
    pub token_a: Address,
    /// Other side of the allowed pool pair
    pub token_b: Address,
    /// Loan-to-value ratio in basis points; must be nonzero
    pub loan_to_value: u128,
    /// Smallest credit amount an acceptance may draw; must be nonzero
    pub min_credit_amount: u128,
    /// Feed path from the position's base token to the credit asset
    pub conversion_chain: ConversionChain,
}

/// Acceptor-chosen position token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniswapLpValues {
    pub position_id: u128,
}

impl UniswapLpProposal {
    pub fn validate(&self) -> Result<()> {
        if self.loan_to_value == 0 {
            return Err(ProposalError::ZeroLoanToValue.into());
        }
        if self.min_credit_amount == 0 {
            return Err(ProposalError::ZeroMinCreditAmount.into());
        }
        self.conversion_chain.validate()
    }

    pub fn struct_hash(&self) -> Hash {
        let descriptor = type_descriptor(
            "UniswapLpProposal",
            "token_a address,token_b address,loan_to_value u128,min_credit_amount u128,\
conversion_intermediaries hash,conversion_invert_flags hash",
        );
        let mut encoder = StructEncoder::new(&descriptor);
        self.base.encode_into(&mut encoder);
        encoder.push_address(&self.token_a);
        encoder.push_address(&self.token_b);
        encoder.push_u128(self.loan_to_value);
        encoder.push_u128(self.min_credit_amount);

        // dynamic chain fields are pre-digested like any other dynamic field
        let mut intermediaries = Vec::with_capacity(self.conversion_chain.intermediaries.len() * 32);
        for address in &self.conversion_chain.intermediaries {
            intermediaries.extend_from_slice(&address.0);
        }
        encoder.push_bytes(&intermediaries);

        let flags: Vec<u8> = self
            .conversion_chain
            .invert_flags
            .iter()
            .map(|&flag| flag as u8)
            .collect();
        encoder.push_bytes(&flags);

        encoder.finish()
    }

    pub fn derive(
        &self,
        pair_feeds: &dyn PairFeedRegistry,
        positions: &dyn PositionSource,
        pools: &dyn PoolPriceSource,
        max_price_age: u64,
        now: u64,
        values: &UniswapLpValues,
    ) -> Result<DerivedTerms> {
        let position = positions.position(values.position_id)?;

        if !position.matches_pair(&self.token_a, &self.token_b) {
            return Err(ProposalError::InvalidLpTokenPair {
                token0: position.token0,
                token1: position.token1,
            }
            .into());
        }

        let sqrt_price_x96 = pools.sqrt_price_x96(&position.token0, &position.token1)?;
        let value = appraise_position(
            pair_feeds,
            now,
            max_price_age,
            &position,
            sqrt_price_x96,
            &self.base.credit_address,
            &self.conversion_chain,
        )?;

        let credit_amount = mul_div_floor(value, self.loan_to_value, LTV_DENOMINATOR)?;
        if credit_amount < self.min_credit_amount {
            return Err(BoundsError::CreditBelowMinimum {
                amount: credit_amount,
                minimum: self.min_credit_amount,
            }
            .into());
        }

        Ok(DerivedTerms {
            collateral: self.base.collateral.with_id(values.position_id),
            credit_amount,
        })
    }
}
