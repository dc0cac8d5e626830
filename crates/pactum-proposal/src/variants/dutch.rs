//! Dutch-auction proposal - time-interpolated credit amount
//!
//! The credit amount moves between two bounds in whole-minute steps over the
//! auction window. Offers ascend from the minimum (reverse Dutch: the
//! borrower is rewarded for accepting early), requests descend from the
//! maximum (the lender is). The window runs one extra minute past
//! `auction_duration` so the far bound is actually attainable rather than
//! only approached.
//!
//! Because the amount moves between signing a transaction and its inclusion,
//! the acceptor declares an intended amount and a slippage; the
//! auction-computed amount must land inside that window.

use serde::{Deserialize, Serialize};

use pactum_common::error::{BoundsError, ProposalError, TemporalError};
use pactum_common::math::mul_div_floor;
use pactum_common::{Hash, Result, StructEncoder, MINUTE};

use crate::base::{type_descriptor, ProposalBase};
use crate::variants::DerivedTerms;

/// Auction-priced proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutchAuctionProposal {
    pub base: ProposalBase,
    /// Bound the auction starts from (offers) or ends at (requests)
    pub min_credit_amount: u128,
    /// Bound the auction ends at (offers) or starts from (requests)
    pub max_credit_amount: u128,
    /// Unix seconds at which interpolation begins
    pub auction_start: u64,
    /// Whole-minute auction length in seconds
    pub auction_duration: u64,
}

/// Acceptor's slippage protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutchAuctionValues {
    /// Credit amount the acceptor signed their transaction for
    pub intended_credit_amount: u128,
    /// Tolerated movement in the favorable-to-proposer direction
    pub slippage: u128,
}

impl DutchAuctionProposal {
    pub fn validate(&self) -> Result<()> {
        if self.auction_duration < MINUTE {
            return Err(ProposalError::AuctionDurationTooShort {
                duration: self.auction_duration,
            }
            .into());
        }
        if self.auction_duration % MINUTE != 0 {
            return Err(ProposalError::AuctionDurationNotRoundMinutes {
                duration: self.auction_duration,
            }
            .into());
        }
        if self.min_credit_amount >= self.max_credit_amount {
            return Err(ProposalError::InvalidCreditAmountRange {
                min: self.min_credit_amount,
                max: self.max_credit_amount,
            }
            .into());
        }
        Ok(())
    }

    pub fn struct_hash(&self) -> Hash {
        let descriptor = type_descriptor(
            "DutchAuctionProposal",
            "min_credit_amount u128,max_credit_amount u128,auction_start u64,auction_duration u64",
        );
        let mut encoder = StructEncoder::new(&descriptor);
        self.base.encode_into(&mut encoder);
        encoder.push_u128(self.min_credit_amount);
        encoder.push_u128(self.max_credit_amount);
        encoder.push_u64(self.auction_start);
        encoder.push_u64(self.auction_duration);
        encoder.finish()
    }

    /// Auction-computed credit amount at `timestamp`.
    ///
    /// Rejects timestamps before the start and at or past
    /// `start + duration + 1 minute`; the extra minute makes the far bound
    /// reachable at exactly `start + duration`.
    pub fn credit_amount_at(&self, timestamp: u64) -> Result<u128> {
        if timestamp < self.auction_start {
            return Err(TemporalError::AuctionNotStarted {
                current: timestamp,
                start: self.auction_start,
            }
            .into());
        }

        let deadline = self.auction_start + self.auction_duration + MINUTE;
        if timestamp >= deadline {
            return Err(TemporalError::AuctionFinished {
                current: timestamp,
                deadline,
            }
            .into());
        }

        // whole elapsed minutes over whole total minutes; both divisions
        // floor, so the amount is a step function over minute boundaries
        let elapsed_minutes = (timestamp - self.auction_start) / MINUTE;
        let total_minutes = self.auction_duration / MINUTE;
        let delta = mul_div_floor(
            self.max_credit_amount - self.min_credit_amount,
            elapsed_minutes as u128,
            total_minutes as u128,
        )?;

        Ok(if self.base.is_offer {
            self.min_credit_amount + delta
        } else {
            self.max_credit_amount - delta
        })
    }

    pub fn derive(&self, values: &DutchAuctionValues, timestamp: u64) -> Result<DerivedTerms> {
        let credit_amount = self.credit_amount_at(timestamp)?;

        // offers drift upward, so the acceptor caps the rise; requests drift
        // downward, so the acceptor floors the fall
        let (low, high) = if self.base.is_offer {
            (
                values.intended_credit_amount,
                values.intended_credit_amount.saturating_add(values.slippage),
            )
        } else {
            (
                values.intended_credit_amount.saturating_sub(values.slippage),
                values.intended_credit_amount,
            )
        };

        if credit_amount < low || credit_amount > high {
            return Err(BoundsError::CreditAmountOutOfBounds {
                price: credit_amount,
                intended: values.intended_credit_amount,
                slippage: values.slippage,
            }
            .into());
        }

        Ok(DerivedTerms {
            collateral: self.base.collateral,
            credit_amount,
        })
    }
}
