//! Chainlink-elastic proposal - oracle-driven collateral sizing
//!
//! The acceptor picks the credit amount; the collateral backing it is sized
//! from live price feeds and the proposal's loan-to-value ratio. Feed
//! resolution tries the USD denomination first and falls back to ETH; mixed
//! denominations reconcile through the ETH/USD feed, and a configured L2
//! sequencer-uptime feed gates the whole derivation.

use serde::{Deserialize, Serialize};

use pactum_common::error::{BoundsError, ProposalError};
use pactum_common::{Hash, Result, StructEncoder};
use pactum_oracle::feed::{FeedRegistry, PriceSource};
use pactum_oracle::ltv::collateral_for_credit;
use pactum_oracle::sequencer::{check_sequencer, SequencerOracle};

use crate::base::{type_descriptor, ProposalBase};
use crate::variants::DerivedTerms;

/// Oracle-priced elastic proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainlinkElasticProposal {
    pub base: ProposalBase,
    /// Loan-to-value ratio in basis points; must be nonzero
    pub loan_to_value: u128,
    /// Smallest credit amount an acceptance may draw; must be nonzero
    pub min_credit_amount: u128,
}

/// Acceptor-chosen credit amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainlinkElasticValues {
    pub credit_amount: u128,
}

impl ChainlinkElasticProposal {
    pub fn validate(&self) -> Result<()> {
        if self.loan_to_value == 0 {
            return Err(ProposalError::ZeroLoanToValue.into());
        }
        if self.min_credit_amount == 0 {
            return Err(ProposalError::ZeroMinCreditAmount.into());
        }
        Ok(())
    }

    pub fn struct_hash(&self) -> Hash {
        let descriptor = type_descriptor(
            "ChainlinkElasticProposal",
            "loan_to_value u128,min_credit_amount u128",
        );
        let mut encoder = StructEncoder::new(&descriptor);
        self.base.encode_into(&mut encoder);
        encoder.push_u128(self.loan_to_value);
        encoder.push_u128(self.min_credit_amount);
        encoder.finish()
    }

    pub fn derive<R: FeedRegistry + ?Sized>(
        &self,
        prices: &PriceSource<R>,
        sequencer: Option<&dyn SequencerOracle>,
        now: u64,
        values: &ChainlinkElasticValues,
    ) -> Result<DerivedTerms> {
        if values.credit_amount < self.min_credit_amount {
            return Err(BoundsError::CreditBelowMinimum {
                amount: values.credit_amount,
                minimum: self.min_credit_amount,
            }
            .into());
        }

        if let Some(sequencer) = sequencer {
            check_sequencer(sequencer, now, prices.config().sequencer_grace_period)?;
        }

        let (credit_price, collateral_price) =
            prices.fetch_common_prices(now, &self.base.credit_address, &self.base.collateral.address)?;

        let collateral_amount = collateral_for_credit(
            values.credit_amount,
            credit_price,
            collateral_price,
            self.loan_to_value,
        )?;

        Ok(DerivedTerms {
            collateral: self.base.collateral.with_amount(collateral_amount),
            credit_amount: values.credit_amount,
        })
    }
}
