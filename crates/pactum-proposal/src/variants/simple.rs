//! Simple proposal - fixed terms
//!
//! No derivation: collateral and credit amounts are fixed at signing time.
//! The only runtime resolution left is the shared duration-or-date rule,
//! which the engine applies when it builds the loan terms.

use serde::{Deserialize, Serialize};

use pactum_common::{Hash, Result, StructEncoder};

use crate::base::{type_descriptor, ProposalBase};
use crate::variants::DerivedTerms;

/// Fixed-terms proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleProposal {
    pub base: ProposalBase,
    /// Credit amount, fixed at signing time
    pub credit_amount: u128,
}

impl SimpleProposal {
    pub fn struct_hash(&self) -> Hash {
        let descriptor = type_descriptor("SimpleProposal", "credit_amount u128");
        let mut encoder = StructEncoder::new(&descriptor);
        self.base.encode_into(&mut encoder);
        encoder.push_u128(self.credit_amount);
        encoder.finish()
    }

    /// Amounts are already concrete; pass them through
    pub fn derive(&self) -> Result<DerivedTerms> {
        Ok(DerivedTerms {
            collateral: self.base.collateral,
            credit_amount: self.credit_amount,
        })
    }
}
