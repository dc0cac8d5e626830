//! Loan terms - the output of a successful proposal acceptance
//!
//! Terms are constructed fresh on every acceptance and handed to the loan
//! vault; the proposal core never persists them. Status transitions
//! (running, repaid, claimed) belong to the vault.

use serde::{Deserialize, Serialize};

use crate::crypto::hashing::Hash;
use crate::types::address::Address;
use crate::types::asset::Asset;

/// Vault-assigned loan identifier; zero means "new loan" in refinancing fields
pub type LoanId = u64;

/// Concrete loan terms derived from an accepted proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub lender: Address,
    pub borrower: Address,

    /// Loan duration in seconds
    pub duration: u64,

    /// Collateral with the resolved id and amount
    pub collateral: Asset,

    /// Credit with the resolved amount
    pub credit: Asset,

    /// Interest amount owed regardless of elapsed time
    pub fixed_interest_amount: u128,

    /// Accruing interest APR in basis points
    pub accruing_interest_apr: u32,

    /// Commitment to the lender-side auxiliary spec (zeroed when unused)
    pub lender_spec_hash: Hash,

    /// Commitment to the borrower-side auxiliary spec (zeroed when unused)
    pub borrower_spec_hash: Hash,
}

impl LoanTerms {
    /// Resolve lender and borrower from the proposal direction.
    ///
    /// Offers are proposed by the lender; requests by the borrower.
    pub fn parties(is_offer: bool, proposer: Address, acceptor: Address) -> (Address, Address) {
        if is_offer {
            (proposer, acceptor)
        } else {
            (acceptor, proposer)
        }
    }
}
