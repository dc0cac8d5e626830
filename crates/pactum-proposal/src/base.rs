//! Common proposal shape and shared resolution rules
//!
//! Every variant embeds [`ProposalBase`]: the signed fields that are not
//! pricing policy. The helpers here implement the two rules all variants
//! share - the refinancing compatibility matrix and duration-or-date
//! resolution.

use serde::{Deserialize, Serialize};

use pactum_common::error::{ProposalError, TemporalError};
use pactum_common::{
    Address, Asset, Hash, LoanId, Result, StructEncoder, DURATION_OR_DATE_THRESHOLD,
};

/// Field list fragment shared by every proposal type descriptor
pub(crate) const BASE_FIELDS: &str = "collateral_category u8,collateral_address address,\
collateral_id u128,collateral_amount u128,check_collateral_state_fingerprint bool,\
collateral_state_fingerprint hash,credit_address address,available_credit_limit u128,\
utilized_credit_id hash,fixed_interest_amount u128,accruing_interest_apr u32,\
duration_or_date u64,expiration u64,allowed_acceptor address,acceptor_controller address,\
acceptor_controller_data bytes,proposer address,proposer_spec_hash hash,is_offer bool,\
refinancing_loan_id u64,nonce_space u64,nonce u64,loan_contract address";

/// Compose a variant's full type descriptor from its name and extra fields
pub(crate) fn type_descriptor(name: &str, extra_fields: &str) -> String {
    if extra_fields.is_empty() {
        format!("{name}({BASE_FIELDS})")
    } else {
        format!("{name}({BASE_FIELDS},{extra_fields})")
    }
}

/// Signed fields common to every proposal variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalBase {
    /// Collateral descriptor; variants reinterpret `id`/`amount` flexibility
    pub collateral: Asset,
    /// Require the collateral state fingerprint to match at acceptance
    pub check_collateral_state_fingerprint: bool,
    /// Declared fingerprint the collateral state must still hash to
    pub collateral_state_fingerprint: Hash,

    /// Credit asset (always fungible)
    pub credit_address: Address,

    /// 0 = single-use proposal; >0 = shared ceiling on cumulative credit
    pub available_credit_limit: u128,
    /// Explicit shared credit-ledger key; zero keys by the proposal hash
    pub utilized_credit_id: Hash,

    pub fixed_interest_amount: u128,
    /// APR in basis points
    pub accruing_interest_apr: u32,

    /// Relative duration in seconds below the threshold, absolute deadline
    /// timestamp at or above it
    pub duration_or_date: u64,
    /// Acceptance must happen strictly before this timestamp
    pub expiration: u64,

    /// Exact-match acceptor gate; zero address admits anyone
    pub allowed_acceptor: Address,
    /// Pluggable acceptor gate; zero address means none
    pub acceptor_controller: Address,
    /// Proposer-signed data handed to the controller
    pub acceptor_controller_data: Vec<u8>,

    pub proposer: Address,
    /// Commitment to the proposer's auxiliary loan spec (zeroed when unused)
    pub proposer_spec_hash: Hash,
    /// true = proposer lends, false = proposer borrows
    pub is_offer: bool,

    /// 0 = new loan (offers may still refinance any loan); nonzero pins the
    /// loan this proposal refinances
    pub refinancing_loan_id: LoanId,

    pub nonce_space: u64,
    pub nonce: u64,

    /// The only address authorized to consume this proposal
    pub loan_contract: Address,
}

impl ProposalBase {
    /// Encode the base fields in descriptor order
    pub(crate) fn encode_into(&self, encoder: &mut StructEncoder) {
        encoder.push_u8(self.collateral.category.as_u8());
        encoder.push_address(&self.collateral.address);
        encoder.push_u128(self.collateral.id);
        encoder.push_u128(self.collateral.amount);
        encoder.push_bool(self.check_collateral_state_fingerprint);
        encoder.push_hash(&self.collateral_state_fingerprint);
        encoder.push_address(&self.credit_address);
        encoder.push_u128(self.available_credit_limit);
        encoder.push_hash(&self.utilized_credit_id);
        encoder.push_u128(self.fixed_interest_amount);
        encoder.push_u32(self.accruing_interest_apr);
        encoder.push_u64(self.duration_or_date);
        encoder.push_u64(self.expiration);
        encoder.push_address(&self.allowed_acceptor);
        encoder.push_address(&self.acceptor_controller);
        encoder.push_bytes(&self.acceptor_controller_data);
        encoder.push_address(&self.proposer);
        encoder.push_hash(&self.proposer_spec_hash);
        encoder.push_bool(self.is_offer);
        encoder.push_u64(self.refinancing_loan_id);
        encoder.push_u64(self.nonce_space);
        encoder.push_u64(self.nonce);
        encoder.push_address(&self.loan_contract);
    }
}

/// Refinancing compatibility matrix.
///
/// A request for a new loan (`requested == 0`) is incompatible with a
/// refinance-only proposal. A request to refinance a specific loan must match
/// the declared id, except that an offer declaring id 0 refinances anything.
pub fn check_refinancing(is_offer: bool, declared: LoanId, requested: LoanId) -> Result<()> {
    let compatible = if requested == 0 {
        declared == 0
    } else {
        declared == requested || (is_offer && declared == 0)
    };

    if compatible {
        Ok(())
    } else {
        Err(ProposalError::IncompatibleRefinancing {
            declared,
            requested,
        }
        .into())
    }
}

/// Resolve a duration-or-date field into a duration in seconds
pub fn resolve_duration(duration_or_date: u64, now: u64) -> Result<u64> {
    if duration_or_date < DURATION_OR_DATE_THRESHOLD {
        return Ok(duration_or_date);
    }
    if duration_or_date <= now {
        return Err(TemporalError::DefaultDateInPast {
            date: duration_or_date,
            current: now,
        }
        .into());
    }
    Ok(duration_or_date - now)
}
