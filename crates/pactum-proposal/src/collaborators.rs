//! External collaborator interfaces
//!
//! The proposal core consumes these; it never implements them. They are
//! injected into the engine so the acceptance state machine can be exercised
//! against test doubles without a full execution environment.

use std::sync::Arc;

use pactum_common::{Address, Hash, LoanId, LoanTerms, Result};

/// Capability tag a loan contract must carry to consume proposals
pub const ACTIVE_LOAN_TAG: &str = "pactum.active_loan";

/// Capability-tag registry (the protocol hub)
pub trait TagRegistry: Send + Sync {
    fn has_tag(&self, address: &Address, tag: &str) -> bool;
}

/// Loan lifecycle vault: custody, repayment, and default claim live behind
/// this seam. Called only after the acceptance state machine fully commits.
pub trait LoanVault: Send + Sync {
    /// Open a new loan with the derived terms, returning its id
    fn create_loan(&self, proposal_hash: &Hash, terms: &LoanTerms, extra: &[u8])
        -> Result<LoanId>;

    /// Replace an existing loan with new terms, returning the new id
    fn refinance_loan(
        &self,
        loan_id: LoanId,
        proposal_hash: &Hash,
        terms: &LoanTerms,
        extra: &[u8],
    ) -> Result<LoanId>;
}

/// Computes a content-hash over a collateral asset's mutable state, used to
/// reject proposals priced against a now-stale asset state
pub trait StateFingerprintComputer: Send + Sync {
    fn compute_fingerprint(&self, asset: &Address, id: u128) -> Result<Hash>;
}

/// Registry resolving per-asset fingerprint computers.
///
/// Implementations may fall back to a standard fingerprint interface on the
/// asset itself; from the engine's perspective that is still "a computer".
pub trait StateFingerprintRegistry: Send + Sync {
    fn computer_for(&self, asset: &Address) -> Option<Arc<dyn StateFingerprintComputer>>;
}

/// Pluggable acceptor gate beyond the exact-address allow field
pub trait AcceptorController: Send + Sync {
    /// Whether `acceptor` may accept a proposal of `proposer`, given the
    /// proposer-signed controller data
    fn is_allowed(&self, acceptor: &Address, proposer: &Address, data: &[u8]) -> bool;
}
