//! Proposal variants - the pricing strategies
//!
//! A closed sum type over the six pricing policies. Each variant owns its
//! struct, type descriptor, malformed-parameter validation, and a derivation
//! from acceptor-supplied runtime values into concrete amounts; the shared
//! acceptance state machine consumes the derived amounts as plain data.

pub mod chainlink;
pub mod dutch;
pub mod fungible;
pub mod list;
pub mod simple;
pub mod uniswap;

use serde::{Deserialize, Serialize};

use pactum_common::error::ProposalError;
use pactum_common::{Address, Asset, Domain, Hash, Result, PROTOCOL_VERSION};

use crate::base::ProposalBase;

pub use chainlink::{ChainlinkElasticProposal, ChainlinkElasticValues};
pub use dutch::{DutchAuctionProposal, DutchAuctionValues};
pub use fungible::{FungibleProposal, FungibleValues};
pub use list::{ListProposal, ListValues};
pub use simple::SimpleProposal;
pub use uniswap::{UniswapLpProposal, UniswapLpValues};

/// Amounts a variant resolves before the acceptance state machine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedTerms {
    /// Collateral with its id and amount resolved
    pub collateral: Asset,
    /// Credit amount consumed against the proposal's ceiling
    pub credit_amount: u128,
}

/// A proposal of any pricing strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Proposal {
    Simple(SimpleProposal),
    Fungible(FungibleProposal),
    DutchAuction(DutchAuctionProposal),
    ChainlinkElastic(ChainlinkElasticProposal),
    UniswapLp(UniswapLpProposal),
    List(ListProposal),
}

/// Acceptor-supplied runtime values, never signed by the proposer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum AcceptanceValues {
    Simple,
    Fungible(FungibleValues),
    DutchAuction(DutchAuctionValues),
    ChainlinkElastic(ChainlinkElasticValues),
    UniswapLp(UniswapLpValues),
    List(ListValues),
}

impl Proposal {
    /// The signed fields common to every variant
    pub fn base(&self) -> &ProposalBase {
        match self {
            Proposal::Simple(p) => &p.base,
            Proposal::Fungible(p) => &p.base,
            Proposal::DutchAuction(p) => &p.base,
            Proposal::ChainlinkElastic(p) => &p.base,
            Proposal::UniswapLp(p) => &p.base,
            Proposal::List(p) => &p.base,
        }
    }

    /// Reject malformed parameters before anything else runs
    pub fn validate(&self) -> Result<()> {
        match self {
            Proposal::Simple(_) => Ok(()),
            Proposal::Fungible(p) => p.validate(),
            Proposal::DutchAuction(p) => p.validate(),
            Proposal::ChainlinkElastic(p) => p.validate(),
            Proposal::UniswapLp(p) => p.validate(),
            Proposal::List(_) => Ok(()),
        }
    }

    /// Hashing-domain name; each variant is its own domain
    pub fn domain_name(&self) -> &'static str {
        match self {
            Proposal::Simple(_) => "PactumSimpleProposal",
            Proposal::Fungible(_) => "PactumFungibleProposal",
            Proposal::DutchAuction(_) => "PactumDutchAuctionProposal",
            Proposal::ChainlinkElastic(_) => "PactumChainlinkElasticProposal",
            Proposal::UniswapLp(_) => "PactumUniswapLpProposal",
            Proposal::List(_) => "PactumListProposal",
        }
    }

    fn struct_hash(&self) -> Hash {
        match self {
            Proposal::Simple(p) => p.struct_hash(),
            Proposal::Fungible(p) => p.struct_hash(),
            Proposal::DutchAuction(p) => p.struct_hash(),
            Proposal::ChainlinkElastic(p) => p.struct_hash(),
            Proposal::UniswapLp(p) => p.struct_hash(),
            Proposal::List(p) => p.struct_hash(),
        }
    }

    /// The proposal hash: signature payload and ledger key
    pub fn hash(&self, protocol: Address) -> Hash {
        Domain::new(self.domain_name(), PROTOCOL_VERSION, protocol)
            .typed_hash(&self.struct_hash())
    }
}

impl AcceptanceValues {
    /// Error used by dispatch when values and proposal variants disagree
    pub(crate) fn mismatch() -> ProposalError {
        ProposalError::MismatchedAcceptanceValues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ProposalBase;
    use pactum_common::{AssetCategory, ZERO_HASH};

    pub(crate) fn test_base() -> ProposalBase {
        ProposalBase {
            collateral: Asset {
                category: AssetCategory::NonFungible,
                address: Address([3u8; 32]),
                id: 42,
                amount: 0,
            },
            check_collateral_state_fingerprint: false,
            collateral_state_fingerprint: ZERO_HASH,
            credit_address: Address([4u8; 32]),
            available_credit_limit: 0,
            utilized_credit_id: ZERO_HASH,
            fixed_interest_amount: 0,
            accruing_interest_apr: 500,
            duration_or_date: 86_400,
            expiration: 2_000_000_000,
            allowed_acceptor: Address::ZERO,
            acceptor_controller: Address::ZERO,
            acceptor_controller_data: Vec::new(),
            proposer: Address([1u8; 32]),
            proposer_spec_hash: ZERO_HASH,
            is_offer: true,
            refinancing_loan_id: 0,
            nonce_space: 0,
            nonce: 1,
            loan_contract: Address([9u8; 32]),
        }
    }

    #[test]
    fn test_variant_hashes_are_domain_separated() {
        // identical base fields, different variants: hashes must differ
        let protocol = Address([0xee; 32]);

        let simple = Proposal::Simple(SimpleProposal {
            base: test_base(),
            credit_amount: 100,
        });
        let list = Proposal::List(ListProposal {
            base: test_base(),
            collateral_ids_merkle_root: ZERO_HASH,
            credit_amount: 100,
        });

        assert_ne!(simple.hash(protocol), list.hash(protocol));
    }

    #[test]
    fn test_hash_commits_every_base_field() {
        let protocol = Address([0xee; 32]);
        let reference = Proposal::Simple(SimpleProposal {
            base: test_base(),
            credit_amount: 100,
        });

        let mut mutated = test_base();
        mutated.nonce = 2;
        let changed = Proposal::Simple(SimpleProposal {
            base: mutated,
            credit_amount: 100,
        });

        assert_ne!(reference.hash(protocol), changed.hash(protocol));
    }
}
