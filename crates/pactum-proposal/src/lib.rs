//! # Pactum Proposal
//!
//! The proposal acceptance core of the Pactum peer-to-peer lending protocol:
//! lenders and borrowers express intent through signed or on-chain-registered
//! proposals, a counterparty accepts one, and the engine derives bounded loan
//! terms and hands them to the loan vault.
//!
//! ## Structure
//!
//! - [`base`]: fields and resolution rules shared by every variant
//! - [`variants`]: the six pricing strategies as a closed sum type
//!   (simple, fungible, Dutch auction, Chainlink-elastic, LP-position, list)
//! - [`engine`]: the ordered-check acceptance state machine over injected
//!   nonce/credit ledgers
//! - [`multiproposal`]: one signature over a Merkle root authorizing a whole
//!   batch of proposals
//! - [`collaborators`]: the external seams (loan vault, tag registry,
//!   fingerprint computers, acceptor controllers)

pub mod base;
pub mod collaborators;
pub mod engine;
pub mod multiproposal;
pub mod variants;

pub use base::{check_refinancing, resolve_duration, ProposalBase};
pub use collaborators::{
    AcceptorController, LoanVault, StateFingerprintComputer, StateFingerprintRegistry,
    TagRegistry, ACTIVE_LOAN_TAG,
};
pub use engine::{Acceptance, AcceptanceRequest, ProposalEngine};
pub use multiproposal::{Multiproposal, MULTIPROPOSAL_DOMAIN};
pub use variants::{
    AcceptanceValues, ChainlinkElasticProposal, ChainlinkElasticValues, DerivedTerms,
    DutchAuctionProposal, DutchAuctionValues, FungibleProposal, FungibleValues, ListProposal,
    ListValues, Proposal, SimpleProposal, UniswapLpProposal, UniswapLpValues,
};
