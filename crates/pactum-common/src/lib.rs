//! # Pactum Common
//!
//! Shared types, errors, math, and cryptographic primitives for the Pactum
//! peer-to-peer lending protocol.
//!
//! ## Core Types
//!
//! - [`Address`]: 32-byte account address (Ed25519 verifying key bytes)
//! - [`Asset`]: multi-class collateral/credit descriptor
//! - [`LoanTerms`]: concrete terms derived from an accepted proposal
//! - [`PactumError`]: unified error taxonomy with distinct per-cause variants
//!
//! ## Crypto
//!
//! - [`crypto::hashing`]: domain-separated structured-data hashing
//! - [`crypto::merkle`]: sorted-pair Merkle inclusion proofs
//! - [`crypto::signature`]: Ed25519 + contract-wallet signature validation
//!
//! ## Math
//!
//! - [`math::mul_div_floor`]: fixed-point multiply-then-divide with a 256-bit
//!   intermediate

pub mod crypto;
pub mod error;
pub mod math;
pub mod types;

// Re-export commonly used types at crate root
pub use crypto::hashing::{Domain, Hash, StructEncoder, HASH_SIZE, ZERO_HASH};
pub use error::{
    ArithmeticError, AuthError, AuthenticityError, BoundsError, OracleError, PactumError,
    ProposalError, Result, StateError, TemporalError,
};
pub use types::{
    address::Address,
    asset::{Asset, AssetCategory, Denomination},
    context::TxContext,
    terms::{LoanId, LoanTerms},
};

/// Pactum version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol version string committed into every hashing domain
pub const PROTOCOL_VERSION: &str = "1";

/// Denominator of loan-to-value ratios (basis points)
pub const LTV_DENOMINATOR: u128 = 10_000;

/// Denominator of fungible credit-per-collateral-unit ratios
pub const CREDIT_PER_COLLATERAL_UNIT_DENOMINATOR: u128 = 100_000_000_000_000_000_000_000_000_000_000_000_000;

/// Auction time granularity in seconds
pub const MINUTE: u64 = 60;

/// Values below this threshold are relative durations in seconds; values at or
/// above it are absolute deadline timestamps
pub const DURATION_OR_DATE_THRESHOLD: u64 = 1_000_000_000;
