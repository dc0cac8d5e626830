//! Error types for the Pactum protocol
//!
//! Provides a unified error type and domain-specific error variants. Every
//! failure a caller can hit is a distinct variant with enough structured data
//! to assert on the exact cause; nothing is downgraded into a catch-all.

use thiserror::Error;

use crate::types::address::Address;
use crate::types::asset::Denomination;

/// Result type alias using PactumError
pub type Result<T> = std::result::Result<T, PactumError>;

/// Unified error type for Pactum operations
#[derive(Debug, Error)]
pub enum PactumError {
    // Malformed proposal parameters
    #[error("Proposal error: {0}")]
    Proposal(#[from] ProposalError),

    // Caller / acceptor authorization
    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    // Signatures and inclusion proofs
    #[error("Authenticity error: {0}")]
    Authenticity(#[from] AuthenticityError),

    // Expirations, auction windows, deadlines
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    // Nonce, credit, and fingerprint ledger state
    #[error("State error: {0}")]
    State(#[from] StateError),

    // External price data
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    // Derived amounts outside acceptor-declared bounds
    #[error("Bounds error: {0}")]
    Bounds(#[from] BoundsError),

    // Fixed-point arithmetic
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    // Loan vault collaborator failure
    #[error("Vault error: {0}")]
    Vault(String),

    // Missing or inconsistent engine wiring
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Malformed or incompatible proposal parameters, surfaced before any state
/// mutation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProposalError {
    #[error("Minimum collateral amount is not set")]
    ZeroMinCollateralAmount,

    #[error("Minimum credit amount is not set")]
    ZeroMinCreditAmount,

    #[error("Acceptance values do not match the proposal variant")]
    MismatchedAcceptanceValues,

    #[error("Proposal refinances loan {declared}, acceptance requested loan {requested}")]
    IncompatibleRefinancing { declared: u64, requested: u64 },

    #[error("Auction duration {duration}s is shorter than one minute")]
    AuctionDurationTooShort { duration: u64 },

    #[error("Auction duration {duration}s is not a whole number of minutes")]
    AuctionDurationNotRoundMinutes { duration: u64 },

    #[error("Invalid credit amount range: min {min} >= max {max}")]
    InvalidCreditAmountRange { min: u128, max: u128 },

    #[error("Loan-to-value ratio is not set")]
    ZeroLoanToValue,

    #[error("Feed conversion chain of {hops} hops exceeds the maximum of {max}")]
    TooManyFeedHops { hops: usize, max: usize },

    #[error("Got {flags} feed invert flags, conversion chain needs {expected}")]
    InvalidInvertFlagCount { flags: usize, expected: usize },

    #[error("Position pair ({token0}, {token1}) does not match the proposal pair")]
    InvalidLpTokenPair { token0: Address, token1: Address },
}

/// Authorization errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Caller {caller} is not the stated loan contract {loan_contract}")]
    CallerNotLoanContract {
        caller: Address,
        loan_contract: Address,
    },

    #[error("Address {address} is missing the active-loan tag")]
    MissingActiveLoanTag { address: Address },

    #[error("Acceptor {address} is the proposer")]
    AcceptorIsProposer { address: Address },

    #[error("Caller {current} is not the allowed acceptor {allowed}")]
    CallerNotAllowedAcceptor { current: Address, allowed: Address },

    #[error("Acceptor {acceptor} rejected by controller {controller}")]
    AcceptorRefused {
        acceptor: Address,
        controller: Address,
    },

    #[error("Caller {caller} is not the stated proposer {proposer}")]
    CallerIsNotStatedProposer { caller: Address, proposer: Address },

    #[error("Caller {caller} may not revoke nonces of {owner}")]
    CallerNotNonceOwner { caller: Address, owner: Address },
}

/// Authenticity errors: signatures and inclusion proofs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthenticityError {
    #[error("Invalid signature from signer {signer}")]
    InvalidSignature { signer: Address },

    #[error("Collateral id {id} is not a member of the whitelist root")]
    CollateralIdNotWhitelisted { id: u128 },
}

/// Temporal errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Proposal expired at {expiration}, current timestamp {current}")]
    Expired { current: u64, expiration: u64 },

    #[error("Auction has not started: current {current}, start {start}")]
    AuctionNotStarted { current: u64, start: u64 },

    #[error("Auction finished at {deadline}, current timestamp {current}")]
    AuctionFinished { current: u64, deadline: u64 },

    #[error("Loan default date {date} is in the past, current timestamp {current}")]
    DefaultDateInPast { date: u64, current: u64 },
}

/// State errors against the nonce, credit, and fingerprint ledgers
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Nonce ({space}, {nonce}) of {owner} is not usable")]
    NonceNotUsable {
        owner: Address,
        space: u64,
        nonce: u64,
    },

    #[error("Nonce ({space}, {nonce}) of {owner} is already revoked")]
    NonceAlreadyRevoked {
        owner: Address,
        space: u64,
        nonce: u64,
    },

    #[error("Available credit limit exceeded: attempted {attempted}, limit {limit}")]
    CreditLimitExceeded { attempted: u128, limit: u128 },

    #[error("No state fingerprint computer registered for asset {asset}")]
    MissingFingerprintComputer { asset: Address },

    #[error("Collateral state fingerprint mismatch: declared {declared}, current {current}")]
    FingerprintMismatch { declared: String, current: String },
}

/// External-data errors from price feeds and position sources
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("No price feed for asset {asset} denominated in {denomination}")]
    FeedNotFound {
        asset: Address,
        denomination: Denomination,
    },

    #[error("Feed for asset {asset} reported non-positive price {price}")]
    NonPositivePrice { asset: Address, price: i128 },

    #[error("Feed for asset {asset} is stale: age {age}s exceeds maximum {max_age}s")]
    StalePrice {
        asset: Address,
        age: u64,
        max_age: u64,
    },

    #[error("Sequencer is down")]
    SequencerDown,

    #[error("Sequencer restarted {since_restart}s ago, grace period is {grace}s")]
    GracePeriodNotOver { since_restart: u64, grace: u64 },

    #[error("No common denominator for credit {credit} and collateral {collateral}")]
    NoCommonDenominator { credit: Address, collateral: Address },

    #[error("No price feed for pair ({base}, {quote})")]
    PairFeedNotFound { base: Address, quote: Address },

    #[error("Position {token_id} not found")]
    PositionNotFound { token_id: u128 },

    #[error("No pool price for pair ({token0}, {token1})")]
    PoolNotFound { token0: Address, token1: Address },
}

/// Acceptance-bound errors: derived amounts outside declared windows
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoundsError {
    #[error(
        "Auction credit amount {price} outside acceptor window (intended {intended}, slippage {slippage})"
    )]
    CreditAmountOutOfBounds {
        price: u128,
        intended: u128,
        slippage: u128,
    },

    #[error("Collateral amount {amount} is below the proposal minimum {minimum}")]
    CollateralBelowMinimum { amount: u128, minimum: u128 },

    #[error("Credit amount {amount} is below the proposal minimum {minimum}")]
    CreditBelowMinimum { amount: u128, minimum: u128 },
}

/// Fixed-point arithmetic errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Division by zero")]
    DivisionByZero,
}

impl From<serde_json::Error> for PactumError {
    fn from(err: serde_json::Error) -> Self {
        PactumError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PactumError::State(StateError::CreditLimitExceeded {
            attempted: 1200,
            limit: 1000,
        });
        assert!(err.to_string().contains("attempted 1200"));
        assert!(err.to_string().contains("limit 1000"));
    }

    #[test]
    fn test_temporal_error_display() {
        let err = TemporalError::Expired {
            current: 100,
            expiration: 50,
        };
        assert!(err.to_string().contains("expired at 50"));
    }

    #[test]
    fn test_nested_from() {
        let err: PactumError = ArithmeticError::DivisionByZero.into();
        assert!(matches!(
            err,
            PactumError::Arithmetic(ArithmeticError::DivisionByZero)
        ));
    }
}
