//! # Pactum Ledger
//!
//! The two persistent protocol ledgers shared by every proposal variant:
//!
//! - [`NonceLedger`]: per-signer, per-nonce-space replay revocation. Once a
//!   nonce is revoked (explicitly, by a space bump, or by single-use
//!   consumption) it is permanently unusable.
//! - [`UtilizedCreditLedger`]: cumulative credit consumed per (owner,
//!   credit id), atomically checked against the proposal's declared ceiling.
//!
//! Both are owned, explicitly-injected objects rather than ambient
//! singletons, so the acceptance state machine can be unit tested without a
//! full execution environment. Correctness does not depend on the order in
//! which competing transactions are serialized, only on each call's atomic
//! check-then-mutate section.

pub mod credit;
pub mod nonce;

pub use credit::UtilizedCreditLedger;
pub use nonce::NonceLedger;
