//! Replay and nonce ledger
//!
//! Per-signer revocation bookkeeping keyed by (owner, nonce space, nonce).
//! A nonce is usable iff its space is the owner's current space and it has
//! not been revoked; both conditions are irreversible, so once
//! `is_usable` returns false for a triple it never returns true again.
//!
//! Revocation is self-service: only the owner revokes their own nonces. The
//! one exception is the acceptance flow, which consumes the proposer's nonce
//! as a side effect of a successful single-use acceptance via [`NonceLedger::consume`].

use std::collections::HashSet;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use pactum_common::error::{AuthError, StateError};
use pactum_common::{Address, Result, TxContext};

/// Per-signer, per-nonce-space revocation table
#[derive(Default)]
pub struct NonceLedger {
    /// Current nonce space per owner; missing entry means space 0
    current_space: DashMap<Address, u64>,
    /// Revoked (owner, space, nonce) triples; entries are never removed
    revoked: Mutex<HashSet<(Address, u64, u64)>>,
}

impl NonceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nonce space of `owner`
    pub fn current_nonce_space(&self, owner: &Address) -> u64 {
        self.current_space.get(owner).map(|space| *space).unwrap_or(0)
    }

    /// Whether (owner, space, nonce) can still authorize a proposal
    pub fn is_usable(&self, owner: &Address, space: u64, nonce: u64) -> bool {
        self.current_nonce_space(owner) == space
            && !self.revoked.lock().contains(&(*owner, space, nonce))
    }

    /// Revoke one of the caller's own nonces.
    ///
    /// Fails when the caller is not `owner` or the nonce is already revoked;
    /// a revocation is never undone.
    pub fn revoke(&self, ctx: &TxContext, owner: Address, space: u64, nonce: u64) -> Result<()> {
        if ctx.caller != owner {
            return Err(AuthError::CallerNotNonceOwner {
                caller: ctx.caller,
                owner,
            }
            .into());
        }
        self.mark_revoked(owner, space, nonce)
    }

    /// Consume the proposer's nonce on single-use acceptance.
    ///
    /// Acceptance-flow path: authorization was already established by the
    /// proposer's signature over the proposal being consumed.
    pub fn consume(&self, owner: Address, space: u64, nonce: u64) -> Result<()> {
        self.mark_revoked(owner, space, nonce)
    }

    /// Bump the caller's nonce space, invalidating every nonce in the old
    /// space without enumeration. Returns the new space.
    pub fn revoke_nonce_space(&self, ctx: &TxContext) -> u64 {
        let mut entry = self.current_space.entry(ctx.caller).or_insert(0);
        *entry += 1;
        let new_space = *entry;
        debug!(owner = %ctx.caller, space = new_space, "nonce space revoked");
        new_space
    }

    fn mark_revoked(&self, owner: Address, space: u64, nonce: u64) -> Result<()> {
        let mut revoked = self.revoked.lock();
        if !revoked.insert((owner, space, nonce)) {
            return Err(StateError::NonceAlreadyRevoked {
                owner,
                space,
                nonce,
            }
            .into());
        }
        debug!(owner = %owner, space, nonce, "nonce revoked");
        Ok(())
    }
}
