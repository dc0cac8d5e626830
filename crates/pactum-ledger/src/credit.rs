//! Utilized-credit ledger
//!
//! Running totals of credit consumed per (owner, credit id), checked against
//! a declared ceiling on every utilization. The check and the increment
//! happen under one lock, so interleaved acceptances sharing a credit id can
//! never jointly exceed the ceiling regardless of serialization order.
//!
//! A ceiling of zero is never routed here: it marks a single-use proposal,
//! and the caller performs a one-time nonce revocation instead.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use pactum_common::error::StateError;
use pactum_common::math::checked_add;
use pactum_common::{Address, Hash, Result};

/// Cumulative credit usage keyed by (owner, credit id)
#[derive(Default)]
pub struct UtilizedCreditLedger {
    used: Mutex<HashMap<(Address, Hash), u128>>,
}

impl UtilizedCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cumulative credit already consumed for (owner, credit id)
    pub fn utilized(&self, owner: &Address, credit_id: &Hash) -> u128 {
        self.used
            .lock()
            .get(&(*owner, *credit_id))
            .copied()
            .unwrap_or(0)
    }

    /// Atomically add `amount` to the running total, failing without
    /// mutation when the total would exceed `ceiling`.
    ///
    /// The error reports the attempted cumulative value and the ceiling so
    /// callers can assert on the exact shortfall.
    pub fn utilize(
        &self,
        owner: &Address,
        credit_id: &Hash,
        amount: u128,
        ceiling: u128,
    ) -> Result<()> {
        let mut used = self.used.lock();
        let entry = used.entry((*owner, *credit_id)).or_insert(0);

        let attempted = checked_add(*entry, amount)?;
        if attempted > ceiling {
            return Err(StateError::CreditLimitExceeded {
                attempted,
                limit: ceiling,
            }
            .into());
        }

        *entry = attempted;
        debug!(owner = %owner, used = attempted, ceiling, "credit utilized");
        Ok(())
    }
}
