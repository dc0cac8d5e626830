//! Transaction context
//!
//! Every protocol operation runs inside a single atomic transaction against
//! shared ledger state. The embedding execution environment supplies the
//! caller identity and the timestamp at which all temporal checks are
//! evaluated; nothing in the core reads the clock on its own.

use serde::{Deserialize, Serialize};

use crate::types::address::Address;

/// Caller identity and evaluation timestamp of one atomic operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    /// Account invoking the operation
    pub caller: Address,
    /// Unix timestamp in seconds at which the operation is evaluated
    pub timestamp: u64,
}

impl TxContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }

    /// Context stamped with the current wall clock
    pub fn now(caller: Address) -> Self {
        Self {
            caller,
            timestamp: chrono::Utc::now().timestamp().max(0) as u64,
        }
    }
}
