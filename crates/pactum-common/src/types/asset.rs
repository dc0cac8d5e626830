//! Multi-asset descriptors
//!
//! A single descriptor shape covers all three collateral classes the protocol
//! accepts: plain fungible tokens, unique non-fungible tokens, and
//! semi-fungible tokens that carry both an id and an amount. Credit is always
//! fungible.

use serde::{Deserialize, Serialize};

use crate::types::address::Address;

/// Asset class of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Balance-only token; `id` is always zero
    Fungible,
    /// Unique token; `amount` is always zero
    NonFungible,
    /// Id-scoped balances; both `id` and `amount` are meaningful
    SemiFungible,
}

impl AssetCategory {
    /// Stable single-byte encoding used by the structured-hash engine
    pub fn as_u8(&self) -> u8 {
        match self {
            AssetCategory::Fungible => 0,
            AssetCategory::NonFungible => 1,
            AssetCategory::SemiFungible => 2,
        }
    }
}

/// Asset descriptor: class, contract address, id, and amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub category: AssetCategory,
    pub address: Address,
    pub id: u128,
    pub amount: u128,
}

impl Asset {
    pub fn fungible(address: Address, amount: u128) -> Self {
        Self {
            category: AssetCategory::Fungible,
            address,
            id: 0,
            amount,
        }
    }

    pub fn non_fungible(address: Address, id: u128) -> Self {
        Self {
            category: AssetCategory::NonFungible,
            address,
            id,
            amount: 0,
        }
    }

    pub fn semi_fungible(address: Address, id: u128, amount: u128) -> Self {
        Self {
            category: AssetCategory::SemiFungible,
            address,
            id,
            amount,
        }
    }

    /// Same descriptor with a different resolved amount
    pub fn with_amount(mut self, amount: u128) -> Self {
        self.amount = amount;
        self
    }

    /// Same descriptor with a different resolved id
    pub fn with_id(mut self, id: u128) -> Self {
        self.id = id;
        self
    }
}

/// Reference denomination a price feed quotes against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Usd,
    Eth,
}

impl std::fmt::Display for Denomination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Denomination::Usd => write!(f, "USD"),
            Denomination::Eth => write!(f, "ETH"),
        }
    }
}
