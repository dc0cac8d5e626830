//! List proposal - Merkle-whitelisted collateral ids
//!
//! Terms are fixed like the simple variant, but instead of pinning one
//! collateral id the proposer signs a Merkle root over an explicit id set.
//! The acceptor proves membership of their chosen id at acceptance, so one
//! signed proposal covers an arbitrarily large whitelist. An all-zero root
//! admits any id of the collateral contract.

use serde::{Deserialize, Serialize};

use pactum_common::crypto::hashing::hash_bytes;
use pactum_common::crypto::merkle::MerkleProof;
use pactum_common::error::AuthenticityError;
use pactum_common::{Hash, Result, StructEncoder, ZERO_HASH};

use crate::base::{type_descriptor, ProposalBase};
use crate::variants::DerivedTerms;

/// Whitelist-collateral proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListProposal {
    pub base: ProposalBase,
    /// Root over eligible collateral-id leaves; all-zero admits any id
    pub collateral_ids_merkle_root: Hash,
    /// Credit amount, fixed at signing time
    pub credit_amount: u128,
}

/// Acceptor's chosen collateral id and its membership proof
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListValues {
    pub collateral_id: u128,
    pub inclusion_proof: MerkleProof,
}

/// Leaf hash of a collateral id
pub fn collateral_id_leaf(id: u128) -> Hash {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&id.to_be_bytes());
    hash_bytes(&word)
}

impl ListProposal {
    pub fn struct_hash(&self) -> Hash {
        let descriptor = type_descriptor(
            "ListProposal",
            "collateral_ids_merkle_root hash,credit_amount u128",
        );
        let mut encoder = StructEncoder::new(&descriptor);
        self.base.encode_into(&mut encoder);
        encoder.push_hash(&self.collateral_ids_merkle_root);
        encoder.push_u128(self.credit_amount);
        encoder.finish()
    }

    pub fn derive(&self, values: &ListValues) -> Result<DerivedTerms> {
        if self.collateral_ids_merkle_root != ZERO_HASH {
            let leaf = collateral_id_leaf(values.collateral_id);
            if !values
                .inclusion_proof
                .verify(&leaf, &self.collateral_ids_merkle_root)
            {
                return Err(AuthenticityError::CollateralIdNotWhitelisted {
                    id: values.collateral_id,
                }
                .into());
            }
        }

        Ok(DerivedTerms {
            collateral: self.base.collateral.with_id(values.collateral_id),
            credit_amount: self.credit_amount,
        })
    }
}
