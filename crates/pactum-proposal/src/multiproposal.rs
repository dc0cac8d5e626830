//! Multiproposal batch verification
//!
//! One signature over a Merkle root authorizes arbitrarily many proposals:
//! the proposer builds a tree over proposal hashes, signs the multiproposal
//! struct hash of the root once, and hands each counterparty an inclusion
//! proof. Verification reconstructs the root from (leaf, proof) and checks
//! the signature against the hash over the *reconstructed* root, so a forged
//! proof can only ever produce a root the proposer never signed.
//!
//! An empty proof means "not a batch": the signature is checked directly
//! over the single proposal hash. A non-empty proof unconditionally selects
//! the batch path.

use serde::{Deserialize, Serialize};

use pactum_common::crypto::merkle::{process_proof, MerkleProof};
use pactum_common::crypto::signature::SignatureVerifier;
use pactum_common::error::AuthenticityError;
use pactum_common::{Address, Domain, Hash, Result, StructEncoder, PROTOCOL_VERSION};

/// Protocol-wide domain name shared by every batch, regardless of which
/// variants its leaves are
pub const MULTIPROPOSAL_DOMAIN: &str = "PactumMultiproposal";

const MULTIPROPOSAL_TYPE_DESCRIPTOR: &str = "Multiproposal(merkle_root hash)";

/// A batch of proposals committed to by one Merkle root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiproposal {
    pub merkle_root: Hash,
}

impl Multiproposal {
    pub fn new(merkle_root: Hash) -> Self {
        Self { merkle_root }
    }

    pub fn struct_hash(&self) -> Hash {
        let mut encoder = StructEncoder::new(MULTIPROPOSAL_TYPE_DESCRIPTOR);
        encoder.push_hash(&self.merkle_root);
        encoder.finish()
    }

    /// The hash the proposer signs to authorize the whole batch
    pub fn signing_hash(&self, protocol: Address) -> Hash {
        Domain::new(MULTIPROPOSAL_DOMAIN, PROTOCOL_VERSION, protocol)
            .typed_hash(&self.struct_hash())
    }
}

/// Verify that `proposer` authorized `proposal_hash`, either directly or as
/// a leaf of a signed batch
pub fn verify_authorization(
    verifier: &SignatureVerifier,
    protocol: Address,
    proposer: &Address,
    proposal_hash: &Hash,
    signature: &[u8],
    proof: &MerkleProof,
) -> Result<()> {
    let signed_hash = if proof.is_empty() {
        *proposal_hash
    } else {
        let root = process_proof(proposal_hash, &proof.siblings);
        Multiproposal::new(root).signing_hash(protocol)
    };

    if verifier.is_valid(proposer, &signed_hash, signature) {
        Ok(())
    } else {
        Err(AuthenticityError::InvalidSignature { signer: *proposer }.into())
    }
}
