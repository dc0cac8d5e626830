//! Merkle inclusion proofs
//!
//! Sorted-pair binary Merkle trees over 32-byte leaves, used for:
//! - Multiproposal batches: one signature over a root authorizes many
//!   proposal hashes
//! - Collateral-id whitelists: one signed proposal covers an explicit id set
//!
//! Sorting each sibling pair before hashing makes proofs position-independent,
//! so a proof is just the sibling path with no index bookkeeping.

use serde::{Deserialize, Serialize};

use crate::crypto::hashing::Hash;

/// Hash two nodes into their parent, sorting the pair first
#[inline]
pub fn hash_node_pair(a: &Hash, b: &Hash) -> Hash {
    let mut hasher = blake3::Hasher::new();
    if a <= b {
        hasher.update(a);
        hasher.update(b);
    } else {
        hasher.update(b);
        hasher.update(a);
    }
    *hasher.finalize().as_bytes()
}

/// Fold a leaf through its sibling path, reconstructing the root
pub fn process_proof(leaf: &Hash, proof: &[Hash]) -> Hash {
    proof
        .iter()
        .fold(*leaf, |node, sibling| hash_node_pair(&node, sibling))
}

/// Verify that `leaf` is a member of the tree with `root`
pub fn verify_proof(leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
    process_proof(leaf, proof) == *root
}

/// Inclusion proof: the sibling path from leaf to root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    pub fn new(siblings: Vec<Hash>) -> Self {
        Self { siblings }
    }

    /// An empty proof; the multiproposal verifier treats this as "not a batch"
    pub fn empty() -> Self {
        Self {
            siblings: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    pub fn verify(&self, leaf: &Hash, root: &Hash) -> bool {
        verify_proof(leaf, &self.siblings, root)
    }
}

/// Binary sorted-pair Merkle tree built from a fixed leaf set.
///
/// Odd nodes at any level are promoted to the next level unhashed.
pub struct MerkleTree {
    /// layers[0] are the leaves, the last layer is the root
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree over the given leaves; empty input yields no root
    pub fn from_leaves(leaves: Vec<Hash>) -> Self {
        let mut layers = vec![leaves];

        while layers.last().map(Vec::len).unwrap_or(0) > 1 {
            let current = layers.last().expect("loop guard checked the layer");
            let mut next = Vec::with_capacity((current.len() + 1) / 2);

            for pair in current.chunks(2) {
                match pair {
                    [left, right] => next.push(hash_node_pair(left, right)),
                    [odd] => next.push(*odd),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                }
            }
            layers.push(next);
        }

        Self { layers }
    }

    pub fn leaf_count(&self) -> usize {
        self.layers.first().map(Vec::len).unwrap_or(0)
    }

    pub fn root(&self) -> Option<Hash> {
        self.layers.last().and_then(|layer| layer.first()).copied()
    }

    /// Sibling path for the leaf at `index`
    pub fn proof_for(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut siblings = Vec::new();
        let mut position = index;

        for layer in &self.layers[..self.layers.len().saturating_sub(1)] {
            let sibling_position = position ^ 1;
            // a promoted odd node has no sibling at this level
            if sibling_position < layer.len() {
                siblings.push(layer[sibling_position]);
            }
            position /= 2;
        }

        Some(MerkleProof::new(siblings))
    }
}
