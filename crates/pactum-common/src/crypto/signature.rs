//! Signature verification
//!
//! Two validation paths behind one call, mirroring how off-chain signers and
//! smart-contract wallets coexist:
//! - Plain Ed25519: the signer address is the verifying key, so verification
//!   is self-contained
//! - Contract wallets: a validator registered for the signer address decides
//!   whether an opaque signature blob authorizes the hash

use std::sync::Arc;

use dashmap::DashMap;
use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, Verifier};

use crate::crypto::hashing::Hash;
use crate::types::address::Address;

/// Length of a plain Ed25519 signature in bytes
pub const SIGNATURE_LEN: usize = 64;

/// Pluggable validator for contract-wallet accounts (smart-wallet standard)
pub trait ContractWalletVerifier: Send + Sync {
    /// Whether `signature` authorizes `hash` on behalf of the wallet
    fn is_valid_signature(&self, hash: &Hash, signature: &[u8]) -> bool;
}

/// Signature verifier with a contract-wallet registry and Ed25519 fallback
#[derive(Default)]
pub struct SignatureVerifier {
    wallets: DashMap<Address, Arc<dyn ContractWalletVerifier>>,
}

impl SignatureVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contract-wallet validator for an address.
    ///
    /// Registered addresses never fall back to the Ed25519 path.
    pub fn register_wallet(&self, address: Address, verifier: Arc<dyn ContractWalletVerifier>) {
        self.wallets.insert(address, verifier);
    }

    /// Validate `signature` over `hash` for `signer`
    pub fn is_valid(&self, signer: &Address, hash: &Hash, signature: &[u8]) -> bool {
        if let Some(wallet) = self.wallets.get(signer) {
            return wallet.is_valid_signature(hash, signature);
        }

        let Some(verifying_key) = signer.verifying_key() else {
            return false;
        };
        let Ok(signature) = Ed25519Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(hash, &signature).is_ok()
    }
}

/// Sign a protocol hash with an Ed25519 key, producing the wire-format bytes
pub fn sign_hash(key: &SigningKey, hash: &Hash) -> Vec<u8> {
    key.sign(hash).to_bytes().to_vec()
}
