//! Structured-data hashing
//!
//! Deterministic, domain-separated hashing of typed protocol structs into a
//! single 32-byte commitment using BLAKE3:
//! - A domain separator binds the struct to a named domain and protocol address
//! - Each struct type is committed via the hash of its type descriptor string
//! - Fields are encoded as fixed-size 32-byte words; dynamic fields are
//!   pre-digested so the outer encoding has constant shape
//!
//! The resulting typed hash is both the signature payload and the lookup key
//! for the replay and credit ledgers, so identical inputs must always produce
//! identical output.

use crate::types::address::Address;

/// Hash size in bytes (BLAKE3 output)
pub const HASH_SIZE: usize = 32;

/// 32-byte protocol hash
pub type Hash = [u8; HASH_SIZE];

/// The all-zero hash, used as "not set" in optional commitment fields
pub const ZERO_HASH: Hash = [0u8; HASH_SIZE];

/// Framing prefix for typed hashes, separating them from raw message hashes
const TYPED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Type descriptor committed into every domain separator
const DOMAIN_TYPE_DESCRIPTOR: &str = "PactumDomain(string name,string version,address protocol)";

/// Hash arbitrary bytes to a 32-byte digest
#[inline]
pub fn hash_bytes(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Hashing domain: a named scope plus the protocol address it belongs to.
///
/// Two structs with identical fields hashed under different domains never
/// collide; each proposal variant owns a domain named after it, and the
/// multiproposal batch format owns one protocol-wide domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    pub version: &'static str,
    pub protocol: Address,
}

impl Domain {
    pub fn new(name: &'static str, version: &'static str, protocol: Address) -> Self {
        Self {
            name,
            version,
            protocol,
        }
    }

    /// Domain separator: the struct hash of the domain itself
    pub fn separator(&self) -> Hash {
        let mut encoder = StructEncoder::new(DOMAIN_TYPE_DESCRIPTOR);
        encoder.push_str(self.name);
        encoder.push_str(self.version);
        encoder.push_address(&self.protocol);
        encoder.finish()
    }

    /// Final typed hash of a struct hash under this domain
    pub fn typed_hash(&self, struct_hash: &Hash) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&TYPED_DATA_PREFIX);
        hasher.update(&self.separator());
        hasher.update(struct_hash);
        *hasher.finalize().as_bytes()
    }
}

/// Fixed-shape struct encoder.
///
/// Accumulates 32-byte words: the type-descriptor hash first, then one word
/// per field in declaration order. Integers are big-endian padded into the
/// low bytes of their word; dynamic fields are digested before inclusion.
pub struct StructEncoder {
    words: Vec<u8>,
}

impl StructEncoder {
    pub fn new(type_descriptor: &str) -> Self {
        let mut encoder = Self {
            words: Vec::with_capacity(HASH_SIZE * 16),
        };
        encoder.push_hash(&hash_bytes(type_descriptor.as_bytes()));
        encoder
    }

    pub fn push_hash(&mut self, hash: &Hash) {
        self.words.extend_from_slice(hash);
    }

    pub fn push_address(&mut self, address: &Address) {
        self.words.extend_from_slice(&address.0);
    }

    pub fn push_u128(&mut self, value: u128) {
        let mut word = [0u8; HASH_SIZE];
        word[HASH_SIZE - 16..].copy_from_slice(&value.to_be_bytes());
        self.words.extend_from_slice(&word);
    }

    pub fn push_u64(&mut self, value: u64) {
        self.push_u128(value as u128);
    }

    pub fn push_u32(&mut self, value: u32) {
        self.push_u128(value as u128);
    }

    pub fn push_u8(&mut self, value: u8) {
        self.push_u128(value as u128);
    }

    pub fn push_bool(&mut self, value: bool) {
        self.push_u128(value as u128);
    }

    /// Dynamic byte strings are pre-digested to keep the encoding fixed-shape
    pub fn push_bytes(&mut self, data: &[u8]) {
        self.push_hash(&hash_bytes(data));
    }

    pub fn push_str(&mut self, value: &str) {
        self.push_bytes(value.as_bytes());
    }

    /// Hash the accumulated words into the struct hash
    pub fn finish(self) -> Hash {
        hash_bytes(&self.words)
    }
}
