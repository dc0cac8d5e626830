//! Shared fixtures for acceptance tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use ed25519_dalek::SigningKey;
use parking_lot::Mutex;
use rand::rngs::OsRng;

use pactum_common::crypto::merkle::MerkleProof;
use pactum_common::crypto::signature::sign_hash;
use pactum_common::{
    Address, Asset, AssetCategory, Hash, LoanId, LoanTerms, Result, TxContext, ZERO_HASH,
};
use pactum_proposal::{
    AcceptanceRequest, AcceptanceValues, LoanVault, Proposal, ProposalBase, ProposalEngine,
    SimpleProposal, StateFingerprintComputer, StateFingerprintRegistry, TagRegistry,
    ACTIVE_LOAN_TAG,
};

pub const NOW: u64 = 1_700_000_000;
pub const DAY: u64 = 24 * 60 * 60;

/// Tag registry backed by a set
#[derive(Default)]
pub struct TestTagRegistry {
    tags: DashSet<(Address, String)>,
}

impl TestTagRegistry {
    pub fn grant(&self, address: Address, tag: &str) {
        self.tags.insert((address, tag.to_string()));
    }
}

impl TagRegistry for TestTagRegistry {
    fn has_tag(&self, address: &Address, tag: &str) -> bool {
        self.tags.contains(&(*address, tag.to_string()))
    }
}

/// Vault recording every call and assigning sequential loan ids
#[derive(Default)]
pub struct TestVault {
    next_id: AtomicU64,
    pub created: Mutex<Vec<(Hash, LoanTerms)>>,
    pub refinanced: Mutex<Vec<(LoanId, Hash, LoanTerms)>>,
}

impl LoanVault for TestVault {
    fn create_loan(&self, proposal_hash: &Hash, terms: &LoanTerms, _extra: &[u8]) -> Result<LoanId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.created.lock().push((*proposal_hash, terms.clone()));
        Ok(id)
    }

    fn refinance_loan(
        &self,
        loan_id: LoanId,
        proposal_hash: &Hash,
        terms: &LoanTerms,
        _extra: &[u8],
    ) -> Result<LoanId> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.refinanced
            .lock()
            .push((loan_id, *proposal_hash, terms.clone()));
        Ok(id)
    }
}

/// Fingerprint registry with per-asset computers
#[derive(Default)]
pub struct TestFingerprintRegistry {
    computers: DashMap<Address, Arc<dyn StateFingerprintComputer>>,
}

impl TestFingerprintRegistry {
    pub fn register(&self, asset: Address, computer: Arc<dyn StateFingerprintComputer>) {
        self.computers.insert(asset, computer);
    }
}

impl StateFingerprintRegistry for TestFingerprintRegistry {
    fn computer_for(&self, asset: &Address) -> Option<Arc<dyn StateFingerprintComputer>> {
        self.computers.get(asset).map(|c| Arc::clone(&c))
    }
}

/// Computer returning one fixed fingerprint
pub struct ConstFingerprint(pub Hash);

impl StateFingerprintComputer for ConstFingerprint {
    fn compute_fingerprint(&self, _asset: &Address, _id: u128) -> Result<Hash> {
        Ok(self.0)
    }
}

/// Engine plus the keys and collaborators the scenarios need
pub struct Harness {
    pub engine: ProposalEngine,
    pub protocol: Address,
    pub tags: Arc<TestTagRegistry>,
    pub vault: Arc<TestVault>,
    pub fingerprints: Arc<TestFingerprintRegistry>,
    pub loan_contract: Address,
    pub lender_key: SigningKey,
    pub borrower_key: SigningKey,
}

impl Harness {
    pub fn new() -> Self {
        let protocol = Address([0xee; 32]);
        let loan_contract = Address([0x77; 32]);

        let tags = Arc::new(TestTagRegistry::default());
        tags.grant(loan_contract, ACTIVE_LOAN_TAG);

        let vault = Arc::new(TestVault::default());
        let fingerprints = Arc::new(TestFingerprintRegistry::default());

        let engine = ProposalEngine::new(protocol, Arc::clone(&tags) as Arc<dyn TagRegistry>)
            .with_fingerprint_registry(
                Arc::clone(&fingerprints) as Arc<dyn StateFingerprintRegistry>
            );
        engine.register_vault(loan_contract, Arc::clone(&vault) as Arc<dyn LoanVault>);

        Self {
            engine,
            protocol,
            tags,
            vault,
            fingerprints,
            loan_contract,
            lender_key: SigningKey::generate(&mut OsRng),
            borrower_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn lender(&self) -> Address {
        Address::of(&self.lender_key)
    }

    pub fn borrower(&self) -> Address {
        Address::of(&self.borrower_key)
    }

    /// Context for the loan contract calling the engine
    pub fn ctx(&self, timestamp: u64) -> TxContext {
        TxContext::new(self.loan_contract, timestamp)
    }

    /// Base for a lender-initiated offer: 10 collateral units against the
    /// configured credit terms, 1-day duration, nonce (0, 1)
    pub fn offer_base(&self) -> ProposalBase {
        ProposalBase {
            collateral: Asset {
                category: AssetCategory::SemiFungible,
                address: Address([0x10; 32]),
                id: 42,
                amount: 10,
            },
            check_collateral_state_fingerprint: false,
            collateral_state_fingerprint: ZERO_HASH,
            credit_address: Address([0x20; 32]),
            available_credit_limit: 0,
            utilized_credit_id: ZERO_HASH,
            fixed_interest_amount: 0,
            accruing_interest_apr: 1_000,
            duration_or_date: DAY,
            expiration: NOW + 7 * DAY,
            allowed_acceptor: Address::ZERO,
            acceptor_controller: Address::ZERO,
            acceptor_controller_data: Vec::new(),
            proposer: self.lender(),
            proposer_spec_hash: ZERO_HASH,
            is_offer: true,
            refinancing_loan_id: 0,
            nonce_space: 0,
            nonce: 1,
            loan_contract: self.loan_contract,
        }
    }

    pub fn simple_offer(&self) -> Proposal {
        Proposal::Simple(SimpleProposal {
            base: self.offer_base(),
            credit_amount: 100,
        })
    }

    /// Sign a proposal with the given key in the engine's protocol domain
    pub fn sign(&self, key: &SigningKey, proposal: &Proposal) -> Vec<u8> {
        sign_hash(key, &self.engine.proposal_hash(proposal))
    }

    /// Borrower accepts a lender-signed proposal with the given values
    pub fn request_for(&self, proposal: Proposal, values: AcceptanceValues) -> AcceptanceRequest {
        let signature = self.sign(&self.lender_key, &proposal);
        AcceptanceRequest {
            acceptor: self.borrower(),
            refinancing_loan_id: 0,
            proposal,
            values,
            signature,
            inclusion_proof: MerkleProof::empty(),
            extra: Vec::new(),
        }
    }
}
