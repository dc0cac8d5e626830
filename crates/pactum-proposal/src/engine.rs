//! Proposal acceptance engine
//!
//! The shared control flow every variant funnels through. Acceptance is one
//! atomic transition gated by an ordered check sequence:
//!
//! 1. caller is the proposal's loan contract and carries the active-loan tag
//! 2. the proposal was registered on-chain, or the signature verifies
//!    (directly or through a multiproposal inclusion proof)
//! 3. proposer and acceptor differ
//! 4. refinancing ids are compatible
//! 5. the proposal has not expired
//! 6. the proposer's nonce is usable
//! 7. the acceptor passes the allow-list / controller gate
//! 8. replay protection is consumed: single-use proposals revoke the nonce,
//!    limited proposals draw on the credit ledger
//! 9. the collateral state fingerprint still matches, when required
//!
//! Every fallible pure check (including the fingerprint read and
//! duration resolution) runs before the first ledger write, so a failed
//! acceptance leaves zero persisted effects; ledger writes are finalized
//! before the vault is called, so no reentrant collaborator can observe a
//! half-updated ledger.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, instrument};

use pactum_common::crypto::signature::SignatureVerifier;
use pactum_common::error::{AuthError, StateError, TemporalError};
use pactum_common::{
    Address, Asset, Hash, LoanId, LoanTerms, PactumError, Result, TxContext, ZERO_HASH,
};
use pactum_ledger::{NonceLedger, UtilizedCreditLedger};
use pactum_oracle::feed::{FeedConfig, FeedRegistry, PairFeedRegistry, PriceSource};
use pactum_oracle::lp::{PoolPriceSource, PositionSource};
use pactum_oracle::sequencer::SequencerOracle;

use crate::base::{check_refinancing, resolve_duration, ProposalBase};
use crate::collaborators::{
    AcceptorController, LoanVault, StateFingerprintRegistry, TagRegistry, ACTIVE_LOAN_TAG,
};
use crate::multiproposal::verify_authorization;
use crate::variants::{AcceptanceValues, DerivedTerms, Proposal};
use pactum_common::crypto::merkle::MerkleProof;

/// Everything an acceptor submits in one acceptance transaction
#[derive(Debug, Clone)]
pub struct AcceptanceRequest {
    /// The accepting counterparty (the caller is the loan contract, not the
    /// acceptor)
    pub acceptor: Address,
    /// 0 = open a new loan; nonzero = refinance that loan
    pub refinancing_loan_id: LoanId,
    pub proposal: Proposal,
    pub values: AcceptanceValues,
    /// Proposer's signature; ignored when the proposal was made on-chain
    pub signature: Vec<u8>,
    /// Multiproposal inclusion proof; empty means "not a batch"
    pub inclusion_proof: MerkleProof,
    /// Opaque passthrough to the vault (permit data and the like)
    pub extra: Vec<u8>,
}

/// Result of a successful acceptance
#[derive(Debug, Clone)]
pub struct Acceptance {
    pub proposal_hash: Hash,
    pub loan_id: LoanId,
    pub terms: LoanTerms,
}

/// The proposal engine: ledgers, registries, and oracle handles wired
/// together behind the acceptance entry point
pub struct ProposalEngine {
    protocol: Address,
    nonces: Arc<NonceLedger>,
    credit: Arc<UtilizedCreditLedger>,
    signatures: Arc<SignatureVerifier>,
    tags: Arc<dyn TagRegistry>,
    vaults: DashMap<Address, Arc<dyn LoanVault>>,
    fingerprints: Option<Arc<dyn StateFingerprintRegistry>>,
    acceptor_controllers: DashMap<Address, Arc<dyn AcceptorController>>,
    feeds: Option<Arc<dyn FeedRegistry>>,
    pair_feeds: Option<Arc<dyn PairFeedRegistry>>,
    positions: Option<Arc<dyn PositionSource>>,
    pools: Option<Arc<dyn PoolPriceSource>>,
    sequencer: Option<Arc<dyn SequencerOracle>>,
    feed_config: FeedConfig,
    /// Proposal hashes registered on-chain by their proposer
    made: DashMap<Hash, Address>,
}

impl ProposalEngine {
    pub fn new(protocol: Address, tags: Arc<dyn TagRegistry>) -> Self {
        Self {
            protocol,
            nonces: Arc::new(NonceLedger::new()),
            credit: Arc::new(UtilizedCreditLedger::new()),
            signatures: Arc::new(SignatureVerifier::new()),
            tags,
            vaults: DashMap::new(),
            fingerprints: None,
            acceptor_controllers: DashMap::new(),
            feeds: None,
            pair_feeds: None,
            positions: None,
            pools: None,
            sequencer: None,
            feed_config: FeedConfig::default(),
            made: DashMap::new(),
        }
    }

    /// Share externally-owned ledgers instead of the engine's own
    pub fn with_ledgers(
        mut self,
        nonces: Arc<NonceLedger>,
        credit: Arc<UtilizedCreditLedger>,
    ) -> Self {
        self.nonces = nonces;
        self.credit = credit;
        self
    }

    /// Inject a verifier with contract-wallet validators registered
    pub fn with_signature_verifier(mut self, signatures: Arc<SignatureVerifier>) -> Self {
        self.signatures = signatures;
        self
    }

    pub fn with_fingerprint_registry(mut self, registry: Arc<dyn StateFingerprintRegistry>) -> Self {
        self.fingerprints = Some(registry);
        self
    }

    pub fn with_feed_registry(mut self, registry: Arc<dyn FeedRegistry>) -> Self {
        self.feeds = Some(registry);
        self
    }

    pub fn with_pair_feed_registry(mut self, registry: Arc<dyn PairFeedRegistry>) -> Self {
        self.pair_feeds = Some(registry);
        self
    }

    pub fn with_position_source(mut self, positions: Arc<dyn PositionSource>) -> Self {
        self.positions = Some(positions);
        self
    }

    pub fn with_pool_price_source(mut self, pools: Arc<dyn PoolPriceSource>) -> Self {
        self.pools = Some(pools);
        self
    }

    pub fn with_sequencer_oracle(mut self, sequencer: Arc<dyn SequencerOracle>) -> Self {
        self.sequencer = Some(sequencer);
        self
    }

    pub fn with_feed_config(mut self, config: FeedConfig) -> Self {
        self.feed_config = config;
        self
    }

    /// Register the vault implementation living at a loan-contract address
    pub fn register_vault(&self, address: Address, vault: Arc<dyn LoanVault>) {
        self.vaults.insert(address, vault);
    }

    pub fn register_acceptor_controller(
        &self,
        address: Address,
        controller: Arc<dyn AcceptorController>,
    ) {
        self.acceptor_controllers.insert(address, controller);
    }

    pub fn nonces(&self) -> &NonceLedger {
        &self.nonces
    }

    pub fn credit(&self) -> &UtilizedCreditLedger {
        &self.credit
    }

    /// The hash identifying `proposal` under this engine's protocol address
    pub fn proposal_hash(&self, proposal: &Proposal) -> Hash {
        proposal.hash(self.protocol)
    }

    pub fn is_proposal_made(&self, proposal_hash: &Hash) -> bool {
        self.made.contains_key(proposal_hash)
    }

    /// Register a proposal on-chain, waiving signature verification for its
    /// hash. Only the stated proposer may register.
    #[instrument(skip(self, proposal), fields(caller = %ctx.caller))]
    pub fn make_proposal(&self, ctx: &TxContext, proposal: &Proposal) -> Result<Hash> {
        proposal.validate()?;

        let base = proposal.base();
        if ctx.caller != base.proposer {
            return Err(AuthError::CallerIsNotStatedProposer {
                caller: ctx.caller,
                proposer: base.proposer,
            }
            .into());
        }

        let proposal_hash = proposal.hash(self.protocol);
        self.made.insert(proposal_hash, base.proposer);
        info!(proposal_hash = %hex_hash(&proposal_hash), proposer = %base.proposer, "proposal made");
        Ok(proposal_hash)
    }

    /// Revoke one of the caller's nonces
    pub fn revoke_nonce(&self, ctx: &TxContext, space: u64, nonce: u64) -> Result<()> {
        self.nonces.revoke(ctx, ctx.caller, space, nonce)
    }

    /// Bump the caller's nonce space, invalidating all its nonces at once
    pub fn revoke_nonce_space(&self, ctx: &TxContext) -> u64 {
        self.nonces.revoke_nonce_space(ctx)
    }

    /// Accept a proposal: derive terms, run the check sequence, consume
    /// replay protection, and open (or refinance) the loan.
    #[instrument(skip(self, request), fields(caller = %ctx.caller, acceptor = %request.acceptor))]
    pub fn accept_proposal(&self, ctx: &TxContext, request: AcceptanceRequest) -> Result<Acceptance> {
        let proposal = &request.proposal;
        let base = proposal.base();

        // malformed parameters fail before anything else is looked at
        proposal.validate()?;
        let proposal_hash = proposal.hash(self.protocol);

        // variant pricing resolves first; the state machine consumes the
        // derived amounts as plain data
        let derived = self.derive(proposal, &request.values, ctx.timestamp)?;

        // 1. caller authorization
        if ctx.caller != base.loan_contract {
            return Err(AuthError::CallerNotLoanContract {
                caller: ctx.caller,
                loan_contract: base.loan_contract,
            }
            .into());
        }
        if !self.tags.has_tag(&base.loan_contract, ACTIVE_LOAN_TAG) {
            return Err(AuthError::MissingActiveLoanTag {
                address: base.loan_contract,
            }
            .into());
        }

        // 2. authenticity: on-chain registration first, signature fallback
        if !self.made.contains_key(&proposal_hash) {
            verify_authorization(
                &self.signatures,
                self.protocol,
                &base.proposer,
                &proposal_hash,
                &request.signature,
                &request.inclusion_proof,
            )?;
        }

        // 3. self-dealing
        if request.acceptor == base.proposer {
            return Err(AuthError::AcceptorIsProposer {
                address: request.acceptor,
            }
            .into());
        }

        // 4. refinancing compatibility
        check_refinancing(
            base.is_offer,
            base.refinancing_loan_id,
            request.refinancing_loan_id,
        )?;

        // 5. expiration (strict)
        if ctx.timestamp >= base.expiration {
            return Err(TemporalError::Expired {
                current: ctx.timestamp,
                expiration: base.expiration,
            }
            .into());
        }

        // 6. nonce usability
        if !self
            .nonces
            .is_usable(&base.proposer, base.nonce_space, base.nonce)
        {
            return Err(StateError::NonceNotUsable {
                owner: base.proposer,
                space: base.nonce_space,
                nonce: base.nonce,
            }
            .into());
        }

        // 7. acceptor gate
        self.check_acceptor(base, &request.acceptor)?;

        // remaining pure checks run before the first ledger write so a
        // failure here leaves no partial effects
        let duration = resolve_duration(base.duration_or_date, ctx.timestamp)?;
        self.check_collateral_state(base, &derived.collateral)?;

        // 8. consume replay protection
        if base.available_credit_limit == 0 {
            self.nonces
                .consume(base.proposer, base.nonce_space, base.nonce)?;
        } else {
            let credit_id = if base.utilized_credit_id == ZERO_HASH {
                proposal_hash
            } else {
                base.utilized_credit_id
            };
            self.credit.utilize(
                &base.proposer,
                &credit_id,
                derived.credit_amount,
                base.available_credit_limit,
            )?;
        }

        let terms = build_terms(base, &request.acceptor, duration, &derived);
        let loan_id = self.settle(&request, &proposal_hash, &terms, base)?;

        info!(
            proposal_hash = %hex_hash(&proposal_hash),
            loan_id,
            credit_amount = derived.credit_amount,
            "proposal accepted"
        );
        Ok(Acceptance {
            proposal_hash,
            loan_id,
            terms,
        })
    }

    fn check_acceptor(&self, base: &ProposalBase, acceptor: &Address) -> Result<()> {
        if !base.allowed_acceptor.is_zero() && *acceptor != base.allowed_acceptor {
            return Err(AuthError::CallerNotAllowedAcceptor {
                current: *acceptor,
                allowed: base.allowed_acceptor,
            }
            .into());
        }

        if !base.acceptor_controller.is_zero() {
            let controller = self
                .acceptor_controllers
                .get(&base.acceptor_controller)
                .ok_or_else(|| {
                    PactumError::Config(format!(
                        "no acceptor controller registered at {}",
                        base.acceptor_controller
                    ))
                })?;
            if !controller.is_allowed(acceptor, &base.proposer, &base.acceptor_controller_data) {
                return Err(AuthError::AcceptorRefused {
                    acceptor: *acceptor,
                    controller: base.acceptor_controller,
                }
                .into());
            }
        }
        Ok(())
    }

    fn check_collateral_state(&self, base: &ProposalBase, collateral: &Asset) -> Result<()> {
        if !base.check_collateral_state_fingerprint {
            return Ok(());
        }

        let computer = self
            .fingerprints
            .as_ref()
            .and_then(|registry| registry.computer_for(&collateral.address))
            .ok_or(StateError::MissingFingerprintComputer {
                asset: collateral.address,
            })?;

        let current = computer.compute_fingerprint(&collateral.address, collateral.id)?;
        if current != base.collateral_state_fingerprint {
            return Err(StateError::FingerprintMismatch {
                declared: hex_hash(&base.collateral_state_fingerprint),
                current: hex_hash(&current),
            }
            .into());
        }
        debug!(asset = %collateral.address, "collateral fingerprint verified");
        Ok(())
    }

    fn settle(
        &self,
        request: &AcceptanceRequest,
        proposal_hash: &Hash,
        terms: &LoanTerms,
        base: &ProposalBase,
    ) -> Result<LoanId> {
        let vault = self.vaults.get(&base.loan_contract).ok_or_else(|| {
            PactumError::Config(format!(
                "no loan vault registered at {}",
                base.loan_contract
            ))
        })?;

        if request.refinancing_loan_id == 0 {
            vault.create_loan(proposal_hash, terms, &request.extra)
        } else {
            vault.refinance_loan(
                request.refinancing_loan_id,
                proposal_hash,
                terms,
                &request.extra,
            )
        }
    }

    fn derive(
        &self,
        proposal: &Proposal,
        values: &AcceptanceValues,
        now: u64,
    ) -> Result<DerivedTerms> {
        match (proposal, values) {
            (Proposal::Simple(p), AcceptanceValues::Simple) => p.derive(),
            (Proposal::Fungible(p), AcceptanceValues::Fungible(v)) => p.derive(v),
            (Proposal::DutchAuction(p), AcceptanceValues::DutchAuction(v)) => p.derive(v, now),
            (Proposal::ChainlinkElastic(p), AcceptanceValues::ChainlinkElastic(v)) => {
                let feeds = self
                    .feeds
                    .clone()
                    .ok_or_else(|| PactumError::Config("price feed registry not wired".into()))?;
                let prices = PriceSource::new(feeds, self.feed_config);
                p.derive(&prices, self.sequencer.as_deref(), now, v)
            }
            (Proposal::UniswapLp(p), AcceptanceValues::UniswapLp(v)) => {
                let pair_feeds = self
                    .pair_feeds
                    .as_deref()
                    .ok_or_else(|| PactumError::Config("pair feed registry not wired".into()))?;
                let positions = self
                    .positions
                    .as_deref()
                    .ok_or_else(|| PactumError::Config("position source not wired".into()))?;
                let pools = self
                    .pools
                    .as_deref()
                    .ok_or_else(|| PactumError::Config("pool price source not wired".into()))?;
                p.derive(
                    pair_feeds,
                    positions,
                    pools,
                    self.feed_config.max_price_age,
                    now,
                    v,
                )
            }
            (Proposal::List(p), AcceptanceValues::List(v)) => p.derive(v),
            _ => Err(AcceptanceValues::mismatch().into()),
        }
    }
}

fn build_terms(
    base: &ProposalBase,
    acceptor: &Address,
    duration: u64,
    derived: &DerivedTerms,
) -> LoanTerms {
    let (lender, borrower) = LoanTerms::parties(base.is_offer, base.proposer, *acceptor);
    let (lender_spec_hash, borrower_spec_hash) = if base.is_offer {
        (base.proposer_spec_hash, ZERO_HASH)
    } else {
        (ZERO_HASH, base.proposer_spec_hash)
    };

    LoanTerms {
        lender,
        borrower,
        duration,
        collateral: derived.collateral,
        credit: Asset::fungible(base.credit_address, derived.credit_amount),
        fixed_interest_amount: base.fixed_interest_amount,
        accruing_interest_apr: base.accruing_interest_apr,
        lender_spec_hash,
        borrower_spec_hash,
    }
}

fn hex_hash(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}
