//! End-to-end acceptance scenarios against the fully wired engine

mod common;

use std::sync::Arc;

use common::{ConstFingerprint, Harness, DAY, NOW};

use pactum_common::crypto::hashing::hash_bytes;
use pactum_common::crypto::merkle::MerkleTree;
use pactum_common::crypto::signature::sign_hash;
use pactum_common::error::{
    AuthError, AuthenticityError, BoundsError, ProposalError, StateError, TemporalError,
};
use pactum_common::{Address, PactumError, TxContext, MINUTE};
use pactum_proposal::{
    AcceptanceValues, AcceptorController, DutchAuctionProposal, DutchAuctionValues,
    FungibleProposal, FungibleValues, ListProposal, ListValues, Multiproposal, Proposal,
    SimpleProposal,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn simple_offer_full_flow() {
    init_tracing();
    let harness = Harness::new();

    let proposal = harness.simple_offer();
    let request = harness.request_for(proposal.clone(), AcceptanceValues::Simple);

    let acceptance = harness
        .engine
        .accept_proposal(&harness.ctx(NOW), request.clone())
        .unwrap();

    assert_eq!(acceptance.loan_id, 1);
    assert_eq!(acceptance.terms.lender, harness.lender());
    assert_eq!(acceptance.terms.borrower, harness.borrower());
    assert_eq!(acceptance.terms.duration, DAY);
    assert_eq!(acceptance.terms.credit.amount, 100);
    assert_eq!(acceptance.terms.collateral.amount, 10);
    assert_eq!(harness.vault.created.lock().len(), 1);

    // single-use proposal consumed its nonce
    assert!(!harness.engine.nonces().is_usable(&harness.lender(), 0, 1));

    // replaying the same signed proposal fails on the nonce
    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::State(StateError::NonceNotUsable { nonce: 1, .. }))
    ));
    assert_eq!(harness.vault.created.lock().len(), 1);
}

#[test]
fn request_flips_lender_and_borrower() {
    let harness = Harness::new();

    let mut base = harness.offer_base();
    base.is_offer = false;
    base.proposer = harness.borrower();
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });

    let signature = harness.sign(&harness.borrower_key, &proposal);
    let mut request = harness.request_for(proposal, AcceptanceValues::Simple);
    request.signature = signature;
    request.acceptor = harness.lender();

    let acceptance = harness
        .engine
        .accept_proposal(&harness.ctx(NOW), request)
        .unwrap();
    assert_eq!(acceptance.terms.lender, harness.lender());
    assert_eq!(acceptance.terms.borrower, harness.borrower());
}

#[test]
fn wrong_caller_is_rejected() {
    let harness = Harness::new();
    let request = harness.request_for(harness.simple_offer(), AcceptanceValues::Simple);

    let stranger = TxContext::new(Address([0x55; 32]), NOW);
    let result = harness.engine.accept_proposal(&stranger, request);
    assert!(matches!(
        result,
        Err(PactumError::Auth(AuthError::CallerNotLoanContract { .. }))
    ));
}

#[test]
fn untagged_loan_contract_is_rejected() {
    let harness = Harness::new();

    // proposal naming a loan contract without the active-loan tag
    let untagged = Address([0x88; 32]);
    let mut base = harness.offer_base();
    base.loan_contract = untagged;
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);

    let result = harness
        .engine
        .accept_proposal(&TxContext::new(untagged, NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Auth(AuthError::MissingActiveLoanTag { .. }))
    ));
}

#[test]
fn wrong_signer_is_rejected() {
    let harness = Harness::new();

    let proposal = harness.simple_offer();
    let mut request = harness.request_for(proposal.clone(), AcceptanceValues::Simple);
    // borrower signs instead of the proposing lender
    request.signature = harness.sign(&harness.borrower_key, &proposal);

    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Authenticity(AuthenticityError::InvalidSignature { .. }))
    ));
}

#[test]
fn made_proposal_needs_no_signature() {
    let harness = Harness::new();
    let proposal = harness.simple_offer();

    // only the stated proposer may register
    let stranger_ctx = TxContext::new(harness.borrower(), NOW);
    assert!(matches!(
        harness.engine.make_proposal(&stranger_ctx, &proposal),
        Err(PactumError::Auth(AuthError::CallerIsNotStatedProposer { .. }))
    ));

    let proposer_ctx = TxContext::new(harness.lender(), NOW);
    let hash = harness.engine.make_proposal(&proposer_ctx, &proposal).unwrap();
    assert!(harness.engine.is_proposal_made(&hash));

    let mut request = harness.request_for(proposal, AcceptanceValues::Simple);
    request.signature = Vec::new();

    harness
        .engine
        .accept_proposal(&harness.ctx(NOW), request)
        .unwrap();
}

#[test]
fn proposer_cannot_accept_own_proposal() {
    let harness = Harness::new();
    let mut request = harness.request_for(harness.simple_offer(), AcceptanceValues::Simple);
    request.acceptor = harness.lender();

    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Auth(AuthError::AcceptorIsProposer { .. }))
    ));
}

#[test]
fn offer_with_zero_id_refinances_any_loan() {
    let harness = Harness::new();

    let mut request = harness.request_for(harness.simple_offer(), AcceptanceValues::Simple);
    request.refinancing_loan_id = 7;

    harness
        .engine
        .accept_proposal(&harness.ctx(NOW), request)
        .unwrap();

    let refinanced = harness.vault.refinanced.lock();
    assert_eq!(refinanced.len(), 1);
    assert_eq!(refinanced[0].0, 7);
    assert!(harness.vault.created.lock().is_empty());
}

#[test]
fn request_with_zero_id_cannot_refinance() {
    let harness = Harness::new();

    let mut base = harness.offer_base();
    base.is_offer = false;
    base.proposer = harness.borrower();
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });

    let signature = harness.sign(&harness.borrower_key, &proposal);
    let mut request = harness.request_for(proposal, AcceptanceValues::Simple);
    request.signature = signature;
    request.acceptor = harness.lender();
    request.refinancing_loan_id = 7;

    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Proposal(ProposalError::IncompatibleRefinancing {
            declared: 0,
            requested: 7
        }))
    ));
}

#[test]
fn refinance_only_proposal_rejects_new_loans() {
    let harness = Harness::new();

    let mut base = harness.offer_base();
    base.refinancing_loan_id = 9;
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });
    // request_for asks for a new loan (refinancing_loan_id = 0)
    let request = harness.request_for(proposal, AcceptanceValues::Simple);

    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Proposal(ProposalError::IncompatibleRefinancing {
            declared: 9,
            requested: 0
        }))
    ));
}

#[test]
fn expired_proposal_is_rejected() {
    let harness = Harness::new();
    let request = harness.request_for(harness.simple_offer(), AcceptanceValues::Simple);

    let at_expiration = harness.ctx(NOW + 7 * DAY);
    let result = harness.engine.accept_proposal(&at_expiration, request);
    assert!(matches!(
        result,
        Err(PactumError::Temporal(TemporalError::Expired { .. }))
    ));
}

#[test]
fn allowed_acceptor_gate() {
    let harness = Harness::new();

    let mut base = harness.offer_base();
    base.allowed_acceptor = Address([0x66; 32]);
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);

    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Auth(AuthError::CallerNotAllowedAcceptor { .. }))
    ));
}

mockall::mock! {
    Controller {}
    impl AcceptorController for Controller {
        fn is_allowed(&self, acceptor: &Address, proposer: &Address, data: &[u8]) -> bool;
    }
}

#[test]
fn acceptor_controller_gate() {
    let harness = Harness::new();
    let controller_address = Address([0x44; 32]);

    let mut controller = MockController::new();
    controller
        .expect_is_allowed()
        .returning(|_, _, data| data == b"vip".as_slice());
    harness
        .engine
        .register_acceptor_controller(controller_address, Arc::new(controller));

    // refused: controller data does not satisfy the controller
    let mut base = harness.offer_base();
    base.acceptor_controller = controller_address;
    base.acceptor_controller_data = b"plebs".to_vec();
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);
    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Auth(AuthError::AcceptorRefused { .. }))
    ));

    // allowed
    let mut base = harness.offer_base();
    base.acceptor_controller = controller_address;
    base.acceptor_controller_data = b"vip".to_vec();
    base.nonce = 2;
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);
    harness
        .engine
        .accept_proposal(&harness.ctx(NOW), request)
        .unwrap();
}

#[test]
fn fingerprint_check_paths() {
    let harness = Harness::new();
    let collateral_address = harness.offer_base().collateral.address;
    let fingerprint = hash_bytes(b"collateral-state-v1");

    // no computer registered
    let mut base = harness.offer_base();
    base.check_collateral_state_fingerprint = true;
    base.collateral_state_fingerprint = fingerprint;
    let proposal = Proposal::Simple(SimpleProposal {
        base: base.clone(),
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);
    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::State(StateError::MissingFingerprintComputer { .. }))
    ));

    // mismatching state leaves the nonce untouched
    harness.fingerprints.register(
        collateral_address,
        Arc::new(ConstFingerprint(hash_bytes(b"collateral-state-v2"))),
    );
    let proposal = Proposal::Simple(SimpleProposal {
        base: base.clone(),
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);
    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::State(StateError::FingerprintMismatch { .. }))
    ));
    assert!(harness.engine.nonces().is_usable(&harness.lender(), 0, 1));

    // matching state accepts
    harness
        .fingerprints
        .register(collateral_address, Arc::new(ConstFingerprint(fingerprint)));
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);
    harness
        .engine
        .accept_proposal(&harness.ctx(NOW), request)
        .unwrap();
}

#[test]
fn shared_credit_limit_across_acceptances() {
    init_tracing();
    let harness = Harness::new();

    // fungible offer, 1:1 ratio, ceiling of 1000 across acceptances
    let mut base = harness.offer_base();
    base.available_credit_limit = 1_000;
    let proposal = Proposal::Fungible(FungibleProposal {
        base,
        min_collateral_amount: 1,
        credit_per_collateral_unit: 10u128.pow(38),
    });

    let accept = |amount: u128| {
        let request = harness.request_for(
            proposal.clone(),
            AcceptanceValues::Fungible(FungibleValues {
                collateral_amount: amount,
            }),
        );
        harness.engine.accept_proposal(&harness.ctx(NOW), request)
    };

    accept(400).unwrap();
    accept(400).unwrap();

    match accept(400) {
        Err(PactumError::State(StateError::CreditLimitExceeded { attempted, limit })) => {
            assert_eq!(attempted, 1_200);
            assert_eq!(limit, 1_000);
        }
        other => panic!("expected CreditLimitExceeded, got {other:?}"),
    }

    // limited proposals never consume the nonce
    assert!(harness.engine.nonces().is_usable(&harness.lender(), 0, 1));
    assert_eq!(harness.vault.created.lock().len(), 2);

    let hash = harness.engine.proposal_hash(&proposal);
    assert_eq!(harness.engine.credit().utilized(&harness.lender(), &hash), 800);
}

#[test]
fn dutch_auction_slippage_flow() {
    let harness = Harness::new();

    // borrower-initiated request descending from 200 to 100 over an hour
    let mut base = harness.offer_base();
    base.is_offer = false;
    base.proposer = harness.borrower();
    let proposal = Proposal::DutchAuction(DutchAuctionProposal {
        base,
        min_credit_amount: 100,
        max_credit_amount: 200,
        auction_start: NOW,
        auction_duration: 60 * MINUTE,
    });

    let accept = |intended: u128, slippage: u128, at: u64| {
        let signature = harness.sign(&harness.borrower_key, &proposal);
        let mut request = harness.request_for(
            proposal.clone(),
            AcceptanceValues::DutchAuction(DutchAuctionValues {
                intended_credit_amount: intended,
                slippage,
            }),
        );
        request.signature = signature;
        request.acceptor = harness.lender();
        harness.engine.accept_proposal(&harness.ctx(at), request)
    };

    // price at T+30min is 150; a window of [135, 140] misses it
    let result = accept(140, 5, NOW + 30 * MINUTE);
    assert!(matches!(
        result,
        Err(PactumError::Bounds(BoundsError::CreditAmountOutOfBounds {
            price: 150,
            intended: 140,
            slippage: 5
        }))
    ));

    let acceptance = accept(150, 5, NOW + 30 * MINUTE).unwrap();
    assert_eq!(acceptance.terms.credit.amount, 150);
}

#[test]
fn multiproposal_batch_signature_covers_all_leaves() {
    let harness = Harness::new();

    let proposals: Vec<Proposal> = (1..=3u64)
        .map(|nonce| {
            let mut base = harness.offer_base();
            base.nonce = nonce;
            Proposal::Simple(SimpleProposal {
                base,
                credit_amount: 100 * nonce as u128,
            })
        })
        .collect();

    let leaves: Vec<_> = proposals
        .iter()
        .map(|p| harness.engine.proposal_hash(p))
        .collect();
    let tree = MerkleTree::from_leaves(leaves);
    let root = tree.root().unwrap();

    // one signature authorizes the whole batch
    let batch_signature = sign_hash(
        &harness.lender_key,
        &Multiproposal::new(root).signing_hash(harness.protocol),
    );

    for (i, proposal) in proposals.into_iter().enumerate() {
        let mut request = harness.request_for(proposal, AcceptanceValues::Simple);
        request.signature = batch_signature.clone();
        request.inclusion_proof = tree.proof_for(i).unwrap();

        let acceptance = harness
            .engine
            .accept_proposal(&harness.ctx(NOW), request)
            .unwrap();
        assert_eq!(acceptance.terms.credit.amount, 100 * (i as u128 + 1));
    }
}

#[test]
fn list_proposal_resolves_proven_id() {
    let harness = Harness::new();

    let ids = [7u128, 8, 9];
    let tree = MerkleTree::from_leaves(
        ids.iter()
            .map(|&id| pactum_proposal::variants::list::collateral_id_leaf(id))
            .collect(),
    );

    let mut base = harness.offer_base();
    base.collateral.id = 0;
    let proposal = Proposal::List(ListProposal {
        base,
        collateral_ids_merkle_root: tree.root().unwrap(),
        credit_amount: 100,
    });

    let request = harness.request_for(
        proposal,
        AcceptanceValues::List(ListValues {
            collateral_id: 8,
            inclusion_proof: tree.proof_for(1).unwrap(),
        }),
    );

    let acceptance = harness
        .engine
        .accept_proposal(&harness.ctx(NOW), request)
        .unwrap();
    assert_eq!(acceptance.terms.collateral.id, 8);
}

#[test]
fn mismatched_values_are_rejected() {
    let harness = Harness::new();

    let request = harness.request_for(
        harness.simple_offer(),
        AcceptanceValues::Fungible(FungibleValues {
            collateral_amount: 1,
        }),
    );

    let result = harness.engine.accept_proposal(&harness.ctx(NOW), request);
    assert!(matches!(
        result,
        Err(PactumError::Proposal(ProposalError::MismatchedAcceptanceValues))
    ));
}

#[test]
fn absolute_deadline_resolves_duration_at_acceptance() {
    let harness = Harness::new();

    let mut base = harness.offer_base();
    base.duration_or_date = NOW + 3 * DAY; // absolute deadline
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });

    let request = harness.request_for(proposal.clone(), AcceptanceValues::Simple);
    let acceptance = harness
        .engine
        .accept_proposal(&harness.ctx(NOW + DAY), request)
        .unwrap();
    assert_eq!(acceptance.terms.duration, 2 * DAY);

    // past-dated deadline fails, and fails before any ledger write
    let mut base = harness.offer_base();
    base.duration_or_date = NOW - DAY + 7 * DAY; // well past threshold, before ctx time
    base.expiration = NOW + 30 * DAY;
    base.nonce = 2;
    let proposal = Proposal::Simple(SimpleProposal {
        base,
        credit_amount: 100,
    });
    let request = harness.request_for(proposal, AcceptanceValues::Simple);
    let result = harness
        .engine
        .accept_proposal(&harness.ctx(NOW + 7 * DAY), request);
    assert!(matches!(
        result,
        Err(PactumError::Temporal(TemporalError::DefaultDateInPast { .. }))
    ));
    assert!(harness.engine.nonces().is_usable(&harness.lender(), 0, 2));
}
