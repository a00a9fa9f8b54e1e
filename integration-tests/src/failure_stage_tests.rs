//! Integration tests for who pays when a transaction fails.
//!
//! | stage      | charged                                           |
//! |------------|---------------------------------------------------|
//! | ingest     | nothing                                           |
//! | pre-handle | the submitting node pays the network fee          |
//! | handle     | the payer pays the full fee, effects roll back    |
//!
//! Fee limits and payer solvency are checked at handle before anything
//! executes and select a reduced charge.

#![allow(clippy::arithmetic_side_effects)]

use {
    crate::harness::*,
    assert_matches::assert_matches,
    pretty_assertions::assert_eq,
    simplefees_ledger::TransactionEffects,
    simplefees_pipeline::{ChargingPolicy, ConfigError, PipelineConfig},
    simplefees_types::{AccountId, ResponseCode, Timestamp, Transaction},
    test_case::test_case,
};

const TOLERANCE_PCT: f64 = 0.01;

fn simple_transfer_usd() -> f64 {
    expected_crypto_transfer_usd(&TransferExtras::new(1, 2, 0))
}

// ═══════════════════════════════════════════════════════════════════════════
//  1. Ingest: nothing is charged
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_ingest_rejects_wrong_payer_signature() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let impostor = network.new_key();
    let node_before = network.balance(NODE);

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .signed_by(&[&impostor])
        .build();
    assert_eq!(network.submit(&txn), Err(ResponseCode::InvalidSignature));
    assert_eq!(network.balance(payer.id), 10 * HBAR);
    assert_eq!(network.balance(NODE), node_before);
    assert!(network.pipeline.record(&txn.body.transaction_id).is_none());
}

#[test_case(|txn: TxnBuilder| txn.fee(1_000), ResponseCode::InsufficientTxFee ; "fee limit")]
#[test_case(|txn: TxnBuilder| txn.valid_duration(600), ResponseCode::InvalidTransactionDuration ; "duration")]
#[test_case(|txn: TxnBuilder| txn.valid_start(Timestamp::from_secs(GENESIS_TIME - 115)), ResponseCode::TransactionExpired ; "about to expire")]
#[test_case(|txn: TxnBuilder| txn.node(AccountId::new(7)), ResponseCode::InvalidNodeAccount ; "unknown node")]
#[test_case(|txn: TxnBuilder| txn.memo("x".repeat(101)), ResponseCode::MemoTooLong ; "memo")]
fn test_ingest_rejections_charge_nothing(mutate: fn(TxnBuilder) -> TxnBuilder, expected: ResponseCode) {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let node_before = network.balance(NODE);

    let txn = mutate(network.crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])).build();
    assert_eq!(network.submit(&txn), Err(expected));
    assert_eq!(network.balance(payer.id), 10 * HBAR);
    assert_eq!(network.balance(NODE), node_before);
}

#[test]
fn test_ingest_rejects_payer_who_cannot_cover_the_fee() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(1_000);
    let receiver = network.create_account(0);

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    assert_eq!(network.submit(&txn), Err(ResponseCode::InsufficientPayerBalance));
    assert_eq!(network.balance(payer.id), 1_000);
}

#[test]
fn test_ingest_quote_matches_handle_charge() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    let quote = network.submit(&txn).expect("accepted at ingest");
    assert!((quote.total_usd() - simple_transfer_usd()).abs() < 1e-12);

    let record = network.handle(&txn);
    assert!(record.is_success());
    assert_eq!(record.transaction_fee, quote.total_tinybars());
}

// ═══════════════════════════════════════════════════════════════════════════
//  2. Pre-handle: the node pays
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_prehandle_signature_failure_charges_node_network_fee() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let impostor = network.new_key();
    let node_before = network.balance(NODE);
    let collector_before = network.balance(FEE_COLLECTOR);
    let total_before = network.total_hbar();

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .signed_by(&[&impostor])
        .build();
    let record = network.handle(&txn);

    assert_eq!(record.status, ResponseCode::InvalidPayerSignature);
    assert_eq!(record.charging, ChargingPolicy::NodeDueDiligence);
    assert_eq!(record.fee_payer(), NODE);
    validate_charged_usd_within(&record, network_fee_usd(1), TOLERANCE_PCT);
    validate_charged_fee_to_usd(node_before, network.balance(NODE), &network.rate(), network_fee_usd(1), TOLERANCE_PCT);
    assert_eq!(network.balance(FEE_COLLECTOR) - collector_before, record.transaction_fee);
    assert_eq!(network.balance(payer.id), 10 * HBAR);
    assert_eq!(network.total_hbar(), total_before);
}

#[test]
fn test_prehandle_expired_transaction_charges_node() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let node_before = network.balance(NODE);

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    network.submit(&txn).expect("accepted at ingest");
    network.pipeline.advance_time(DEFAULT_VALID_DURATION_SECS as i64 + 1);

    let record = network.handle(&txn);
    assert_eq!(record.status, ResponseCode::TransactionExpired);
    validate_charged_fee_to_usd(node_before, network.balance(NODE), &network.rate(), network_fee_usd(1), TOLERANCE_PCT);
    assert_eq!(network.balance(payer.id), 10 * HBAR);
}

#[test]
fn test_prehandle_pure_check_failure_charges_node() {
    let mut network = SimpleFeesTestNetwork::new();
    let treasury = network.create_account(10 * HBAR);
    let token = network.create_fungible_token(&treasury, 1_000, vec![]);
    let node_before = network.balance(NODE);

    let txn = network
        .mint_token(&treasury, token, 1, vec![vec![1]])
        .build();
    let record = network.handle(&txn);

    assert_eq!(record.status, ResponseCode::InvalidTransactionBody);
    assert_eq!(record.charging, ChargingPolicy::NodeDueDiligence);
    assert!(network.balance(NODE) < node_before);
    assert_eq!(network.balance(treasury.id), 10 * HBAR);
}

// ═══════════════════════════════════════════════════════════════════════════
//  3. Handle: the payer pays, effects roll back
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_handle_failure_charges_full_fee_and_rolls_back() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let total_before = network.total_hbar();

    let txn = network
        .crypto_transfer(&payer, moving_hbar(50 * HBAR, payer.id, receiver.id), vec![])
        .build();
    let record = network.execute(&txn);

    assert_eq!(record.status, ResponseCode::InsufficientAccountBalance);
    assert_eq!(record.charging, ChargingPolicy::Full);
    assert_eq!(record.effects, TransactionEffects::default());
    validate_charged_usd_within(&record, simple_transfer_usd(), TOLERANCE_PCT);
    validate_charged_fee_to_usd(10 * HBAR, network.balance(payer.id), &network.rate(), simple_transfer_usd(), TOLERANCE_PCT);
    assert_eq!(network.balance(receiver.id), 0);
    assert_eq!(network.total_hbar(), total_before);
}

#[test]
fn test_partial_token_changes_roll_back() {
    let mut network = SimpleFeesTestNetwork::new();
    let treasury = network.create_account(10 * HBAR);
    let good = network.create_account(0);
    let bad = network.create_account(0);
    let token = network.create_fungible_token(&treasury, 1_000, vec![]);
    network.associate(good.id, &[token]);

    // The second credit fails: the receiver is not associated.
    let txn = network
        .crypto_transfer(&treasury, vec![], vec![distributing(token, 10, treasury.id, &[good.id, bad.id])])
        .build();
    let record = network.execute(&txn);

    assert_eq!(record.status, ResponseCode::TokenNotAssociatedToAccount);
    assert_eq!(network.token_balance(good.id, token), 0);
    assert_eq!(network.token_balance(treasury.id, token), 1_000);
    validate_charged_usd_within(
        &record,
        expected_crypto_transfer_usd(&TransferExtras::new(1, 3, 1)),
        TOLERANCE_PCT,
    );
}

#[test]
fn test_fee_limit_between_network_and_total_charges_node_and_network() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let token = {
        let treasury = network.create_account(HBAR);
        network.create_fungible_token(&treasury, 1, vec![])
    };
    // Association costs $0.0509; allow only the $0.001 node and network part.
    let limit = network.rate().tinycents_to_tinybars(10_000_000 + 100_000);
    let txn = network
        .token_associate(&payer, payer.id, vec![token])
        .fee(limit)
        .build();
    let record = network.handle(&txn);

    assert_eq!(record.status, ResponseCode::InsufficientTxFee);
    assert_eq!(record.charging, ChargingPolicy::NodeAndNetworkOnly);
    validate_charged_usd_within(&record, node_and_network_fee_usd(1), TOLERANCE_PCT);
    assert!(network.pipeline.relation(payer.id, token).is_none());
}

#[test]
fn test_token_association_fee() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let treasury = network.create_account(HBAR);
    let tokens: Vec<_> = (0..3)
        .map(|_| network.create_fungible_token(&treasury, 1, vec![]))
        .collect();

    let txn = network.token_associate(&payer, payer.id, tokens.clone()).build();
    let record = network.execute_ok(&txn);

    validate_charged_usd_within(&record, expected_token_associate_usd(1, 3), TOLERANCE_PCT);
    assert!(tokens.iter().all(|token| network.pipeline.relation(payer.id, *token).is_some()));
}

#[test]
fn test_insolvent_payer_pays_what_it_has() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(500_000);
    let receiver = network.create_account(0);
    let node_before = network.balance(NODE);

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    let record = network.handle(&txn);

    assert_eq!(record.status, ResponseCode::InsufficientPayerBalance);
    assert_eq!(record.transaction_fee, 500_000);
    assert_eq!(network.balance(payer.id), 0);
    // The node share is paid first.
    assert_eq!(network.balance(NODE) - node_before, record.distribution.to_node);
    assert_eq!(record.distribution.to_node, 83_333);
}

// ═══════════════════════════════════════════════════════════════════════════
//  4. Duplicates
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_duplicate_through_same_node_charges_node() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    network.execute_ok(&txn);
    let payer_after_first = network.balance(payer.id);
    let node_after_first = network.balance(NODE);

    let record = network.handle(&txn);
    assert_eq!(record.status, ResponseCode::DuplicateTransaction);
    assert_eq!(record.charging, ChargingPolicy::NodeDueDiligence);
    assert_eq!(network.balance(payer.id), payer_after_first);
    validate_charged_fee_to_usd(node_after_first, network.balance(NODE), &network.rate(), network_fee_usd(1), TOLERANCE_PCT);
    assert_eq!(network.pipeline.records(&txn.body.transaction_id).len(), 2);
}

#[test]
fn test_duplicate_through_other_node_charges_payer_node_and_network() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let first = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    network.execute_ok(&first);
    let payer_after_first = network.balance(payer.id);

    let mut body = first.body.clone();
    body.node_account = SECOND_NODE;
    let second = Transaction::signed(body, &[&payer.key]).expect("signed");
    let record = network.handle(&second);

    assert_eq!(record.status, ResponseCode::DuplicateTransaction);
    assert_eq!(record.charging, ChargingPolicy::NodeAndNetworkOnly);
    validate_charged_fee_to_usd(
        payer_after_first,
        network.balance(payer.id),
        &network.rate(),
        node_and_network_fee_usd(1),
        TOLERANCE_PCT,
    );
    assert_eq!(network.balance(receiver.id), 1);
}

#[test]
fn test_ingest_rejects_known_duplicate() {
    let mut network = SimpleFeesTestNetwork::new();
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    network.execute_ok(&txn);
    let before = network.balance(payer.id);

    assert_eq!(network.submit(&txn), Err(ResponseCode::DuplicateTransaction));
    assert_eq!(network.balance(payer.id), before);
}

// ═══════════════════════════════════════════════════════════════════════════
//  5. Configuration
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_max_transaction_bytes_override() {
    let mut network = SimpleFeesTestNetwork::with_overrides(&[("transactions.maxTransactionBytes", "200")]);
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .memo("x".repeat(90))
        .build();
    assert_eq!(network.submit(&txn), Err(ResponseCode::TransactionOversize));
}

#[test]
fn test_custom_fee_collection_account() {
    let mut config = PipelineConfig::default();
    config.fees.fee_collection_account = SECOND_NODE;
    let mut network = SimpleFeesTestNetwork::with_config(config);
    let payer = network.create_account(10 * HBAR);
    let receiver = network.create_account(0);
    let second_before = network.balance(SECOND_NODE);

    let txn = network
        .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
        .build();
    let record = network.execute_ok(&txn);

    assert_eq!(network.balance(SECOND_NODE) - second_before, record.distribution.to_collector);
    assert_eq!(network.balance(FEE_COLLECTOR), 0);
}

#[test]
fn test_disabling_simple_fees_is_refused() {
    let mut config = PipelineConfig::default();
    assert_matches!(
        config.apply_override("fees.simpleFeesEnabled", "false"),
        Err(ConfigError::Invalid { .. })
    );
    assert!(config.fees.simple_fees_enabled);
}
