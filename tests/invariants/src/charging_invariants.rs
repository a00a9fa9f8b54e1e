//! Property-based tests for charging across pipeline stages.
//!
//! Properties tested:
//! 1. HBAR is conserved by every transaction, whatever its outcome
//! 2. Ingest rejections never charge anyone
//! 3. Pre-handle failures charge the node the network fee only
//! 4. Handle failures charge the full fee and roll back everything else
//! 5. Insolvent payers pay their whole balance, node share first

#![allow(clippy::arithmetic_side_effects)]

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        simplefees_integration_tests::harness::*,
        simplefees_pipeline::ChargingPolicy,
        simplefees_types::{AccountAmount, ResponseCode},
    };

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1. Conservation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn hbar_is_conserved(
            payer_balance in 0..=2 * HBAR,
            amount in 1..=3 * HBAR,
            fee_limit in 0..=HBAR / 100,
            extra_signers in 0..=3usize,
        ) {
            let mut network = SimpleFeesTestNetwork::new();
            let payer = network.create_account(payer_balance);
            let receiver = network.create_account(0);
            let signers: Vec<_> = (0..extra_signers).map(|_| network.new_key()).collect();
            let before = network.total_hbar();

            let mut keys = vec![&payer.key];
            keys.extend(signers.iter());
            let txn = network
                .crypto_transfer(&payer, moving_hbar(amount, payer.id, receiver.id), vec![])
                .fee(fee_limit)
                .signed_by(&keys)
                .build();
            // Bypass ingest so underfunded and underpriced transactions
            // still reach charging.
            let record = network.handle(&txn);

            prop_assert_eq!(network.total_hbar(), before, "{:?}", record.status);
            prop_assert_eq!(record.transfer_list.values().sum::<i64>(), 0);
            prop_assert_eq!(record.transaction_fee, record.distribution.total());
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 2. Ingest
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn ingest_rejection_charges_nobody(shortfall in 1..=800_000u64, accounts in 0..=4usize) {
            let mut network = SimpleFeesTestNetwork::new();
            let payer = network.create_account(10 * HBAR);
            let mut transfers = vec![AccountAmount::new(payer.id, -(accounts as i64 + 1))];
            for _ in 0..=accounts {
                let receiver = network.create_account(0);
                transfers.push(AccountAmount::new(receiver.id, 1));
            }
            let probe = network.crypto_transfer(&payer, transfers.clone(), vec![]).build();
            let quote = network.pipeline.estimate_fee(&probe).unwrap();
            let limit = quote.total_tinybars().saturating_sub(shortfall);

            let txn = network
                .crypto_transfer(&payer, transfers, vec![])
                .fee(limit)
                .build();
            let before = network.total_hbar();
            let node_before = network.balance(NODE);

            prop_assert_eq!(network.submit(&txn), Err(ResponseCode::InsufficientTxFee));
            prop_assert_eq!(network.balance(payer.id), 10 * HBAR);
            prop_assert_eq!(network.balance(NODE), node_before);
            prop_assert_eq!(network.total_hbar(), before);
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Pre-handle
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prehandle_failure_charges_node_network_fee(signers in 1..=4usize, amount in 1..=HBAR) {
            let mut network = SimpleFeesTestNetwork::new();
            let payer = network.create_account(10 * HBAR);
            let receiver = network.create_account(0);
            let strangers: Vec<_> = (0..signers).map(|_| network.new_key()).collect();
            let node_before = network.balance(NODE);
            let collector_before = network.balance(FEE_COLLECTOR);

            let keys: Vec<_> = strangers.iter().collect();
            let txn = network
                .crypto_transfer(&payer, moving_hbar(amount, payer.id, receiver.id), vec![])
                .signed_by(&keys)
                .build();
            let record = network.handle(&txn);

            prop_assert_eq!(record.status, ResponseCode::InvalidPayerSignature);
            prop_assert_eq!(record.charging, ChargingPolicy::NodeDueDiligence);
            prop_assert_eq!(record.fee_payer(), NODE);
            prop_assert_eq!(record.distribution.to_node, 0);
            prop_assert_eq!(record.fees.service, 0);
            prop_assert_eq!(network.balance(payer.id), 10 * HBAR);
            prop_assert_eq!(network.balance(NODE), node_before - record.transaction_fee);
            prop_assert_eq!(network.balance(FEE_COLLECTOR), collector_before + record.transaction_fee);
            prop_assert_eq!(
                record.transaction_fee,
                record.exchange_rate.tinycents_to_tinybars(record.fees.network)
            );
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 4. Handle
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn handle_failure_charges_full_fee_and_rolls_back(
            sender_balance in 0..=HBAR,
            excess in 1..=HBAR,
        ) {
            let mut network = SimpleFeesTestNetwork::new();
            let payer = network.create_account(10 * HBAR);
            let sender = network.create_account(sender_balance);
            let receiver = network.create_account(0);

            let txn = network
                .crypto_transfer(
                    &payer,
                    moving_hbar(sender_balance + excess, sender.id, receiver.id),
                    vec![],
                )
                .signed_by(&[&payer.key, &sender.key])
                .build();
            let quote = network.pipeline.estimate_fee(&txn).unwrap();
            let record = network.execute(&txn);

            prop_assert_eq!(record.status, ResponseCode::InsufficientAccountBalance);
            prop_assert_eq!(record.charging, ChargingPolicy::Full);
            prop_assert_eq!(record.transaction_fee, quote.total_tinybars());
            prop_assert_eq!(network.balance(payer.id), 10 * HBAR - quote.total_tinybars());
            prop_assert_eq!(network.balance(sender.id), sender_balance);
            prop_assert_eq!(network.balance(receiver.id), 0);
            prop_assert!(record.effects.hbar_transfers.is_empty());
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 5. Insolvent payers
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn insolvent_payer_pays_balance_node_first(balance in 0..833_333u64) {
            let mut network = SimpleFeesTestNetwork::new();
            let payer = network.create_account(balance);
            let receiver = network.create_account(0);
            let txn = network
                .crypto_transfer(&payer, moving_hbar(1, payer.id, receiver.id), vec![])
                .build();
            let quote = network.pipeline.estimate_fee(&txn).unwrap();
            prop_assume!(balance < quote.total_tinybars());

            let record = network.handle(&txn);

            prop_assert_eq!(record.status, ResponseCode::InsufficientPayerBalance);
            prop_assert_eq!(record.transaction_fee, balance);
            prop_assert_eq!(network.balance(payer.id), 0);
            prop_assert_eq!(record.distribution.to_node, balance.min(quote.tinybars.node));
            prop_assert_eq!(network.balance(receiver.id), 0);
        }
    }
}
