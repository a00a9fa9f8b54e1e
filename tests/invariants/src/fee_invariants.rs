//! Property-based tests for the fee formula.
//!
//! Properties tested:
//! 1. Node fee equals base plus billable signatures and bytes
//! 2. Network fee is always the node fee times the multiplier
//! 3. Fees never decrease as any extra count grows
//! 4. Service fees only charge counts beyond the included allotment
//! 5. Tinybar conversion keeps the parts summing to the converted total

#![allow(clippy::arithmetic_side_effects)]

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        simplefees_calculator::{ExtraCounts, SimpleFeeCalculator},
        simplefees_schedule::{ExchangeRate, Extra, FeeEntry, FeeSchedule},
        simplefees_types::Timestamp,
    };

    fn calculator() -> SimpleFeeCalculator {
        SimpleFeeCalculator::new(FeeSchedule::canonical())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1. Node fee formula
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn node_fee_matches_formula(signatures in 0..=64u64, bytes in 0..=8_192u64) {
            let calculator = calculator();
            let schedule = calculator.schedule();

            let expected = schedule.node.base_fee
                + schedule.price(Extra::Signatures)
                    * signatures.saturating_sub(schedule.node_included(Extra::Signatures))
                + schedule.price(Extra::ProcessingBytes)
                    * bytes.saturating_sub(schedule.node_included(Extra::ProcessingBytes));

            prop_assert_eq!(calculator.node_fee(signatures, bytes), expected);
        }
    }

    #[test]
    fn node_fee_at_included_counts_is_base() {
        let calculator = calculator();
        let schedule = calculator.schedule();
        assert_eq!(
            calculator.node_fee(
                schedule.node_included(Extra::Signatures),
                schedule.node_included(Extra::ProcessingBytes)
            ),
            schedule.node.base_fee
        );
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 2. Network multiplier
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn network_is_node_times_multiplier(signatures in 0..=64u64, bytes in 0..=8_192u64) {
            let calculator = calculator();
            let fees = calculator.node_and_network(signatures, bytes);

            prop_assert_eq!(fees.network, fees.node * calculator.schedule().network.multiplier);
            prop_assert_eq!(fees.service, 0);
            prop_assert_eq!(fees.total(), fees.node_and_network());
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Monotonicity
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn fee_monotonic_in_every_extra(
            signatures in 1..=16u64,
            accounts in 0..=32u64,
            token_types in 0..=8u64,
            hooks in 0..=4u64,
            gas in 0..=1_000_000u64,
            extra_index in 0..5usize,
            bump in 1..=10u64,
        ) {
            let calculator = calculator();
            let entries = [FeeEntry::CryptoTransfer, FeeEntry::TokenTransfer];
            let mut counts = [
                (Extra::Signatures, signatures),
                (Extra::Accounts, accounts),
                (Extra::TokenTypes, token_types),
                (Extra::HookExecutions, hooks),
                (Extra::Gas, gas),
            ];
            let before: ExtraCounts = counts.iter().copied().collect();
            counts[extra_index].1 += bump;
            let after: ExtraCounts = counts.iter().copied().collect();

            let low = calculator.calculate_for_entries(&entries, &before).unwrap();
            let high = calculator.calculate_for_entries(&entries, &after).unwrap();
            prop_assert!(
                high.total() >= low.total(),
                "{:?} +{} lowered the fee: {} -> {}",
                counts[extra_index].0, bump, low.total(), high.total()
            );
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 4. Included allotments
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn transfer_service_fee_charges_accounts_past_included(accounts in 0..=64u64) {
            let calculator = calculator();
            let schedule = calculator.schedule();
            let entry = schedule.service(FeeEntry::CryptoTransfer).unwrap();
            let extras = ExtraCounts::new().with(Extra::Accounts, accounts);

            let fees = calculator
                .calculate_for_entries(&[FeeEntry::CryptoTransfer], &extras)
                .unwrap();

            let billable = accounts.saturating_sub(entry.included(Extra::Accounts));
            prop_assert_eq!(fees.service, entry.base_fee + schedule.price(Extra::Accounts) * billable);
        }

        #[test]
        fn nft_mint_service_fee_charges_serials_past_included(serials in 0..=10u64) {
            let calculator = calculator();
            let schedule = calculator.schedule();
            let nft = schedule.service(FeeEntry::TokenMintNft).unwrap();
            let extras = ExtraCounts::new().with(Extra::NftSerials, serials);

            let fees = calculator
                .calculate_for_entries(&[FeeEntry::TokenMintNft], &extras)
                .unwrap();

            let billable = serials.saturating_sub(nft.included(Extra::NftSerials));
            prop_assert_eq!(fees.service, nft.base_fee + schedule.price(Extra::NftSerials) * billable);
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 5. Exchange rate conversion
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn tinybar_parts_never_exceed_exact_total(
            signatures in 0..=16u64,
            service in 0..=10_000_000_000u64,
            hbar_equiv in 1..=100u32,
            cent_equiv in 1..=10_000u32,
        ) {
            let rate = ExchangeRate::new(hbar_equiv, cent_equiv, Timestamp::from_secs(i64::MAX));
            let mut fees = calculator().node_and_network(signatures, 0);
            fees.service = service;

            let tinybars = fees.to_tinybars(&rate);
            let exact = rate.tinycents_to_tinybars(fees.total());

            prop_assert_eq!(tinybars.total(), tinybars.node + tinybars.network + tinybars.service);
            // Each part rounds down, losing at most one tinybar.
            prop_assert!(tinybars.total() <= exact);
            prop_assert!(exact - tinybars.total() <= 2);
        }

        #[test]
        fn conversion_is_monotonic(
            low in 0..=1_000_000_000_000u64,
            delta in 0..=1_000_000_000u64,
            cent_equiv in 1..=10_000u32,
        ) {
            let rate = ExchangeRate::new(1, cent_equiv, Timestamp::from_secs(i64::MAX));
            prop_assert!(rate.tinycents_to_tinybars(low + delta) >= rate.tinycents_to_tinybars(low));
        }
    }
}
