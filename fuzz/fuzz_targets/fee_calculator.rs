//! Fuzz the simple fee calculator with random schedules and extra counts.
//!
//! Goals:
//! - Find panics or overflows in node, network and service pricing.
//! - Verify that network == node · multiplier whenever it does not saturate.
//! - Verify that adding units of an extra never lowers the fee.
//! - Verify that tinybar conversion never exceeds the exact converted total.

#![no_main]

use {
    arbitrary::{Arbitrary, Unstructured},
    libfuzzer_sys::fuzz_target,
    simplefees_calculator::{ExtraCounts, SimpleFeeCalculator},
    simplefees_schedule::{ExchangeRate, Extra, FeeEntry, FeeSchedule},
    simplefees_types::Timestamp,
    strum::IntoEnumIterator,
};

#[derive(Debug)]
struct FuzzInput {
    // Schedule overrides
    node_base_fee: u64,
    multiplier: u64,
    price_overrides: Vec<(u8, u64)>,

    // Counts
    counts: Vec<(u8, u64)>,
    entries: Vec<u8>,
    bump_extra: u8,
    bump: u64,

    // Rate
    hbar_equiv: u32,
    cent_equiv: u32,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(FuzzInput {
            node_base_fee: u.arbitrary()?,
            multiplier: u.int_in_range(1..=1_000)?,
            price_overrides: u.arbitrary()?,
            counts: u.arbitrary()?,
            entries: u.arbitrary()?,
            bump_extra: u.arbitrary()?,
            bump: u.int_in_range(1..=1_000_000)?,
            hbar_equiv: u.arbitrary()?,
            cent_equiv: u.arbitrary()?,
        })
    }
}

fn nth_extra(index: u8) -> Extra {
    let extras: Vec<Extra> = Extra::iter().collect();
    extras[usize::from(index) % extras.len()]
}

fn nth_entry(index: u8) -> FeeEntry {
    let entries: Vec<FeeEntry> = FeeEntry::iter().collect();
    entries[usize::from(index) % entries.len()]
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let input: FuzzInput = match u.arbitrary() {
        Ok(i) => i,
        Err(_) => return,
    };

    let mut schedule = FeeSchedule::canonical();
    schedule.node.base_fee = input.node_base_fee;
    schedule.network.multiplier = input.multiplier;
    for (extra, price) in &input.price_overrides {
        schedule.extras.insert(nth_extra(*extra), *price);
    }
    assert!(schedule.validate().is_ok());
    let calculator = SimpleFeeCalculator::new(schedule);

    let counts: ExtraCounts = input
        .counts
        .iter()
        .map(|(extra, count)| (nth_extra(*extra), *count))
        .collect();
    let entries: Vec<FeeEntry> = input.entries.iter().map(|e| nth_entry(*e)).collect();

    // ── Test 1: pricing must not panic ──

    let fees = match calculator.calculate_for_entries(&entries, &counts) {
        Ok(fees) => fees,
        Err(_) => return,
    };

    // ── Invariant: network is the node fee times the multiplier ──
    if let Some(network) = fees.node.checked_mul(input.multiplier) {
        assert_eq!(fees.network, network);
    } else {
        assert_eq!(fees.network, u64::MAX);
    }
    assert!(fees.total() >= fees.node_and_network());

    // ── Test 2: monotonicity in every extra ──

    let mut bumped = counts.clone();
    bumped.add(nth_extra(input.bump_extra), input.bump);
    if let Ok(higher) = calculator.calculate_for_entries(&entries, &bumped) {
        assert!(
            higher.total() >= fees.total(),
            "{:?} +{} lowered the fee: {} -> {}",
            nth_extra(input.bump_extra),
            input.bump,
            fees.total(),
            higher.total()
        );
    }

    // ── Test 3: conversion ──

    let rate = ExchangeRate::new(input.hbar_equiv, input.cent_equiv, Timestamp::from_secs(i64::MAX));
    let tinybars = fees.to_tinybars(&rate);
    let unsaturated = fees
        .node
        .checked_add(fees.network)
        .and_then(|sum| sum.checked_add(fees.service))
        .is_some();
    if unsaturated && input.cent_equiv > 0 && input.hbar_equiv > 0 {
        let exact = rate.tinycents_to_tinybars(fees.total());
        assert!(tinybars.total() <= exact || exact == u64::MAX);
    }
    let _ = rate.tinybars_to_usd(tinybars.total());
});
