//! Simple Fees Property-Based Invariant Tests
//!
//! Uses proptest to verify properties that must hold for any input:
//! - Fee formula: node, network and service portions
//! - Charging: who pays at each failure stage, and HBAR conservation

pub mod charging_invariants;
pub mod fee_invariants;
