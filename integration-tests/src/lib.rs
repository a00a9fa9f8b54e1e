//! Simple Fees Integration Tests
//!
//! End-to-end charging suites that run transactions through the whole
//! pipeline and compare what the payer (or node) was charged, in USD, with
//! the published schedule prices.
//!
//! # Suites
//!
//! 1. **Crypto Transfer**: HBAR and token tiers, signature, account,
//!    auto-association and account-creation extras
//! 2. **Token Airdrop**: immediate vs pending credits, claim and cancel
//! 3. **Token Mint**: fungible mints, NFT serials, byte overage
//! 4. **Topic Create**: key extras and the custom-fee tier
//! 5. **Custom Fees**: fixed, fractional and royalty fees and the tier
//!    they select
//! 6. **Failure Stages**: who pays when ingest, pre-handle or handle fails
//! 7. **Hooks**: hook execution and gas extras, hooks disabled

pub mod harness;






#[cfg(test)]
mod failure_stage_tests;
