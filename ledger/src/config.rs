//! Limits enforced by the transaction handlers.

use serde::{Deserialize, Serialize};

/// `hooks` section of the node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HooksConfig {
    /// When disabled, any transfer carrying a hook call is rejected.
    pub hooks_enabled: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            hooks_enabled: true,
        }
    }
}

/// `ledger` section of the node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerLimits {
    /// Automatic account creations plus hook executions per transaction.
    pub max_child_records: usize,
    pub max_custom_fees_assessed: usize,
    /// Levels of custom fees that may themselves be charged custom fees.
    pub max_custom_fee_depth: usize,
    /// Token transfers (fungible adjustments plus NFT moves) per airdrop.
    pub max_airdrop_transfers: usize,
    pub max_pending_airdrop_ids: usize,
    pub max_nft_mint_batch: usize,
    pub max_nft_metadata_bytes: usize,
    pub max_memo_bytes: usize,
    pub max_topic_custom_fees: usize,
    pub min_auto_renew_period_secs: u64,
    pub max_auto_renew_period_secs: u64,
}

impl Default for LedgerLimits {
    fn default() -> Self {
        Self {
            max_child_records: 50,
            max_custom_fees_assessed: 20,
            max_custom_fee_depth: 2,
            max_airdrop_transfers: 10,
            max_pending_airdrop_ids: 10,
            max_nft_mint_batch: 10,
            max_nft_metadata_bytes: 100,
            max_memo_bytes: 100,
            max_topic_custom_fees: 10,
            min_auto_renew_period_secs: 6_999_999,
            max_auto_renew_period_secs: 8_000_001,
        }
    }
}

/// Everything a handler reads from configuration. Flattened into the node
/// configuration so the sections appear as `hooks:` and `ledger:`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub hooks: HooksConfig,
    #[serde(rename = "ledger")]
    pub limits: LedgerLimits,
}

impl LedgerConfig {
    pub fn with_hooks_enabled(mut self, enabled: bool) -> Self {
        self.hooks.hooks_enabled = enabled;
        self
    }

    pub fn with_max_child_records(mut self, max: usize) -> Self {
        self.limits.max_child_records = max;
        self
    }
}
