//! What a handled transaction did, as reported in its record.

use {
    serde::{Deserialize, Serialize},
    simplefees_types::{AccountId, HookId, PendingAirdropId, TokenId, TopicId},
    std::collections::BTreeMap,
};

/// A custom fee charged while handling a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessedCustomFee {
    pub amount: u64,
    /// `None` for HBAR.
    pub token: Option<TokenId>,
    pub collector: AccountId,
    pub effective_payers: Vec<AccountId>,
}

/// Secondary effects reported alongside the parent record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildRecord {
    AccountCreation {
        account: AccountId,
        alias: Vec<u8>,
    },
    HookExecution {
        owner: AccountId,
        hook_id: HookId,
        gas_used: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransferRecord {
    pub token: TokenId,
    pub serial: u64,
    pub sender: AccountId,
    pub receiver: AccountId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAirdropRecord {
    pub id: PendingAirdropId,
    /// Amount added by this transaction; `None` for NFTs.
    pub amount: Option<u64>,
}

/// Effects of a successful handler run. Fee transfers are added by the
/// pipeline, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEffects {
    /// Net HBAR adjustments, including custom fees.
    pub hbar_transfers: BTreeMap<AccountId, i64>,
    /// Net fungible adjustments per token, including custom fees.
    pub token_transfers: BTreeMap<TokenId, BTreeMap<AccountId, i64>>,
    pub nft_transfers: Vec<NftTransferRecord>,
    pub assessed_custom_fees: Vec<AssessedCustomFee>,
    pub automatic_associations: Vec<(AccountId, TokenId)>,
    pub new_pending_airdrops: Vec<PendingAirdropRecord>,
    pub child_records: Vec<ChildRecord>,
    pub created_topic: Option<TopicId>,
    pub serial_numbers: Vec<u64>,
    pub new_total_supply: Option<u64>,
}

impl TransactionEffects {
    pub fn hbar_adjustment(&self, account: AccountId) -> i64 {
        self.hbar_transfers.get(&account).copied().unwrap_or(0)
    }

    pub fn token_adjustment(&self, token: TokenId, account: AccountId) -> i64 {
        self.token_transfers
            .get(&token)
            .and_then(|adjustments| adjustments.get(&account))
            .copied()
            .unwrap_or(0)
    }

    pub fn created_accounts(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.child_records.iter().filter_map(|child| match child {
            ChildRecord::AccountCreation { account, .. } => Some(*account),
            ChildRecord::HookExecution { .. } => None,
        })
    }

    pub fn hook_executions(&self) -> usize {
        self.child_records
            .iter()
            .filter(|child| matches!(child, ChildRecord::HookExecution { .. }))
            .count()
    }
}
