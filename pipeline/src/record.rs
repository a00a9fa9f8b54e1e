use {
    crate::charging::{ChargingPolicy, FeeDistribution},
    serde::{Deserialize, Serialize},
    simplefees_calculator::{ExtraCounts, FeeResult},
    simplefees_ledger::TransactionEffects,
    simplefees_schedule::ExchangeRate,
    simplefees_types::{AccountId, ResponseCode, Timestamp, TransactionId},
    std::collections::BTreeMap,
};

/// A priced transaction, before or without charging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    /// In tinycents.
    pub fees: FeeResult,
    /// The same components in tinybars at `exchange_rate`.
    pub tinybars: FeeResult,
    pub extras: ExtraCounts,
    pub exchange_rate: ExchangeRate,
}

impl FeeQuote {
    pub fn total_tinybars(&self) -> u64 {
        self.tinybars.total()
    }

    pub fn total_usd(&self) -> f64 {
        self.fees.total_usd()
    }
}

/// Outcome of one transaction reaching consensus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    /// Node the transaction was submitted through.
    pub node: AccountId,
    pub consensus_time: Timestamp,
    pub status: ResponseCode,
    pub charging: ChargingPolicy,
    /// Tinybars actually charged, to the payer or to the node.
    pub transaction_fee: u64,
    pub distribution: FeeDistribution,
    /// Computed fee in tinycents; only the portions `charging` selects
    /// were charged.
    pub fees: FeeResult,
    pub exchange_rate: ExchangeRate,
    /// Net HBAR adjustments, fee transfers included.
    pub transfer_list: BTreeMap<AccountId, i64>,
    /// Everything the handler did; empty unless `status` is `SUCCESS`.
    pub effects: TransactionEffects,
    pub memo: String,
}

impl TransactionRecord {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// What was charged, in USD at the record's rate.
    pub fn charged_usd(&self) -> f64 {
        self.exchange_rate.tinybars_to_usd(self.transaction_fee)
    }

    pub fn fee_payer(&self) -> AccountId {
        self.distribution.fee_payer
    }

    pub fn hbar_adjustment(&self, account: AccountId) -> i64 {
        self.transfer_list.get(&account).copied().unwrap_or(0)
    }
}
