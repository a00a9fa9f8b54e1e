use {
    serde::{Deserialize, Serialize},
    simplefees_types::{AccountId, Key, Timestamp, TopicCustomFee},
};

/// A consensus topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub memo: String,
    pub admin_key: Option<Key>,
    pub submit_key: Option<Key>,
    pub auto_renew_account: Option<AccountId>,
    pub auto_renew_period_secs: u64,
    pub expiration: Timestamp,
    pub custom_fees: Vec<TopicCustomFee>,
    pub fee_exempt_keys: Vec<Key>,
    pub sequence_number: u64,
}
