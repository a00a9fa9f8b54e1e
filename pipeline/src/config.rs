//! Node configuration read by the pipeline.
//!
//! ```yaml
//! fees:
//!   simpleFeesEnabled: true
//!   feeCollectionAccount: "0.0.98"
//! hooks:
//!   hooksEnabled: true
//! ledger:
//!   maxChildRecords: 50
//! transactions:
//!   maxValidDurationSecs: 180
//! ```
//!
//! Every field has a default, so a file only needs the keys it changes.
//! Single keys can also be set by their dotted name with
//! [`PipelineConfig::apply_override`].

use {
    crate::error::ConfigError,
    log::*,
    serde::{Deserialize, Serialize},
    simplefees_ledger::LedgerConfig,
    simplefees_types::AccountId,
    std::path::{Path, PathBuf},
};

/// Account that receives network and service fees.
pub const DEFAULT_FEE_COLLECTION_ACCOUNT: AccountId = AccountId::new(98);

/// `fees` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeesConfig {
    pub simple_fees_enabled: bool,
    #[serde(with = "account_id_string")]
    pub fee_collection_account: AccountId,
    /// JSON schedule to load instead of the built-in one.
    pub schedule_path: Option<PathBuf>,
}

impl Default for FeesConfig {
    fn default() -> Self {
        Self {
            simple_fees_enabled: true,
            fee_collection_account: DEFAULT_FEE_COLLECTION_ACCOUNT,
            schedule_path: None,
        }
    }
}

/// `transactions` section: due-diligence limits on the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionsConfig {
    pub min_valid_duration_secs: u64,
    pub max_valid_duration_secs: u64,
    /// Largest signed transaction accepted, in bytes.
    pub max_transaction_bytes: u64,
    /// How far the valid start may lie ahead of the node clock.
    pub max_future_start_secs: u64,
    /// Ingest rejects transactions that expire within this many seconds.
    pub min_validity_buffer_secs: u64,
    /// How long handled ids are remembered for duplicate detection.
    pub dedup_window_secs: u64,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            min_valid_duration_secs: 15,
            max_valid_duration_secs: 180,
            max_transaction_bytes: 6_144,
            max_future_start_secs: 0,
            min_validity_buffer_secs: 10,
            dedup_window_secs: 180,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fees: FeesConfig,
    /// `hooks` and `ledger` sections.
    #[serde(flatten)]
    pub ledger: LedgerConfig,
    pub transactions: TransactionsConfig,
}

impl PipelineConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_string(),
            })
        };
        if !self.fees.simple_fees_enabled {
            return invalid("fees.simpleFeesEnabled=false selects the legacy fee path, which this node does not implement");
        }
        let tx = &self.transactions;
        if tx.min_valid_duration_secs == 0 || tx.min_valid_duration_secs > tx.max_valid_duration_secs {
            return invalid("transactions.minValidDurationSecs must be in 1..=maxValidDurationSecs");
        }
        if tx.max_transaction_bytes == 0 {
            return invalid("transactions.maxTransactionBytes must be positive");
        }
        if tx.dedup_window_secs < tx.max_valid_duration_secs {
            return invalid("transactions.dedupWindowSecs must cover maxValidDurationSecs");
        }
        let limits = &self.ledger.limits;
        if limits.max_custom_fee_depth == 0 {
            return invalid("ledger.maxCustomFeeDepth must be positive");
        }
        if limits.min_auto_renew_period_secs > limits.max_auto_renew_period_secs {
            return invalid("ledger.minAutoRenewPeriodSecs exceeds ledger.maxAutoRenewPeriodSecs");
        }
        Ok(())
    }

    /// Sets one key by its dotted name, e.g.
    /// `apply_override("hooks.hooksEnabled", "false")`.
    ///
    /// `value` is read as JSON when it parses as JSON and as a plain string
    /// otherwise. The configuration is left unchanged when the result does
    /// not validate.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut doc = serde_json::to_value(&*self)?;
        let mut node = &mut doc;
        for part in key.split('.') {
            node = match node.get_mut(part) {
                Some(child) => child,
                None => {
                    return Err(ConfigError::UnknownKey {
                        key: key.to_string(),
                    })
                }
            };
        }
        *node = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

        let updated: Self = serde_json::from_value(doc)?;
        if let Err(err) = updated.validate() {
            warn!("rejected config override {key}={value}: {err}");
            return Err(err);
        }
        info!("config override {key}={value}");
        *self = updated;
        Ok(())
    }
}

/// Entity ids are written as `shard.realm.num` strings.
mod account_id_string {
    use {
        serde::{de::Error, Deserialize, Deserializer, Serializer},
        simplefees_types::AccountId,
    };

    pub fn serialize<S: Serializer>(id: &AccountId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AccountId, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
