use {
    crate::{
        error::{Result, ScheduleError},
        extra::{Extra, FeeEntry},
        json::RawFeeSchedule,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, path::Path},
};

/// Node portion of every transaction fee.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct NodeFee {
    /// Base fee in tinycents.
    pub base_fee: u64,
    /// Free allotment per node extra (`SIGNATURES`, `PROCESSING_BYTES`).
    pub included: BTreeMap<Extra, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct NetworkFee {
    /// The network fee is the node fee times this multiplier.
    pub multiplier: u64,
}

/// Base fee and free allotments of one [`FeeEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct ServiceFee {
    pub base_fee: u64,
    pub included: BTreeMap<Extra, u64>,
}

impl ServiceFee {
    pub fn new(base_fee: u64) -> Self {
        Self {
            base_fee,
            included: BTreeMap::new(),
        }
    }

    pub fn include(mut self, extra: Extra, count: u64) -> Self {
        self.included.insert(extra, count);
        self
    }

    pub fn included(&self, extra: Extra) -> u64 {
        self.included.get(&extra).copied().unwrap_or(0)
    }
}

/// Simple fee schedule. All amounts are tinycents (10^-8 US cents).
///
/// ```text
/// node    = node.base    + Σ price(e) · max(0, count(e) − node.included(e))
/// network = node · network.multiplier
/// service = entry.base   + Σ price(e) · max(0, count(e) − entry.included(e))
/// total   = node + network + service
/// ```
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
#[serde(try_from = "RawFeeSchedule", into = "RawFeeSchedule")]
pub struct FeeSchedule {
    pub node: NodeFee,
    pub network: NetworkFee,
    /// Price per unit of each extra. Unlisted extras are free.
    pub extras: BTreeMap<Extra, u64>,
    pub services: BTreeMap<FeeEntry, ServiceFee>,
}

impl FeeSchedule {
    pub fn price(&self, extra: Extra) -> u64 {
        self.extras.get(&extra).copied().unwrap_or(0)
    }

    pub fn service(&self, entry: FeeEntry) -> Option<&ServiceFee> {
        self.services.get(&entry)
    }

    pub fn node_included(&self, extra: Extra) -> u64 {
        self.node.included.get(&extra).copied().unwrap_or(0)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let schedule: Self = serde_json::from_str(json)?;
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ScheduleError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the schedule is usable by the calculator.
    pub fn validate(&self) -> Result<()> {
        if self.network.multiplier == 0 {
            return Err(ScheduleError::Invalid {
                reason: "network multiplier must be > 0".into(),
            });
        }
        if let Some(extra) = self.node.included.keys().find(|e| !e.is_node_extra()) {
            return Err(ScheduleError::Invalid {
                reason: format!("{extra} cannot be included at the node level"),
            });
        }
        Ok(())
    }

    /// The built-in schedule.
    pub fn canonical() -> Self {
        use Extra::*;

        let extras = BTreeMap::from([
            (Signatures, 1_000_000),              // $0.0001 per signature
            (ProcessingBytes, 10_000),            // $0.000001 per byte
            (Keys, 100_000_000),                  // $0.01 per key
            (Accounts, 1_000_000),                // $0.0001 per account
            (TokenTypes, 10_000_000),             // $0.001 per token type
            (NftSerials, 200_000_000),            // $0.02 per serial
            (HookExecutions, 50_000_000),         // $0.005 per hook execution
            (Gas, 852),                           // per unit of gas
            (Airdrops, 500_000_000),              // $0.05 per pending airdrop
            (CreatedAutoAssociations, 500_000_000), // $0.05 per auto-association
            (CreatedAccounts, 500_000_000),       // $0.05 per auto-created account
        ]);

        let services = BTreeMap::from([
            (FeeEntry::CryptoTransfer, ServiceFee::new(0).include(Accounts, 2)),
            (
                FeeEntry::TokenTransfer,
                ServiceFee::new(9_000_000)
                    .include(Accounts, 2)
                    .include(TokenTypes, 1),
            ),
            (
                FeeEntry::TokenTransferWithCustomFees,
                ServiceFee::new(19_000_000)
                    .include(Accounts, 2)
                    .include(TokenTypes, 1),
            ),
            (FeeEntry::TokenAirdrop, ServiceFee::new(0)),
            (FeeEntry::TokenMint, ServiceFee::new(9_000_000)),
            (
                FeeEntry::TokenMintNft,
                ServiceFee::new(190_000_000).include(NftSerials, 1),
            ),
            (
                FeeEntry::ConsensusCreateTopic,
                ServiceFee::new(99_000_000).include(Keys, 1),
            ),
            (
                FeeEntry::ConsensusCreateTopicWithCustomFees,
                ServiceFee::new(1_990_000_000),
            ),
            (
                FeeEntry::TokenAssociateToAccount,
                ServiceFee::new(499_000_000).include(TokenTypes, 1),
            ),
            (FeeEntry::TokenClaimAirdrop, ServiceFee::new(9_000_000)),
            (FeeEntry::TokenCancelAirdrop, ServiceFee::new(9_000_000)),
        ]);

        Self {
            node: NodeFee {
                base_fee: 1_000_000, // $0.0001
                included: BTreeMap::from([(Signatures, 1), (ProcessingBytes, 1024)]),
            },
            network: NetworkFee { multiplier: 9 },
            extras,
            services,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::canonical()
    }
}
