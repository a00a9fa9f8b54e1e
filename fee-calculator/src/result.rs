use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    simplefees_schedule::{tinycents_to_usd, ExchangeRate},
};

/// Fee components in tinycents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct FeeResult {
    pub node: u64,
    pub network: u64,
    pub service: u64,
}

impl FeeResult {
    /// `node + network + service`, saturating.
    pub fn total(&self) -> u64 {
        self.node
            .saturating_add(self.network)
            .saturating_add(self.service)
    }

    /// What a payer owes when the service portion is waived.
    pub fn node_and_network(&self) -> u64 {
        self.node.saturating_add(self.network)
    }

    pub fn total_usd(&self) -> f64 {
        tinycents_to_usd(self.total())
    }

    /// Converts each component separately so the parts always sum to the
    /// charged total.
    pub fn to_tinybars(&self, rate: &ExchangeRate) -> FeeResult {
        FeeResult {
            node: rate.tinycents_to_tinybars(self.node),
            network: rate.tinycents_to_tinybars(self.network),
            service: rate.tinycents_to_tinybars(self.service),
        }
    }
}
