//! Who pays a transaction's fee, and who receives it, depending on the
//! stage it failed at.
//!
//! | policy                 | pays                | node receives | collector receives   |
//! |------------------------|---------------------|---------------|----------------------|
//! | `NoCharge`             | nobody              | -             | -                    |
//! | `NodeDueDiligence`     | submitting node     | -             | network              |
//! | `NodeAndNetworkOnly`   | payer               | node          | network              |
//! | `Full`                 | payer               | node          | network + service    |
//!
//! A fee payer that cannot cover its share pays its entire balance, node
//! share first. A share owed to the fee payer itself is not charged.

use {
    log::*,
    serde::{Deserialize, Serialize},
    simplefees_calculator::FeeResult,
    simplefees_ledger::LedgerState,
    simplefees_types::{AccountId, ResponseCode},
    std::collections::BTreeMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingPolicy {
    /// Rejected at ingest.
    NoCharge,
    /// The node submitted a transaction it should have rejected.
    NodeDueDiligence,
    /// Duplicates from another node, and fee limits that only cover the
    /// node and network portions.
    NodeAndNetworkOnly,
    Full,
}

/// One fee charge in tinybars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeDistribution {
    pub fee_payer: AccountId,
    pub to_node: u64,
    pub to_collector: u64,
}

impl FeeDistribution {
    pub fn total(&self) -> u64 {
        self.to_node.saturating_add(self.to_collector)
    }
}

/// Charges fees on behalf of one submitting node.
#[derive(Debug, Clone, Copy)]
pub struct FeeCharger {
    pub node: AccountId,
    pub collector: AccountId,
}

impl FeeCharger {
    pub fn new(node: AccountId, collector: AccountId) -> Self {
        Self { node, collector }
    }

    /// Splits `fees` (already in tinybars) according to `policy`, capped by
    /// what the fee payer holds.
    pub fn distribution(
        &self,
        policy: ChargingPolicy,
        payer: AccountId,
        fees: &FeeResult,
        state: &LedgerState,
    ) -> FeeDistribution {
        let (fee_payer, to_node, to_collector) = match policy {
            ChargingPolicy::NoCharge => (payer, 0, 0),
            ChargingPolicy::NodeDueDiligence => (self.node, 0, fees.network),
            ChargingPolicy::NodeAndNetworkOnly => (payer, fees.node, fees.network),
            ChargingPolicy::Full => (
                payer,
                fees.node,
                fees.network.saturating_add(fees.service),
            ),
        };
        let to_node = if fee_payer == self.node { 0 } else { to_node };
        let to_collector = if fee_payer == self.collector { 0 } else { to_collector };
        let available = state.balance(fee_payer);
        let to_node = to_node.min(available);
        let to_collector = to_collector.min(available.saturating_sub(to_node));
        FeeDistribution {
            fee_payer,
            to_node,
            to_collector,
        }
    }

    /// Moves the whole fee in one adjustment and returns the net HBAR
    /// changes it made. Nothing moves on error.
    pub fn charge(
        &self,
        state: &mut LedgerState,
        distribution: &FeeDistribution,
    ) -> Result<BTreeMap<AccountId, i64>, ResponseCode> {
        let mut adjustments = BTreeMap::new();
        for (receiver, amount) in [
            (self.node, distribution.to_node),
            (self.collector, distribution.to_collector),
        ] {
            if amount == 0 {
                continue;
            }
            if receiver == distribution.fee_payer {
                return Err(ResponseCode::FailInvalid);
            }
            let signed = i64::try_from(amount).map_err(|_| ResponseCode::FailInvalid)?;
            let debit = adjustments.entry(distribution.fee_payer).or_insert(0i64);
            *debit = debit.saturating_sub(signed);
            let credit = adjustments.entry(receiver).or_insert(0i64);
            *credit = credit.saturating_add(signed);
        }
        state.apply_hbar_adjustments(&adjustments)?;
        debug!(
            "charged {} tinybars to {}: node {} <- {}, collector {} <- {}",
            distribution.total(),
            distribution.fee_payer,
            self.node,
            distribution.to_node,
            self.collector,
            distribution.to_collector
        );
        Ok(adjustments)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        simplefees_ledger::AccountSpec,
        simplefees_types::Key,
        test_case::test_case,
    };

    const NODE: AccountId = AccountId::new(3);
    const COLLECTOR: AccountId = AccountId::new(98);

    fn state(payer_balance: u64) -> (LedgerState, AccountId) {
        let mut state = LedgerState::new();
        for (id, seed) in [(NODE, 3u8), (COLLECTOR, 98u8)] {
            state
                .create_account_with_id(
                    id,
                    AccountSpec::new(Key::Ed25519([seed; 32])).with_balance(1_000),
                )
                .unwrap();
        }
        let payer = state
            .create_account(AccountSpec::new(Key::Ed25519([1; 32])).with_balance(payer_balance))
            .unwrap();
        (state, payer)
    }

    const FEES: FeeResult = FeeResult {
        node: 10,
        network: 90,
        service: 200,
    };

    #[test_case(ChargingPolicy::NoCharge, false, 0, 0 ; "no charge")]
    #[test_case(ChargingPolicy::NodeDueDiligence, true, 0, 90 ; "node due diligence")]
    #[test_case(ChargingPolicy::NodeAndNetworkOnly, false, 10, 90 ; "node and network")]
    #[test_case(ChargingPolicy::Full, false, 10, 290 ; "full")]
    fn test_distribution(policy: ChargingPolicy, node_pays: bool, to_node: u64, to_collector: u64) {
        let (state, payer) = state(10_000);
        let charger = FeeCharger::new(NODE, COLLECTOR);
        let distribution = charger.distribution(policy, payer, &FEES, &state);
        assert_eq!(distribution.fee_payer, if node_pays { NODE } else { payer });
        assert_eq!(distribution.to_node, to_node);
        assert_eq!(distribution.to_collector, to_collector);
    }

    #[test]
    fn test_insolvent_payer_pays_everything_node_first() {
        let (mut state, payer) = state(50);
        let charger = FeeCharger::new(NODE, COLLECTOR);
        let distribution = charger.distribution(ChargingPolicy::Full, payer, &FEES, &state);
        assert_eq!(distribution.to_node, 10);
        assert_eq!(distribution.to_collector, 40);

        let before = state.total_hbar();
        let adjustments = charger.charge(&mut state, &distribution).unwrap();
        assert_eq!(state.balance(payer), 0);
        assert_eq!(state.total_hbar(), before);
        assert_eq!(adjustments[&payer], -50);
        assert_eq!(adjustments[&NODE], 10);
        assert_eq!(adjustments[&COLLECTOR], 40);
    }

    #[test]
    fn test_node_due_diligence_moves_node_balance() {
        let (mut state, payer) = state(10_000);
        let charger = FeeCharger::new(NODE, COLLECTOR);
        let distribution =
            charger.distribution(ChargingPolicy::NodeDueDiligence, payer, &FEES, &state);
        charger.charge(&mut state, &distribution).unwrap();
        assert_eq!(state.balance(payer), 10_000);
        assert_eq!(state.balance(NODE), 910);
        assert_eq!(state.balance(COLLECTOR), 1_090);
    }

    #[test]
    fn test_node_paying_itself_is_not_counted() {
        let (mut state, _) = state(0);
        let charger = FeeCharger::new(NODE, COLLECTOR);
        let distribution = charger.distribution(ChargingPolicy::Full, NODE, &FEES, &state);
        assert_eq!(distribution.to_node, 0);
        assert_eq!(distribution.to_collector, 290);
        assert_eq!(distribution.total(), 290);

        let adjustments = charger.charge(&mut state, &distribution).unwrap();
        assert_eq!(adjustments[&NODE], -290);
        assert_eq!(adjustments[&COLLECTOR], 290);
        assert_eq!(state.balance(NODE), 710);
    }

    #[test]
    fn test_failed_charge_moves_nothing() {
        let (mut state, payer) = state(1_000);
        let charger = FeeCharger::new(NODE, COLLECTOR);
        // More than the payer holds; the node share alone would fit.
        let distribution = FeeDistribution {
            fee_payer: payer,
            to_node: 10,
            to_collector: 1_000,
        };
        assert_eq!(
            charger.charge(&mut state, &distribution),
            Err(ResponseCode::InsufficientAccountBalance)
        );
        assert_eq!(state.balance(payer), 1_000);
        assert_eq!(state.balance(NODE), 1_000);
        assert_eq!(state.balance(COLLECTOR), 1_000);
    }
}
