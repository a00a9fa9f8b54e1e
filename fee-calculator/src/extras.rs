//! Extras Counter: derives billable dimension counts from a transaction.

use {
    crate::state::CalculatorState,
    serde::{Deserialize, Serialize},
    simplefees_schedule::Extra,
    simplefees_types::{AccountAmount, AccountId, AccountRef, TokenId, TokenTransferList},
    std::collections::{BTreeMap, BTreeSet},
};

/// Count per extra. Absent extras count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraCounts(BTreeMap<Extra, u64>);

impl ExtraCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, extra: Extra, count: u64) -> Self {
        self.set(extra, count);
        self
    }

    pub fn get(&self, extra: Extra) -> u64 {
        self.0.get(&extra).copied().unwrap_or(0)
    }

    pub fn set(&mut self, extra: Extra, count: u64) {
        self.0.insert(extra, count);
    }

    pub fn add(&mut self, extra: Extra, count: u64) {
        let slot = self.0.entry(extra).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Extra, u64)> + '_ {
        self.0.iter().map(|(extra, count)| (*extra, *count))
    }
}

impl FromIterator<(Extra, u64)> for ExtraCounts {
    fn from_iter<I: IntoIterator<Item = (Extra, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Dimensions of an HBAR/token transfer set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferCounts {
    /// Unique accounts across all lists.
    pub accounts: u64,
    /// Unique tokens moved, including tokens denominating fixed custom fees
    /// on the moved tokens.
    pub token_types: u64,
    pub hook_executions: u64,
    /// Sum of hook gas limits.
    pub gas: u64,
    /// Credited aliases that do not resolve to an account.
    pub created_accounts: u64,
    /// Receivers that will consume a free auto-association slot.
    pub auto_associations: u64,
    /// Token credits the receiver cannot take now: fungible credits count
    /// once per (receiver, token), NFT credits once per serial.
    pub unassociable_credits: u64,
    pub has_custom_fees: bool,
}

/// Walks every HBAR and token adjustment once, simulating how many free
/// association slots each receiver would consume.
pub fn count_transfers(
    hbar: &[AccountAmount],
    tokens: &[TokenTransferList],
    state: &dyn CalculatorState,
) -> TransferCounts {
    let mut counter = TransferCounter {
        state,
        counts: TransferCounts::default(),
        accounts: BTreeSet::new(),
        created: BTreeSet::new(),
        free_slots: BTreeMap::new(),
        auto_associated: BTreeSet::new(),
        unassociable_fungible: BTreeSet::new(),
    };

    for aa in hbar {
        counter.touch(&aa.account);
        if aa.amount > 0 {
            counter.note_alias_credit(&aa.account);
        }
        if let Some(call) = &aa.hook_call {
            counter.hook(call.gas_limit);
        }
    }

    let mut token_types = BTreeSet::new();
    for list in tokens {
        token_types.insert(list.token);
        if state.token_has_custom_fees(list.token) {
            counter.counts.has_custom_fees = true;
        }
        for aa in &list.transfers {
            counter.touch(&aa.account);
            if aa.amount > 0 {
                counter.token_credit(&aa.account, list.token, false);
            } else if aa.amount < 0 {
                counter.fee_denominations(&aa.account, list.token, &mut token_types);
            }
            if let Some(call) = &aa.hook_call {
                counter.hook(call.gas_limit);
            }
        }
        for nft in &list.nft_transfers {
            counter.touch(&nft.sender);
            counter.touch(&nft.receiver);
            counter.token_credit(&nft.receiver, list.token, true);
            counter.fee_denominations(&nft.sender, list.token, &mut token_types);
            if let Some(call) = &nft.sender_hook_call {
                counter.hook(call.gas_limit);
            }
        }
    }

    let mut counts = counter.counts;
    counts.accounts = counter.accounts.len() as u64;
    counts.token_types = token_types.len() as u64;
    counts.created_accounts = counter.created.len() as u64;
    counts
}

struct TransferCounter<'a> {
    state: &'a dyn CalculatorState,
    counts: TransferCounts,
    accounts: BTreeSet<AccountRef>,
    created: BTreeSet<Vec<u8>>,
    free_slots: BTreeMap<AccountId, Option<u64>>,
    auto_associated: BTreeSet<(AccountRef, TokenId)>,
    unassociable_fungible: BTreeSet<(AccountId, TokenId)>,
}

impl TransferCounter<'_> {
    fn canonical(&self, account: &AccountRef) -> AccountRef {
        match self.state.resolve(account) {
            Some(id) => AccountRef::Id(id),
            None => account.clone(),
        }
    }

    fn touch(&mut self, account: &AccountRef) {
        let key = self.canonical(account);
        self.accounts.insert(key);
    }

    fn hook(&mut self, gas_limit: u64) {
        self.counts.hook_executions = self.counts.hook_executions.saturating_add(1);
        self.counts.gas = self.counts.gas.saturating_add(gas_limit);
    }

    fn fee_denominations(&self, sender: &AccountRef, token: TokenId, token_types: &mut BTreeSet<TokenId>) {
        if let Some(id) = self.state.resolve(sender) {
            token_types.extend(self.state.fixed_fee_denominations(token, id));
        }
    }

    fn note_alias_credit(&mut self, account: &AccountRef) {
        if let AccountRef::Alias(alias) = account {
            if self.state.resolve(account).is_none() {
                self.created.insert(alias.clone());
            }
        }
    }

    fn token_credit(&mut self, receiver: &AccountRef, token: TokenId, is_nft: bool) {
        self.note_alias_credit(receiver);
        let key = (self.canonical(receiver), token);
        if self.auto_associated.contains(&key) {
            return;
        }
        let Some(id) = self.state.resolve(receiver) else {
            // New accounts have unlimited slots.
            self.auto_associated.insert(key);
            self.counts.auto_associations = self.counts.auto_associations.saturating_add(1);
            return;
        };
        if self.state.is_associated(id, token) {
            return;
        }
        let state = self.state;
        let slots = self
            .free_slots
            .entry(id)
            .or_insert_with(|| state.free_auto_association_slots(id));
        let takes_slot = match slots {
            None => true,
            Some(0) => false,
            Some(free) => {
                *free = free.saturating_sub(1);
                true
            }
        };
        if takes_slot {
            self.auto_associated.insert(key);
            self.counts.auto_associations = self.counts.auto_associations.saturating_add(1);
        } else if is_nft || self.unassociable_fungible.insert((id, token)) {
            self.counts.unassociable_credits = self.counts.unassociable_credits.saturating_add(1);
        }
    }
}
