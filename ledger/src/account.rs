//! Accounts and the allowance hooks they own.

use {
    serde::{Deserialize, Serialize},
    simplefees_types::{HookId, Key},
    std::collections::BTreeMap,
};

/// `max_automatic_associations` value meaning "no limit".
pub const UNLIMITED_AUTO_ASSOCIATIONS: i32 = -1;

/// Decision an allowance hook takes on a debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookRule {
    AllowAll,
    RejectAll,
    /// Allows debits of at most this many units (HBAR or token).
    MaxDebit(u64),
}

/// A program attached to an account that may authorise debits in place of
/// the account's signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceHook {
    /// Gas the program consumes; calls with a lower limit run out of gas.
    pub gas_used: u64,
    pub rule: HookRule,
}

impl AllowanceHook {
    pub const fn allow(gas_used: u64) -> Self {
        Self {
            gas_used,
            rule: HookRule::AllowAll,
        }
    }

    pub const fn reject(gas_used: u64) -> Self {
        Self {
            gas_used,
            rule: HookRule::RejectAll,
        }
    }

    pub const fn max_debit(gas_used: u64, max: u64) -> Self {
        Self {
            gas_used,
            rule: HookRule::MaxDebit(max),
        }
    }

    pub fn approves(&self, debit: u64) -> bool {
        match self.rule {
            HookRule::AllowAll => true,
            HookRule::RejectAll => false,
            HookRule::MaxDebit(max) => debit <= max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// HBAR balance in tinybars.
    pub balance: u64,
    /// `None` for hollow accounts created from an EVM address.
    pub key: Option<Key>,
    pub alias: Option<Vec<u8>>,
    /// Free association slots; [`UNLIMITED_AUTO_ASSOCIATIONS`] for no limit.
    pub max_automatic_associations: i32,
    pub used_automatic_associations: u32,
    pub hooks: BTreeMap<HookId, AllowanceHook>,
}

impl Account {
    pub fn is_hollow(&self) -> bool {
        self.key.is_none()
    }

    /// Remaining automatic association slots; `None` means unlimited.
    pub fn free_auto_association_slots(&self) -> Option<u64> {
        if self.max_automatic_associations < 0 {
            return None;
        }
        let max = u64::from(self.max_automatic_associations.unsigned_abs());
        Some(max.saturating_sub(u64::from(self.used_automatic_associations)))
    }
}

/// Parameters of an account created through the setup API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSpec {
    pub key: Option<Key>,
    pub alias: Option<Vec<u8>>,
    pub balance: u64,
    pub max_automatic_associations: i32,
    pub hooks: BTreeMap<HookId, AllowanceHook>,
}

impl AccountSpec {
    pub fn new(key: Key) -> Self {
        Self {
            key: Some(key),
            alias: None,
            balance: 0,
            max_automatic_associations: 0,
            hooks: BTreeMap::new(),
        }
    }

    /// An account without a key, as created for an EVM address alias.
    pub fn hollow(evm_address: Vec<u8>) -> Self {
        Self {
            key: None,
            alias: Some(evm_address),
            balance: 0,
            max_automatic_associations: UNLIMITED_AUTO_ASSOCIATIONS,
            hooks: BTreeMap::new(),
        }
    }

    pub fn with_balance(mut self, tinybars: u64) -> Self {
        self.balance = tinybars;
        self
    }

    pub fn with_alias(mut self, alias: Vec<u8>) -> Self {
        self.alias = Some(alias);
        self
    }

    pub fn with_max_automatic_associations(mut self, max: i32) -> Self {
        self.max_automatic_associations = max;
        self
    }

    pub fn with_hook(mut self, hook_id: HookId, hook: AllowanceHook) -> Self {
        self.hooks.insert(hook_id, hook);
        self
    }

    pub(crate) fn into_account(self) -> Account {
        Account {
            balance: self.balance,
            key: self.key,
            alias: self.alias,
            max_automatic_associations: self.max_automatic_associations,
            used_automatic_associations: 0,
            hooks: self.hooks,
        }
    }
}
