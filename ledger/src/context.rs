use {
    crate::{
        config::LedgerConfig,
        record::{ChildRecord, TransactionEffects},
        state::{LedgerState, Result},
    },
    simplefees_types::{AccountId, Key, ResponseCode, Timestamp, VerifiedKeys},
};

/// Everything a handler may read or change while handling one
/// transaction. `state` is a scratch copy; the caller discards it when the
/// handler fails.
pub struct HandleContext<'a> {
    pub state: &'a mut LedgerState,
    pub config: &'a LedgerConfig,
    pub verified: &'a VerifiedKeys,
    pub payer: AccountId,
    pub consensus_time: Timestamp,
    pub effects: TransactionEffects,
}

impl<'a> HandleContext<'a> {
    pub fn new(
        state: &'a mut LedgerState,
        config: &'a LedgerConfig,
        verified: &'a VerifiedKeys,
        payer: AccountId,
        consensus_time: Timestamp,
    ) -> Self {
        Self {
            state,
            config,
            verified,
            payer,
            consensus_time,
            effects: TransactionEffects::default(),
        }
    }

    /// Fails with `INVALID_SIGNATURE` unless the key is active.
    pub fn require_key(&self, key: &Key) -> Result<()> {
        if key.is_satisfied_by(self.verified) {
            Ok(())
        } else {
            Err(ResponseCode::InvalidSignature)
        }
    }

    /// Requires the signature of an account. Hollow accounts cannot sign.
    pub fn require_account_signature(&self, account: AccountId) -> Result<()> {
        let entry = self
            .state
            .account(account)
            .ok_or(ResponseCode::InvalidAccountId)?;
        match &entry.key {
            Some(key) => self.require_key(key),
            None => Err(ResponseCode::InvalidSignature),
        }
    }

    /// Adds a child record, enforcing the per-transaction limit.
    pub fn push_child(&mut self, child: ChildRecord) -> Result<()> {
        if self.effects.child_records.len() >= self.config.limits.max_child_records {
            return Err(ResponseCode::MaxChildRecordsExceeded);
        }
        self.effects.child_records.push(child);
        Ok(())
    }
}
