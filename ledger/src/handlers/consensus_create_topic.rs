use {
    super::{mismatched, TransactionHandler},
    crate::{
        config::LedgerConfig,
        context::HandleContext,
        state::{LedgerState, Result},
        topic::Topic,
    },
    log::*,
    simplefees_types::{
        ConsensusCreateTopicBody, Functionality, Key, ResponseCode, TransactionBody,
        TransactionData,
    },
};

pub struct ConsensusCreateTopicHandler;

impl TransactionHandler for ConsensusCreateTopicHandler {
    fn functionality(&self) -> Functionality {
        Functionality::ConsensusCreateTopic
    }

    fn pure_checks(&self, body: &TransactionBody, config: &LedgerConfig) -> Result<()> {
        let TransactionData::ConsensusCreateTopic(op) = &body.data else {
            return mismatched(&body.data);
        };
        if op.memo.len() > config.limits.max_memo_bytes {
            return Err(ResponseCode::MemoTooLong);
        }
        if op.memo.contains('\0') {
            return Err(ResponseCode::InvalidZeroByteInString);
        }
        if op.custom_fees.len() > config.limits.max_topic_custom_fees {
            return Err(ResponseCode::CustomFeesListTooLong);
        }
        Ok(())
    }

    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key> {
        let TransactionData::ConsensusCreateTopic(op) = &body.data else {
            return Vec::new();
        };
        let renew_key = op
            .auto_renew_account
            .and_then(|id| state.account(id))
            .and_then(|account| account.key.clone());
        op.admin_key.iter().cloned().chain(renew_key).collect()
    }

    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()> {
        let TransactionData::ConsensusCreateTopic(op) = &body.data else {
            return mismatched(&body.data);
        };
        let keys = op
            .admin_key
            .iter()
            .chain(op.submit_key.iter())
            .chain(op.fee_exempt_keys.iter());
        for key in keys {
            if !key.is_valid() {
                return Err(ResponseCode::BadEncoding);
            }
        }
        if let Some(admin_key) = &op.admin_key {
            ctx.require_key(admin_key)?;
        }
        if let Some(account) = op.auto_renew_account {
            if ctx.state.account(account).is_none() {
                return Err(ResponseCode::InvalidAutorenewAccount);
            }
            ctx.require_account_signature(account)?;
        }
        let limits = &ctx.config.limits;
        if !(limits.min_auto_renew_period_secs..=limits.max_auto_renew_period_secs)
            .contains(&op.auto_renew_period_secs)
        {
            return Err(ResponseCode::AutorenewDurationNotInRange);
        }
        validate_custom_fees(ctx.state, op)?;

        let period = i64::try_from(op.auto_renew_period_secs)
            .map_err(|_| ResponseCode::AutorenewDurationNotInRange)?;
        let topic = Topic {
            memo: op.memo.clone(),
            admin_key: op.admin_key.clone(),
            submit_key: op.submit_key.clone(),
            auto_renew_account: op.auto_renew_account,
            auto_renew_period_secs: op.auto_renew_period_secs,
            expiration: ctx.consensus_time.plus_secs(period),
            custom_fees: op.custom_fees.clone(),
            fee_exempt_keys: op.fee_exempt_keys.clone(),
            sequence_number: 0,
        };
        let id = ctx.state.insert_topic(topic);
        info!("created topic {id}");
        ctx.effects.created_topic = Some(id);
        Ok(())
    }
}

fn validate_custom_fees(state: &LedgerState, op: &ConsensusCreateTopicBody) -> Result<()> {
    for topic_fee in &op.custom_fees {
        if topic_fee.fee.amount == 0 {
            return Err(ResponseCode::CustomFeeMustBePositive);
        }
        if state.account(topic_fee.collector).is_none() {
            return Err(ResponseCode::InvalidCustomFeeCollector);
        }
        if let Some(token) = topic_fee.fee.denominating_token {
            if !state.token(token).is_some_and(|token| token.is_fungible()) {
                return Err(ResponseCode::InvalidTokenIdInCustomFees);
            }
        }
    }
    Ok(())
}
