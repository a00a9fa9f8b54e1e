//! Handle: runs the transaction's handler on a scratch copy of the ledger
//! and commits it only on success.

use {
    crate::pre_handle::PreHandled,
    log::*,
    simplefees_ledger::{HandleContext, LedgerConfig, LedgerState, TransactionEffects, TransactionHandler},
    simplefees_types::{ResponseCode, Timestamp, TransactionBody},
};

pub(crate) fn dispatch(
    handler: &dyn TransactionHandler,
    body: &TransactionBody,
    state: &mut LedgerState,
    config: &LedgerConfig,
    pre: &PreHandled,
    consensus_time: Timestamp,
) -> Result<TransactionEffects, ResponseCode> {
    if let Some(key) = pre
        .required_keys
        .iter()
        .find(|key| !key.is_satisfied_by(&pre.verified))
    {
        debug!("{}: required key {key:?} did not sign", body.transaction_id);
        return Err(ResponseCode::InvalidSignature);
    }

    let mut scratch = state.clone();
    let mut ctx = HandleContext::new(&mut scratch, config, &pre.verified, body.payer(), consensus_time);
    if let Err(code) = handler.handle(body, &mut ctx) {
        trace!("{}: handler failed with {code}, rolling back", body.transaction_id);
        return Err(code);
    }
    let effects = ctx.effects;
    *state = scratch;
    Ok(effects)
}
