//! Allowance hook execution.

use {
    crate::{
        context::HandleContext,
        record::ChildRecord,
        state::Result,
    },
    log::*,
    simplefees_types::{AccountId, HookCall, ResponseCode},
};

/// Runs `owner`'s hook to authorise a debit of `amount` units and records
/// the execution as a child record.
pub fn execute_hook(
    ctx: &mut HandleContext<'_>,
    owner: AccountId,
    call: HookCall,
    amount: u64,
) -> Result<()> {
    if !ctx.config.hooks.hooks_enabled {
        return Err(ResponseCode::HooksNotEnabled);
    }
    let hook = ctx
        .state
        .account(owner)
        .ok_or(ResponseCode::InvalidAccountId)?
        .hooks
        .get(&call.hook_id)
        .copied()
        .ok_or(ResponseCode::HookNotFound)?;
    if call.gas_limit < hook.gas_used {
        debug!(
            "hook {} of {owner} needs {} gas, limit {}",
            call.hook_id, hook.gas_used, call.gas_limit
        );
        return Err(ResponseCode::InsufficientGas);
    }
    ctx.push_child(ChildRecord::HookExecution {
        owner,
        hook_id: call.hook_id,
        gas_used: hook.gas_used,
    })?;
    if !hook.approves(amount) {
        return Err(ResponseCode::RejectedByAccountAllowanceHook);
    }
    Ok(())
}
