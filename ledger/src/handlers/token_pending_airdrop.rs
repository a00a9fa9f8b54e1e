//! Claiming and cancelling pending airdrops.

use {
    super::{mismatched, TransactionHandler},
    crate::{
        config::LedgerConfig,
        context::HandleContext,
        record::NftTransferRecord,
        state::{LedgerState, Result},
    },
    log::*,
    simplefees_types::{
        AccountId, Functionality, Key, NftId, PendingAirdropId, ResponseCode, TransactionBody,
        TransactionData,
    },
    std::collections::BTreeSet,
};

fn check_ids(ids: &[PendingAirdropId], config: &LedgerConfig) -> Result<()> {
    if ids.is_empty() {
        return Err(ResponseCode::EmptyPendingAirdropIdList);
    }
    if ids.len() > config.limits.max_pending_airdrop_ids {
        return Err(ResponseCode::PendingAirdropIdListTooLong);
    }
    let mut seen = BTreeSet::new();
    if !ids.iter().all(|id| seen.insert(*id)) {
        return Err(ResponseCode::PendingAirdropIdRepeated);
    }
    Ok(())
}

fn account_keys(state: &LedgerState, accounts: impl Iterator<Item = AccountId>) -> Vec<Key> {
    accounts
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|id| state.account(id).and_then(|account| account.key.clone()))
        .collect()
}

fn require_existing(ctx: &HandleContext<'_>, ids: &[PendingAirdropId]) -> Result<()> {
    if ids.iter().any(|id| ctx.state.pending_airdrop(id).is_none()) {
        return Err(ResponseCode::InvalidPendingAirdropId);
    }
    Ok(())
}

/// Receiver accepts pending airdrops; tokens move from the sender.
pub struct TokenClaimAirdropHandler;

impl TransactionHandler for TokenClaimAirdropHandler {
    fn functionality(&self) -> Functionality {
        Functionality::TokenClaimAirdrop
    }

    fn pure_checks(&self, body: &TransactionBody, config: &LedgerConfig) -> Result<()> {
        let TransactionData::TokenClaimAirdrop(op) = &body.data else {
            return mismatched(&body.data);
        };
        check_ids(&op.pending_airdrops, config)
    }

    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key> {
        let TransactionData::TokenClaimAirdrop(op) = &body.data else {
            return Vec::new();
        };
        account_keys(state, op.pending_airdrops.iter().map(|id| id.receiver))
    }

    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()> {
        let TransactionData::TokenClaimAirdrop(op) = &body.data else {
            return mismatched(&body.data);
        };
        require_existing(ctx, &op.pending_airdrops)?;
        let receivers: BTreeSet<AccountId> = op.pending_airdrops.iter().map(|id| id.receiver).collect();
        for receiver in receivers {
            ctx.require_account_signature(receiver)?;
        }

        for id in &op.pending_airdrops {
            let pending = ctx.state.remove_pending_airdrop(id)?;
            if ctx.state.relation(id.receiver, id.token).is_none() {
                ctx.state.associate(id.receiver, id.token)?;
            }
            if ctx.state.relation(id.sender, id.token).is_some_and(|rel| rel.frozen)
                || ctx.state.relation(id.receiver, id.token).is_some_and(|rel| rel.frozen)
            {
                return Err(ResponseCode::AccountFrozenForToken);
            }
            match (id.serial, pending.amount) {
                (Some(serial), _) => {
                    let nft = NftId {
                        token: id.token,
                        serial,
                    };
                    ctx.state.move_nft(nft, id.sender, id.receiver)?;
                    ctx.effects.nft_transfers.push(NftTransferRecord {
                        token: id.token,
                        serial,
                        sender: id.sender,
                        receiver: id.receiver,
                    });
                }
                (None, amount) => {
                    let amount = i64::try_from(amount.unwrap_or(0))
                        .map_err(|_| ResponseCode::InvalidAccountAmounts)?;
                    ctx.state.adjust_token(id.sender, id.token, amount.saturating_neg())?;
                    ctx.state.adjust_token(id.receiver, id.token, amount)?;
                    let adjustments = ctx.effects.token_transfers.entry(id.token).or_default();
                    for (account, delta) in [(id.sender, amount.saturating_neg()), (id.receiver, amount)] {
                        let slot = adjustments.entry(account).or_insert(0);
                        *slot = slot.saturating_add(delta);
                    }
                }
            }
            debug!("claimed pending airdrop of {} from {} by {}", id.token, id.sender, id.receiver);
        }
        Ok(())
    }
}

/// Sender withdraws pending airdrops.
pub struct TokenCancelAirdropHandler;

impl TransactionHandler for TokenCancelAirdropHandler {
    fn functionality(&self) -> Functionality {
        Functionality::TokenCancelAirdrop
    }

    fn pure_checks(&self, body: &TransactionBody, config: &LedgerConfig) -> Result<()> {
        let TransactionData::TokenCancelAirdrop(op) = &body.data else {
            return mismatched(&body.data);
        };
        check_ids(&op.pending_airdrops, config)
    }

    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key> {
        let TransactionData::TokenCancelAirdrop(op) = &body.data else {
            return Vec::new();
        };
        account_keys(state, op.pending_airdrops.iter().map(|id| id.sender))
    }

    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()> {
        let TransactionData::TokenCancelAirdrop(op) = &body.data else {
            return mismatched(&body.data);
        };
        require_existing(ctx, &op.pending_airdrops)?;
        let senders: BTreeSet<AccountId> = op.pending_airdrops.iter().map(|id| id.sender).collect();
        for sender in senders {
            ctx.require_account_signature(sender)?;
        }
        for id in &op.pending_airdrops {
            ctx.state.remove_pending_airdrop(id)?;
        }
        Ok(())
    }
}
