use {
    super::{mismatched, TransactionHandler},
    crate::{
        config::LedgerConfig,
        context::HandleContext,
        record::PendingAirdropRecord,
        state::{LedgerState, Result},
        transfer::{
            authorize, check_transfer_lists, debit_keys, execute_authorized_transfers,
            has_hook_calls, resolve_account,
        },
    },
    log::*,
    simplefees_types::{
        AccountAmount, AccountId, Functionality, HookCall, Key, NftId, NftTransfer,
        PendingAirdropId, ResponseCode, TokenId, TokenTransferList, TransactionBody,
        TransactionData,
    },
    std::collections::{BTreeMap, BTreeSet},
};

/// Sends tokens to receivers that can take them and leaves pending
/// airdrops for the rest.
pub struct TokenAirdropHandler;

impl TransactionHandler for TokenAirdropHandler {
    fn functionality(&self) -> Functionality {
        Functionality::TokenAirdrop
    }

    fn pure_checks(&self, body: &TransactionBody, config: &LedgerConfig) -> Result<()> {
        let TransactionData::TokenAirdrop(op) = &body.data else {
            return mismatched(&body.data);
        };
        if op.token_transfers.is_empty() {
            return Err(ResponseCode::InvalidTransactionBody);
        }
        let transfers = op
            .token_transfers
            .iter()
            .map(|list| list.transfers.len().saturating_add(list.nft_transfers.len()))
            .fold(0usize, usize::saturating_add);
        if transfers > config.limits.max_airdrop_transfers {
            return Err(ResponseCode::TokenReferenceListSizeLimitExceeded);
        }
        check_transfer_lists(&[], &op.token_transfers)?;
        for list in &op.token_transfers {
            let senders = list.transfers.iter().filter(|aa| aa.amount < 0).count();
            if !list.transfers.is_empty() && senders != 1 {
                return Err(ResponseCode::InvalidAccountAmounts);
            }
            if list.transfers.iter().any(|aa| aa.amount == 0) {
                return Err(ResponseCode::InvalidAccountAmounts);
            }
            if let Some(first) = list.nft_transfers.first() {
                if list.nft_transfers.iter().any(|nft| nft.sender != first.sender) {
                    return Err(ResponseCode::InvalidAccountAmounts);
                }
            }
        }
        if !config.hooks.hooks_enabled && has_hook_calls(&[], &op.token_transfers) {
            return Err(ResponseCode::HooksNotEnabled);
        }
        Ok(())
    }

    fn required_keys(&self, body: &TransactionBody, state: &LedgerState) -> Vec<Key> {
        match &body.data {
            TransactionData::TokenAirdrop(op) => debit_keys(state, &[], &op.token_transfers),
            _ => Vec::new(),
        }
    }

    fn handle(&self, body: &TransactionBody, ctx: &mut HandleContext<'_>) -> Result<()> {
        let TransactionData::TokenAirdrop(op) = &body.data else {
            return mismatched(&body.data);
        };
        let mut split = AirdropSplit::default();
        for list in &op.token_transfers {
            let token = ctx
                .state
                .token(list.token)
                .ok_or(ResponseCode::InvalidTokenId)?;
            if token.paused {
                return Err(ResponseCode::TokenIsPaused);
            }
            if token.is_fungible() {
                if !list.nft_transfers.is_empty() {
                    return Err(ResponseCode::InvalidNftId);
                }
                split_fungible(ctx, list, &mut split)?;
            } else {
                if !list.transfers.is_empty() {
                    return Err(ResponseCode::AccountAmountTransfersOnlyAllowedForFungibleCommon);
                }
                if token.has_fallback_royalty() {
                    return Err(ResponseCode::TokenAirdropWithFallbackRoyalty);
                }
                split_nfts(ctx, list, &mut split)?;
            }
        }

        let mut authorized = BTreeSet::new();
        for (sender, (hook_call, debit)) in &split.senders {
            authorize(ctx, *sender, *hook_call, *debit)?;
            authorized.insert(*sender);
        }
        for (id, amount) in split.pending {
            ctx.state.add_pending_airdrop(id, amount)?;
            ctx.effects
                .new_pending_airdrops
                .push(PendingAirdropRecord { id, amount });
        }
        if !split.immediate.is_empty() {
            execute_authorized_transfers(ctx, &[], &split.immediate, &authorized)?;
        }
        debug!(
            "airdrop: {} immediate lists, {} pending",
            split.immediate.len(),
            ctx.effects.new_pending_airdrops.len()
        );
        Ok(())
    }
}

#[derive(Default)]
struct AirdropSplit {
    immediate: Vec<TokenTransferList>,
    pending: Vec<(PendingAirdropId, Option<u64>)>,
    /// Hook call and total debit per sender.
    senders: BTreeMap<AccountId, (Option<HookCall>, u64)>,
    /// Free slots left per receiver after the credits seen so far.
    free_slots: BTreeMap<AccountId, Option<u64>>,
    /// Pairs that will be associated by an earlier credit.
    reserved: BTreeSet<(AccountId, TokenId)>,
}

impl AirdropSplit {
    fn note_sender(&mut self, sender: AccountId, hook_call: Option<HookCall>, debit: u64) {
        let entry = self.senders.entry(sender).or_insert((hook_call, 0));
        if entry.0.is_none() {
            entry.0 = hook_call;
        }
        entry.1 = entry.1.saturating_add(debit);
    }

    /// Whether the credit can be delivered now, reserving an automatic
    /// association slot if it needs one.
    fn deliverable(&mut self, state: &LedgerState, receiver: AccountId, token: TokenId) -> bool {
        if state.relation(receiver, token).is_some() || self.reserved.contains(&(receiver, token)) {
            return true;
        }
        let slots = self.free_slots.entry(receiver).or_insert_with(|| {
            state
                .account(receiver)
                .map_or(Some(0), |account| account.free_auto_association_slots())
        });
        let takes_slot = match slots {
            None => true,
            Some(0) => false,
            Some(free) => {
                *free = free.saturating_sub(1);
                true
            }
        };
        if takes_slot {
            self.reserved.insert((receiver, token));
        }
        takes_slot
    }
}

fn split_fungible(ctx: &mut HandleContext<'_>, list: &TokenTransferList, split: &mut AirdropSplit) -> Result<()> {
    let Some(sender_entry) = list.transfers.iter().find(|aa| aa.amount < 0) else {
        return Err(ResponseCode::InvalidAccountAmounts);
    };
    let sender = resolve_account(ctx, &sender_entry.account, false)?;
    let total = sender_entry.amount.unsigned_abs();
    if ctx.state.token_balance(sender, list.token) < total {
        return Err(ResponseCode::InsufficientTokenBalance);
    }
    split.note_sender(sender, sender_entry.hook_call, total);

    let mut credits = Vec::new();
    let mut delivered = 0u64;
    for credit in list.transfers.iter().filter(|aa| aa.amount > 0) {
        let receiver = resolve_account(ctx, &credit.account, true)?;
        let amount = credit.amount.unsigned_abs();
        if split.deliverable(ctx.state, receiver, list.token) {
            credits.push(AccountAmount::new(receiver, credit.amount));
            delivered = delivered.saturating_add(amount);
        } else {
            split
                .pending
                .push((PendingAirdropId::fungible(sender, receiver, list.token), Some(amount)));
        }
    }
    if !credits.is_empty() {
        let debit = i64::try_from(delivered).map_err(|_| ResponseCode::InvalidAccountAmounts)?;
        let mut transfers = vec![AccountAmount::new(sender, debit.saturating_neg())];
        transfers.extend(credits);
        split
            .immediate
            .push(TokenTransferList::fungible(list.token, transfers));
    }
    Ok(())
}

fn split_nfts(ctx: &mut HandleContext<'_>, list: &TokenTransferList, split: &mut AirdropSplit) -> Result<()> {
    let mut moves = Vec::new();
    for nft in &list.nft_transfers {
        let sender = resolve_account(ctx, &nft.sender, false)?;
        let receiver = resolve_account(ctx, &nft.receiver, true)?;
        let id = NftId {
            token: list.token,
            serial: nft.serial,
        };
        let owner = ctx.state.nft(id).ok_or(ResponseCode::InvalidNftId)?.owner;
        if owner != sender {
            return Err(ResponseCode::SenderDoesNotOwnNftSerialNo);
        }
        split.note_sender(sender, nft.sender_hook_call, 1);
        if split.deliverable(ctx.state, receiver, list.token) {
            moves.push(NftTransfer::new(sender, receiver, nft.serial));
        } else {
            split.pending.push((PendingAirdropId::nft(sender, receiver, id), None));
        }
    }
    if !moves.is_empty() {
        split.immediate.push(TokenTransferList::nft(list.token, moves));
    }
    Ok(())
}
