//! Transfer engine shared by crypto transfers, airdrops and claims:
//! resolves account references, authorises debits, assesses custom fees
//! and applies the resulting balance changes.

use {
    crate::{
        context::HandleContext,
        custom_fees::{self, CustomFeeCharges},
        hooks::execute_hook,
        record::{ChildRecord, NftTransferRecord},
        state::{LedgerState, Result},
    },
    log::*,
    simplefees_types::{
        AccountAmount, AccountId, AccountRef, HookCall, Key, NftId, ResponseCode, TokenId,
        TokenTransferList,
    },
    std::collections::{BTreeMap, BTreeSet},
};

/// Net balance changes keyed by account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceChanges {
    pub hbar: BTreeMap<AccountId, i64>,
    pub tokens: BTreeMap<TokenId, BTreeMap<AccountId, i64>>,
}

impl BalanceChanges {
    pub fn add_hbar(&mut self, account: AccountId, delta: i64) {
        let slot = self.hbar.entry(account).or_insert(0);
        *slot = slot.saturating_add(delta);
    }

    pub fn add_token(&mut self, token: TokenId, account: AccountId, delta: i64) {
        let slot = self.tokens.entry(token).or_default().entry(account).or_insert(0);
        *slot = slot.saturating_add(delta);
    }

    pub fn merge(&mut self, other: &BalanceChanges) {
        for (account, delta) in &other.hbar {
            self.add_hbar(*account, *delta);
        }
        for (token, adjustments) in &other.tokens {
            for (account, delta) in adjustments {
                self.add_token(*token, *account, *delta);
            }
        }
    }

    pub fn hbar_of(&self, account: AccountId) -> i64 {
        self.hbar.get(&account).copied().unwrap_or(0)
    }

    pub fn token_of(&self, token: TokenId, account: AccountId) -> i64 {
        self.tokens
            .get(&token)
            .and_then(|adjustments| adjustments.get(&account))
            .copied()
            .unwrap_or(0)
    }
}

/// One NFT serial changing hands, with resolved accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NftMove {
    pub nft: NftId,
    pub sender: AccountId,
    pub receiver: AccountId,
}

/// Stateless checks of transfer lists.
pub fn check_transfer_lists(hbar: &[AccountAmount], tokens: &[TokenTransferList]) -> Result<()> {
    check_adjustments(hbar, ResponseCode::InvalidAccountAmounts)?;

    let mut seen_tokens = BTreeSet::new();
    for list in tokens {
        if !seen_tokens.insert(list.token) {
            return Err(ResponseCode::TokenIdRepeatedInTokenList);
        }
        if !list.transfers.is_empty() && !list.nft_transfers.is_empty() {
            return Err(ResponseCode::InvalidAccountAmounts);
        }
        check_adjustments(&list.transfers, ResponseCode::TransfersNotZeroSumForToken)?;
        let mut serials = BTreeSet::new();
        for nft in &list.nft_transfers {
            if nft.sender == nft.receiver || !serials.insert(nft.serial) {
                return Err(ResponseCode::InvalidAccountAmounts);
            }
            if nft.serial == 0 {
                return Err(ResponseCode::InvalidNftId);
            }
        }
    }
    Ok(())
}

fn check_adjustments(adjustments: &[AccountAmount], not_zero_sum: ResponseCode) -> Result<()> {
    let mut accounts = BTreeSet::new();
    let mut sum = 0i128;
    for aa in adjustments {
        if !accounts.insert(&aa.account) {
            return Err(ResponseCode::AccountRepeatedInAccountAmounts);
        }
        sum = sum.saturating_add(i128::from(aa.amount));
    }
    if sum != 0 {
        return Err(not_zero_sum);
    }
    Ok(())
}

/// Whether any entry carries a hook call.
pub fn has_hook_calls(hbar: &[AccountAmount], tokens: &[TokenTransferList]) -> bool {
    hbar.iter().any(|aa| aa.hook_call.is_some())
        || tokens.iter().any(|list| list.hook_calls().next().is_some())
}

/// Keys of existing accounts debited without a hook call.
pub fn debit_keys(
    state: &LedgerState,
    hbar: &[AccountAmount],
    tokens: &[TokenTransferList],
) -> Vec<Key> {
    let fungible = hbar
        .iter()
        .chain(tokens.iter().flat_map(|list| list.transfers.iter()))
        .filter(|aa| aa.amount < 0 && aa.hook_call.is_none())
        .map(|aa| &aa.account);
    let nft_senders = tokens
        .iter()
        .flat_map(|list| list.nft_transfers.iter())
        .filter(|nft| nft.sender_hook_call.is_none())
        .map(|nft| &nft.sender);

    let mut seen = BTreeSet::new();
    fungible
        .chain(nft_senders)
        .filter_map(|account| state.resolve(account))
        .filter(|id| seen.insert(*id))
        .filter_map(|id| state.account(id).and_then(|account| account.key.clone()))
        .collect()
}

/// Resolves an account reference. Unknown aliases are created when the
/// account is being credited.
pub fn resolve_account(ctx: &mut HandleContext<'_>, account: &AccountRef, credited: bool) -> Result<AccountId> {
    if let Some(id) = ctx.state.resolve(account) {
        return Ok(id);
    }
    let AccountRef::Alias(alias) = account else {
        return Err(ResponseCode::InvalidAccountId);
    };
    if !credited {
        return Err(ResponseCode::InvalidAccountId);
    }
    let id = ctx.state.create_from_alias(alias)?;
    ctx.push_child(ChildRecord::AccountCreation {
        account: id,
        alias: alias.clone(),
    })?;
    debug!("auto-created {id} for {account}");
    Ok(id)
}

/// Authorises a debit by running the attached hook, or by the owner's
/// signature when there is none.
pub fn authorize(
    ctx: &mut HandleContext<'_>,
    account: AccountId,
    hook_call: Option<HookCall>,
    debit: u64,
) -> Result<()> {
    match hook_call {
        Some(call) => execute_hook(ctx, account, call, debit),
        None if debit > 0 => ctx.require_account_signature(account),
        None => Ok(()),
    }
}

/// Executes HBAR and token transfers, charging custom fees.
pub fn execute_transfers(
    ctx: &mut HandleContext<'_>,
    hbar: &[AccountAmount],
    tokens: &[TokenTransferList],
) -> Result<()> {
    execute_authorized_transfers(ctx, hbar, tokens, &BTreeSet::new())
}

/// Like [`execute_transfers`], but debits of `authorized` accounts were
/// already authorised by the caller.
pub fn execute_authorized_transfers(
    ctx: &mut HandleContext<'_>,
    hbar: &[AccountAmount],
    tokens: &[TokenTransferList],
    authorized: &BTreeSet<AccountId>,
) -> Result<()> {
    let mut original = BalanceChanges::default();
    let mut nft_moves = Vec::new();

    for aa in hbar {
        let account = resolve_account(ctx, &aa.account, aa.amount > 0)?;
        if !authorized.contains(&account) {
            authorize(ctx, account, aa.hook_call, debit_of(aa.amount))?;
        }
        original.add_hbar(account, aa.amount);
    }

    for list in tokens {
        let token = ctx
            .state
            .token(list.token)
            .ok_or(ResponseCode::InvalidTokenId)?;
        if token.paused {
            return Err(ResponseCode::TokenIsPaused);
        }
        if !token.is_fungible() && !list.transfers.is_empty() {
            return Err(ResponseCode::AccountAmountTransfersOnlyAllowedForFungibleCommon);
        }
        if token.is_fungible() && !list.nft_transfers.is_empty() {
            return Err(ResponseCode::InvalidNftId);
        }
        for aa in &list.transfers {
            let account = resolve_account(ctx, &aa.account, aa.amount > 0)?;
            if !authorized.contains(&account) {
                authorize(ctx, account, aa.hook_call, debit_of(aa.amount))?;
            }
            original.add_token(list.token, account, aa.amount);
        }
        for nft in &list.nft_transfers {
            let sender = resolve_account(ctx, &nft.sender, false)?;
            let receiver = resolve_account(ctx, &nft.receiver, true)?;
            if !authorized.contains(&sender) {
                authorize(ctx, sender, nft.sender_hook_call, 1)?;
            }
            nft_moves.push(NftMove {
                nft: NftId {
                    token: list.token,
                    serial: nft.serial,
                },
                sender,
                receiver,
            });
        }
    }

    let charges = custom_fees::assess(ctx.state, &ctx.config.limits, &original, &nft_moves)?;
    for payer in &charges.fallback_payers {
        ctx.require_account_signature(*payer)?;
    }
    apply_changes(ctx, &original, &nft_moves, charges)
}

pub(crate) fn debit_of(amount: i64) -> u64 {
    if amount < 0 {
        amount.unsigned_abs()
    } else {
        0
    }
}

/// Applies the original changes plus custom fee charges and records them.
pub(crate) fn apply_changes(
    ctx: &mut HandleContext<'_>,
    original: &BalanceChanges,
    nft_moves: &[NftMove],
    charges: CustomFeeCharges,
) -> Result<()> {
    let mut total = original.clone();
    total.merge(&charges.changes);

    // Senders must hold the token; receivers may be auto-associated.
    for (token, adjustments) in &total.tokens {
        for (account, delta) in adjustments {
            if *delta < 0 {
                check_sender_relation(ctx.state, *account, *token)?;
            } else if *delta > 0 {
                receive(ctx, *account, *token)?;
            }
        }
    }
    for nft_move in nft_moves {
        check_sender_relation(ctx.state, nft_move.sender, nft_move.nft.token)?;
        receive(ctx, nft_move.receiver, nft_move.nft.token)?;
    }

    // Debits first so a failure names the account that is short.
    for (account, delta) in total.hbar.iter().filter(|(_, delta)| **delta < 0) {
        ctx.state.adjust_hbar(*account, *delta).map_err(|code| {
            custom_fee_shortfall(code, ctx.state.balance(*account), original.hbar_of(*account))
        })?;
    }
    for (account, delta) in total.hbar.iter().filter(|(_, delta)| **delta > 0) {
        ctx.state.adjust_hbar(*account, *delta)?;
    }
    for (token, adjustments) in &total.tokens {
        for (account, delta) in adjustments.iter().filter(|(_, delta)| **delta < 0) {
            ctx.state.adjust_token(*account, *token, *delta).map_err(|code| {
                custom_fee_shortfall(
                    code,
                    ctx.state.token_balance(*account, *token),
                    original.token_of(*token, *account),
                )
            })?;
        }
        for (account, delta) in adjustments.iter().filter(|(_, delta)| **delta > 0) {
            ctx.state.adjust_token(*account, *token, *delta)?;
        }
    }
    for nft_move in nft_moves {
        ctx.state
            .move_nft(nft_move.nft, nft_move.sender, nft_move.receiver)?;
        ctx.effects.nft_transfers.push(NftTransferRecord {
            token: nft_move.nft.token,
            serial: nft_move.nft.serial,
            sender: nft_move.sender,
            receiver: nft_move.receiver,
        });
    }

    for (account, delta) in total.hbar.into_iter().filter(|(_, delta)| *delta != 0) {
        let slot = ctx.effects.hbar_transfers.entry(account).or_insert(0);
        *slot = slot.saturating_add(delta);
    }
    for (token, adjustments) in total.tokens {
        for (account, delta) in adjustments.into_iter().filter(|(_, delta)| *delta != 0) {
            let slot = ctx
                .effects
                .token_transfers
                .entry(token)
                .or_default()
                .entry(account)
                .or_insert(0);
            *slot = slot.saturating_add(delta);
        }
    }
    ctx.effects.assessed_custom_fees.extend(charges.assessed);
    Ok(())
}

/// A debit that fails only because of the custom fees added to it is
/// reported as a custom fee shortfall.
fn custom_fee_shortfall(code: ResponseCode, balance: u64, original_delta: i64) -> ResponseCode {
    let covers_original = i128::from(balance).saturating_add(i128::from(original_delta)) >= 0;
    match code {
        ResponseCode::InsufficientAccountBalance | ResponseCode::InsufficientTokenBalance
            if covers_original =>
        {
            ResponseCode::InsufficientSenderAccountBalanceForCustomFee
        }
        other => other,
    }
}

fn check_sender_relation(state: &LedgerState, account: AccountId, token: TokenId) -> Result<()> {
    let relation = state
        .relation(account, token)
        .ok_or(ResponseCode::TokenNotAssociatedToAccount)?;
    if relation.frozen {
        return Err(ResponseCode::AccountFrozenForToken);
    }
    Ok(())
}

fn receive(ctx: &mut HandleContext<'_>, account: AccountId, token: TokenId) -> Result<()> {
    if ctx.state.ensure_receiver_association(account, token)? {
        ctx.effects.automatic_associations.push((account, token));
    }
    Ok(())
}
