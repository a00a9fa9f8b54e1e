//! Custom fee assessment.
//!
//! Fees are assessed level by level. Level 0 is the transaction's own
//! token transfers; fixed fees denominated in a token that has custom fees
//! of its own are assessed again one level deeper.

use {
    crate::{
        config::LedgerLimits,
        record::AssessedCustomFee,
        state::{LedgerState, Result},
        token::Token,
        transfer::{BalanceChanges, NftMove},
    },
    log::*,
    simplefees_types::{
        AccountId, CustomFee, CustomFeeKind, FixedFee, FractionalFee, ResponseCode, RoyaltyFee,
        TokenId,
    },
    std::collections::{BTreeMap, BTreeSet},
};

/// Balance changes caused by custom fees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomFeeCharges {
    pub changes: BalanceChanges,
    pub assessed: Vec<AssessedCustomFee>,
    /// NFT receivers paying a fallback fee; they must sign.
    pub fallback_payers: BTreeSet<AccountId>,
}

type Adjustments = BTreeMap<TokenId, BTreeMap<AccountId, i64>>;

struct Assessor<'a> {
    state: &'a LedgerState,
    limits: &'a LedgerLimits,
    charges: CustomFeeCharges,
    depth: usize,
    next: Adjustments,
}

/// Assesses every custom fee triggered by `original` and `nft_moves`.
pub fn assess(
    state: &LedgerState,
    limits: &LedgerLimits,
    original: &BalanceChanges,
    nft_moves: &[NftMove],
) -> Result<CustomFeeCharges> {
    let mut assessor = Assessor {
        state,
        limits,
        charges: CustomFeeCharges::default(),
        depth: 0,
        next: BTreeMap::new(),
    };

    assessor.assess_fungible(&original.tokens)?;
    assessor.assess_nfts(original, nft_moves)?;
    let mut level = std::mem::take(&mut assessor.next);
    while !level.is_empty() {
        assessor.depth = assessor.depth.saturating_add(1);
        assessor.assess_fungible(&level)?;
        level = std::mem::take(&mut assessor.next);
    }

    if !assessor.charges.assessed.is_empty() {
        debug!(
            "assessed {} custom fees over {} levels",
            assessor.charges.assessed.len(),
            assessor.depth.saturating_add(1)
        );
    }
    Ok(assessor.charges)
}

pub(crate) fn is_exempt(token: &Token, fee: &CustomFee, payer: AccountId) -> bool {
    payer == token.treasury
        || payer == fee.collector
        || (fee.all_collectors_are_exempt && token.is_fee_collector(payer))
}

impl<'a> Assessor<'a> {
    fn token(&self, id: TokenId) -> Result<&'a Token> {
        self.state.token(id).ok_or(ResponseCode::InvalidTokenId)
    }

    fn assess_fungible(&mut self, level: &Adjustments) -> Result<()> {
        for (token_id, adjustments) in level {
            let token = self.token(*token_id)?;
            if token.custom_fees.is_empty() {
                continue;
            }
            let senders: Vec<(AccountId, u64)> = adjustments
                .iter()
                .filter(|(_, delta)| **delta < 0)
                .map(|(account, delta)| (*account, delta.unsigned_abs()))
                .collect();
            // Receiver credit not yet consumed by fractional fees.
            let mut credits: BTreeMap<AccountId, u64> = adjustments
                .iter()
                .filter(|(_, delta)| **delta > 0)
                .map(|(account, delta)| (*account, delta.unsigned_abs()))
                .collect();
            for fee in &token.custom_fees {
                for (sender, sent) in &senders {
                    if is_exempt(token, fee, *sender) {
                        continue;
                    }
                    match fee.kind {
                        CustomFeeKind::Fixed(fixed) => {
                            self.charge_fixed(*token_id, fee, fixed, *sender)?;
                        }
                        CustomFeeKind::Fractional(fractional) => {
                            self.charge_fractional(*token_id, fee, fractional, *sender, *sent, &mut credits)?;
                        }
                        // Royalties only apply to NFT exchanges.
                        CustomFeeKind::Royalty(_) => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn assess_nfts(&mut self, original: &BalanceChanges, nft_moves: &[NftMove]) -> Result<()> {
        let mut by_token: BTreeMap<TokenId, Vec<&NftMove>> = BTreeMap::new();
        for nft_move in nft_moves {
            by_token.entry(nft_move.nft.token).or_default().push(nft_move);
        }
        for (token_id, moves) in by_token {
            let token = self.token(token_id)?;
            if token.custom_fees.is_empty() {
                continue;
            }
            let senders: BTreeSet<AccountId> = moves.iter().map(|m| m.sender).collect();
            for fee in &token.custom_fees {
                match fee.kind {
                    CustomFeeKind::Fixed(fixed) => {
                        for sender in senders.iter().filter(|s| !is_exempt(token, fee, **s)) {
                            self.charge_fixed(token_id, fee, fixed, *sender)?;
                        }
                    }
                    CustomFeeKind::Royalty(royalty) => {
                        for sender in senders.iter().filter(|s| !is_exempt(token, fee, **s)) {
                            let receivers: Vec<AccountId> = moves
                                .iter()
                                .filter(|m| m.sender == *sender)
                                .map(|m| m.receiver)
                                .collect();
                            self.charge_royalty(token, token_id, fee, royalty, *sender, &receivers, original)?;
                        }
                    }
                    CustomFeeKind::Fractional(_) => {}
                }
            }
        }
        Ok(())
    }

    fn record(&mut self, amount: u64, token: Option<TokenId>, collector: AccountId, payers: Vec<AccountId>) -> Result<()> {
        if self.charges.assessed.len() >= self.limits.max_custom_fees_assessed {
            return Err(ResponseCode::CustomFeeChargingExceededMaxAccountAmounts);
        }
        if self.depth >= self.limits.max_custom_fee_depth {
            return Err(ResponseCode::CustomFeeChargingExceededMaxRecursionDepth);
        }
        self.charges.assessed.push(AssessedCustomFee {
            amount,
            token,
            collector,
            effective_payers: payers,
        });
        Ok(())
    }

    fn require_collector_association(&self, collector: AccountId, token: TokenId) -> Result<()> {
        if self.state.relation(collector, token).is_none() {
            return Err(ResponseCode::TokenNotAssociatedToFeeCollector);
        }
        Ok(())
    }

    /// Fixed fee paid once by `payer`. Fees denominated in another token
    /// become transfers of the next level.
    fn charge_fixed(&mut self, fee_token: TokenId, fee: &CustomFee, fixed: FixedFee, payer: AccountId) -> Result<()> {
        if fixed.amount == 0 {
            return Ok(());
        }
        let amount = signed(fixed.amount)?;
        self.record(fixed.amount, fixed.denominating_token, fee.collector, vec![payer])?;
        match fixed.denominating_token {
            None => {
                self.charges.changes.add_hbar(payer, amount.saturating_neg());
                self.charges.changes.add_hbar(fee.collector, amount);
            }
            Some(denomination) => {
                if self.state.token(denomination).is_none() {
                    return Err(ResponseCode::InvalidTokenIdInCustomFees);
                }
                self.require_collector_association(fee.collector, denomination)?;
                self.charges.changes.add_token(denomination, payer, amount.saturating_neg());
                self.charges.changes.add_token(denomination, fee.collector, amount);
                if denomination != fee_token {
                    let next = self.next.entry(denomination).or_default();
                    for (account, delta) in [(payer, amount.saturating_neg()), (fee.collector, amount)] {
                        let slot = next.entry(account).or_insert(0);
                        *slot = slot.saturating_add(delta);
                    }
                }
            }
        }
        Ok(())
    }

    /// Fractional fee on `sent` units. Taken out of the receivers' remaining
    /// credits in proportion, or added on top of the sender's debit when the
    /// fee is net of transfers.
    fn charge_fractional(
        &mut self,
        token: TokenId,
        fee: &CustomFee,
        fractional: FractionalFee,
        sender: AccountId,
        sent: u64,
        credits: &mut BTreeMap<AccountId, u64>,
    ) -> Result<()> {
        let amount = fractional_amount(sent, &fractional);
        if amount == 0 {
            return Ok(());
        }
        self.require_collector_association(fee.collector, token)?;
        let signed_amount = signed(amount)?;

        if fractional.net_of_transfers {
            self.record(amount, Some(token), fee.collector, vec![sender])?;
            self.charges.changes.add_token(token, sender, signed_amount.saturating_neg());
            self.charges.changes.add_token(token, fee.collector, signed_amount);
            return Ok(());
        }

        let receivers: Vec<(AccountId, u64)> = credits
            .iter()
            .filter(|(account, credit)| **credit > 0 && **account != fee.collector)
            .map(|(account, credit)| (*account, *credit))
            .collect();
        let credited = receivers.iter().map(|(_, credit)| *credit).fold(0u64, u64::saturating_add);
        if credited < amount {
            return Err(ResponseCode::InsufficientSenderAccountBalanceForCustomFee);
        }
        let shares = split_proportionally(amount, &receivers);
        let payers = shares.iter().filter(|(_, share)| *share > 0).map(|(account, _)| *account).collect();
        self.record(amount, Some(token), fee.collector, payers)?;
        for (receiver, share) in shares {
            if let Some(credit) = credits.get_mut(&receiver) {
                *credit = credit.saturating_sub(share);
            }
            self.charges.changes.add_token(token, receiver, signed(share)?.saturating_neg());
        }
        self.charges.changes.add_token(token, fee.collector, signed_amount);
        Ok(())
    }

    /// Royalty on every fungible value the NFT sender received in this
    /// transaction, or the fallback fee per NFT paid by its receiver.
    #[allow(clippy::too_many_arguments)]
    fn charge_royalty(
        &mut self,
        token: &Token,
        token_id: TokenId,
        fee: &CustomFee,
        royalty: RoyaltyFee,
        sender: AccountId,
        receivers: &[AccountId],
        original: &BalanceChanges,
    ) -> Result<()> {
        let hbar_received = original.hbar_of(sender);
        let tokens_received: Vec<(TokenId, u64)> = original
            .tokens
            .iter()
            .filter(|(other, _)| **other != token_id)
            .filter_map(|(other, adjustments)| {
                let delta = adjustments.get(&sender).copied().unwrap_or(0);
                (delta > 0).then_some((*other, delta.unsigned_abs()))
            })
            .collect();

        if hbar_received <= 0 && tokens_received.is_empty() {
            let Some(fallback) = royalty.fallback else {
                return Ok(());
            };
            for receiver in receivers {
                if is_exempt(token, fee, *receiver) {
                    continue;
                }
                self.charges.fallback_payers.insert(*receiver);
                self.charge_fixed(token_id, fee, fallback, *receiver)?;
            }
            return Ok(());
        }

        if hbar_received > 0 {
            let amount = ratio(hbar_received.unsigned_abs(), royalty.numerator, royalty.denominator);
            if amount > 0 {
                let signed_amount = signed(amount)?;
                self.record(amount, None, fee.collector, vec![sender])?;
                self.charges.changes.add_hbar(sender, signed_amount.saturating_neg());
                self.charges.changes.add_hbar(fee.collector, signed_amount);
            }
        }
        for (exchanged, value) in tokens_received {
            let amount = ratio(value, royalty.numerator, royalty.denominator);
            if amount == 0 {
                continue;
            }
            self.require_collector_association(fee.collector, exchanged)?;
            let signed_amount = signed(amount)?;
            self.record(amount, Some(exchanged), fee.collector, vec![sender])?;
            self.charges.changes.add_token(exchanged, sender, signed_amount.saturating_neg());
            self.charges.changes.add_token(exchanged, fee.collector, signed_amount);
        }
        Ok(())
    }
}

fn signed(amount: u64) -> Result<i64> {
    i64::try_from(amount).map_err(|_| ResponseCode::InvalidAccountAmounts)
}

/// `value * numerator / denominator`, rounded down; zero for a zero
/// denominator.
fn ratio(value: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let scaled = u128::from(value)
        .saturating_mul(u128::from(numerator))
        .checked_div(u128::from(denominator))
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Clamped fractional fee on `sent` units.
pub fn fractional_amount(sent: u64, fee: &FractionalFee) -> u64 {
    let mut amount = ratio(sent, fee.numerator, fee.denominator).max(fee.minimum);
    if fee.maximum > 0 {
        amount = amount.min(fee.maximum);
    }
    amount
}

/// Splits `amount` across `receivers` in proportion to their credits. The
/// rounding remainder goes to the first receiver with credit left, so no
/// share exceeds its receiver's credit while `amount` fits in the total.
fn split_proportionally(amount: u64, receivers: &[(AccountId, u64)]) -> Vec<(AccountId, u64)> {
    let total = receivers.iter().map(|(_, credit)| *credit).fold(0u64, u64::saturating_add);
    let mut shares: Vec<(AccountId, u64)> = receivers
        .iter()
        .map(|(account, credit)| (*account, ratio(amount, *credit, total)))
        .collect();
    let assigned = shares.iter().map(|(_, share)| *share).fold(0u64, u64::saturating_add);
    let mut remainder = amount.saturating_sub(assigned);
    for ((_, share), (_, credit)) in shares.iter_mut().zip(receivers) {
        if remainder == 0 {
            break;
        }
        let room = credit.saturating_sub(*share).min(remainder);
        *share = share.saturating_add(room);
        remainder = remainder.saturating_sub(room);
    }
    shares
}
