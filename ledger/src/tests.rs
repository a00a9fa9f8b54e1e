//! Handler tests against an in-memory ledger.

#![allow(clippy::arithmetic_side_effects)]

use {
    crate::{
        account::{AccountSpec, AllowanceHook},
        config::LedgerConfig,
        context::HandleContext,
        handlers::HandlerRegistry,
        record::{AssessedCustomFee, ChildRecord, TransactionEffects},
        state::{LedgerState, Result},
        token::TokenSpec,
    },
    assert_matches::assert_matches,
    pretty_assertions::assert_eq,
    simplefees_calculator::count_transfers,
    simplefees_types::{
        AccountAmount, AccountId, AccountRef, ConsensusCreateTopicBody, CryptoTransferBody,
        CustomFee, FixedFee, Key, NftId, NftTransfer, PendingAirdropId, ResponseCode, Timestamp,
        TokenAirdropBody, TokenAssociateBody, TokenCancelAirdropBody, TokenClaimAirdropBody,
        TokenId, TokenMintBody, TokenTransferList, TopicCustomFee, TransactionBody,
        TransactionData, TransactionId, VerifiedKeys,
    },
    test_case::test_case,
};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

const HBAR: u64 = 100_000_000;

fn key(n: u8) -> Key {
    Key::Ed25519([n; 32])
}

struct Fixture {
    state: LedgerState,
    config: LedgerConfig,
    registry: HandlerRegistry,
    treasury: AccountId,
    alice: AccountId,
    bob: AccountId,
    carol: AccountId,
    collector: AccountId,
}

impl Fixture {
    fn new() -> Self {
        let mut state = LedgerState::new();
        let mut create = |n: u8, slots: i32| {
            state
                .create_account(
                    AccountSpec::new(key(n))
                        .with_balance(100 * HBAR)
                        .with_max_automatic_associations(slots),
                )
                .unwrap()
        };
        let treasury = create(1, 0);
        let alice = create(2, 0);
        let bob = create(3, 0);
        let carol = create(4, 1);
        let collector = create(5, 0);
        Self {
            state,
            config: LedgerConfig::default(),
            registry: HandlerRegistry::new(),
            treasury,
            alice,
            bob,
            carol,
            collector,
        }
    }

    fn fungible(&mut self, fees: Vec<CustomFee>) -> TokenId {
        let mut spec = TokenSpec::fungible("FT", self.treasury, 1_000_000).with_supply_key(key(1));
        for fee in fees {
            spec = spec.with_custom_fee(fee);
        }
        self.state.create_token(spec).unwrap()
    }

    fn nft(&mut self, fees: Vec<CustomFee>) -> TokenId {
        let mut spec = TokenSpec::non_fungible("NFT", self.treasury, key(1));
        for fee in fees {
            spec = spec.with_custom_fee(fee);
        }
        let token = self.state.create_token(spec).unwrap();
        self.state
            .mint_nfts(token, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()])
            .unwrap();
        token
    }

    /// Associates and moves `amount` units from the treasury.
    fn fund(&mut self, account: AccountId, token: TokenId, amount: i64) {
        if self.state.relation(account, token).is_none() {
            self.state.associate(account, token).unwrap();
        }
        self.state.adjust_token(self.treasury, token, -amount).unwrap();
        self.state.adjust_token(account, token, amount).unwrap();
    }

    fn give_nft(&mut self, account: AccountId, token: TokenId, serial: u64) {
        if self.state.relation(account, token).is_none() {
            self.state.associate(account, token).unwrap();
        }
        self.state
            .move_nft(NftId { token, serial }, self.treasury, account)
            .unwrap();
    }

    fn body(&self, data: TransactionData) -> TransactionBody {
        TransactionBody {
            transaction_id: TransactionId {
                payer: self.alice,
                valid_start: Timestamp::from_secs(9_990),
            },
            node_account: AccountId::new(3),
            max_transaction_fee: 100 * HBAR,
            valid_duration_secs: 120,
            memo: String::new(),
            data,
        }
    }

    /// Runs pure checks and the handler; commits on success.
    fn run(&mut self, data: TransactionData, signers: &[u8]) -> (Result<()>, TransactionEffects) {
        let body = self.body(data);
        let handler = self.registry.get(body.data.functionality()).unwrap();
        if let Err(code) = handler.pure_checks(&body, &self.config) {
            return (Err(code), TransactionEffects::default());
        }
        let mut verified = VerifiedKeys::default();
        for n in signers {
            verified.insert(vec![*n; 32]);
        }
        let mut scratch = self.state.clone();
        let mut ctx = HandleContext::new(
            &mut scratch,
            &self.config,
            &verified,
            body.payer(),
            Timestamp::from_secs(10_000),
        );
        let result = handler.handle(&body, &mut ctx);
        let effects = std::mem::take(&mut ctx.effects);
        if result.is_ok() {
            self.state = scratch;
        }
        (result, effects)
    }
}

fn transfer(hbar: Vec<AccountAmount>, tokens: Vec<TokenTransferList>) -> TransactionData {
    TransactionData::CryptoTransfer(CryptoTransferBody {
        hbar_transfers: hbar,
        token_transfers: tokens,
    })
}

fn ft(token: TokenId, entries: &[(AccountId, i64)]) -> TokenTransferList {
    TokenTransferList::fungible(
        token,
        entries
            .iter()
            .map(|(account, amount)| AccountAmount::new(*account, *amount))
            .collect(),
    )
}

fn airdrop(tokens: Vec<TokenTransferList>) -> TransactionData {
    TransactionData::TokenAirdrop(TokenAirdropBody {
        token_transfers: tokens,
    })
}

// ===========================================================================
// CryptoTransfer
// ===========================================================================

#[test]
fn test_hbar_transfer_moves_balances() {
    let mut fx = Fixture::new();
    let (alice, bob) = (fx.alice, fx.bob);
    let (result, effects) = fx.run(
        transfer(
            vec![AccountAmount::new(alice, -(HBAR as i64)), AccountAmount::new(bob, HBAR as i64)],
            vec![],
        ),
        &[2],
    );
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.balance(alice), 99 * HBAR);
    assert_eq!(fx.state.balance(bob), 101 * HBAR);
    assert_eq!(effects.hbar_adjustment(alice), -(HBAR as i64));
}

#[test]
fn test_debit_requires_owner_signature() {
    let mut fx = Fixture::new();
    let (alice, bob) = (fx.alice, fx.bob);
    let (result, _) = fx.run(
        transfer(vec![AccountAmount::new(bob, -10), AccountAmount::new(alice, 10)], vec![]),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::InvalidSignature));
    assert_eq!(fx.state.balance(bob), 100 * HBAR);
}

#[test]
fn test_insufficient_balance_rolls_back() {
    let mut fx = Fixture::new();
    let (alice, bob) = (fx.alice, fx.bob);
    let amount = (101 * HBAR) as i64;
    let (result, _) = fx.run(
        transfer(vec![AccountAmount::new(alice, -amount), AccountAmount::new(bob, amount)], vec![]),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::InsufficientAccountBalance));
    assert_eq!(fx.state.balance(alice), 100 * HBAR);
}

#[test_case(vec![(1002, -10), (1003, 5)], ResponseCode::InvalidAccountAmounts; "not zero sum")]
#[test_case(vec![(1002, -10), (1002, 10)], ResponseCode::AccountRepeatedInAccountAmounts; "repeated")]
fn test_transfer_pure_checks(entries: Vec<(u64, i64)>, expected: ResponseCode) {
    let mut fx = Fixture::new();
    let hbar = entries
        .into_iter()
        .map(|(num, amount)| AccountAmount::new(AccountId::new(num), amount))
        .collect();
    let (result, _) = fx.run(transfer(hbar, vec![]), &[2]);
    assert_eq!(result, Err(expected));
}

#[test]
fn test_token_list_must_net_to_zero() {
    let mut fx = Fixture::new();
    let token = fx.fungible(vec![]);
    let (alice, bob) = (fx.alice, fx.bob);
    let (result, _) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -5), (bob, 4)])]), &[2]);
    assert_eq!(result, Err(ResponseCode::TransfersNotZeroSumForToken));
}

#[test]
fn test_fungible_list_on_nft_rejected() {
    let mut fx = Fixture::new();
    let token = fx.nft(vec![]);
    let (alice, bob) = (fx.alice, fx.bob);
    let (result, _) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -1), (bob, 1)])]), &[2]);
    assert_eq!(
        result,
        Err(ResponseCode::AccountAmountTransfersOnlyAllowedForFungibleCommon)
    );
}

#[test]
fn test_alias_credits_create_accounts() {
    let mut fx = Fixture::new();
    let alice = fx.alice;
    let ed_alias = vec![9u8; 32];
    let evm_alias = vec![7u8; 20];
    let (result, effects) = fx.run(
        transfer(
            vec![
                AccountAmount::new(alice, -30),
                AccountAmount::new(AccountRef::Alias(ed_alias.clone()), 10),
                AccountAmount::new(AccountRef::Alias(evm_alias.clone()), 20),
            ],
            vec![],
        ),
        &[2],
    );
    assert_eq!(result, Ok(()));
    let keyed = fx.state.account_by_alias(&ed_alias).unwrap();
    let hollow = fx.state.account_by_alias(&evm_alias).unwrap();
    assert_eq!(fx.state.account(keyed).unwrap().key, Some(Key::Ed25519([9; 32])));
    assert!(fx.state.account(hollow).unwrap().is_hollow());
    assert_eq!(fx.state.balance(hollow), 20);
    assert_eq!(effects.created_accounts().collect::<Vec<_>>(), vec![keyed, hollow]);
}

#[test]
fn test_bad_alias_and_unknown_debit() {
    let mut fx = Fixture::new();
    let alice = fx.alice;
    let (result, _) = fx.run(
        transfer(
            vec![AccountAmount::new(alice, -1), AccountAmount::new(AccountRef::Alias(vec![1; 5]), 1)],
            vec![],
        ),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::InvalidAliasKey));

    let (result, _) = fx.run(
        transfer(
            vec![AccountAmount::new(AccountRef::Alias(vec![8; 32]), -1), AccountAmount::new(alice, 1)],
            vec![],
        ),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::InvalidAccountId));
}

#[test]
fn test_child_record_limit() {
    let mut fx = Fixture::new();
    fx.config = LedgerConfig::default().with_max_child_records(1);
    let alice = fx.alice;
    let (result, _) = fx.run(
        transfer(
            vec![
                AccountAmount::new(alice, -2),
                AccountAmount::new(AccountRef::Alias(vec![9; 32]), 1),
                AccountAmount::new(AccountRef::Alias(vec![10; 32]), 1),
            ],
            vec![],
        ),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::MaxChildRecordsExceeded));
    assert_eq!(fx.state.account_by_alias(&[9; 32]), None);
}

#[test]
fn test_auto_association_slots() {
    let mut fx = Fixture::new();
    let first = fx.fungible(vec![]);
    let second = fx.fungible(vec![]);
    let (alice, bob, carol) = (fx.alice, fx.bob, fx.carol);
    fx.fund(alice, first, 100);
    fx.fund(alice, second, 100);

    // Carol has one free slot.
    let (result, effects) = fx.run(transfer(vec![], vec![ft(first, &[(alice, -10), (carol, 10)])]), &[2]);
    assert_eq!(result, Ok(()));
    assert_eq!(effects.automatic_associations, vec![(carol, first)]);
    assert_eq!(fx.state.token_balance(carol, first), 10);

    let (result, _) = fx.run(transfer(vec![], vec![ft(second, &[(alice, -10), (carol, 10)])]), &[2]);
    assert_eq!(result, Err(ResponseCode::NoRemainingAutomaticAssociations));

    // Bob has no slots at all.
    let (result, _) = fx.run(transfer(vec![], vec![ft(first, &[(alice, -10), (bob, 10)])]), &[2]);
    assert_eq!(result, Err(ResponseCode::TokenNotAssociatedToAccount));
}

#[test]
fn test_frozen_and_paused() {
    let mut fx = Fixture::new();
    let token = fx.fungible(vec![]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.fund(alice, token, 100);
    fx.state.associate(bob, token).unwrap();
    let data = transfer(vec![], vec![ft(token, &[(alice, -10), (bob, 10)])]);

    fx.state.set_frozen(bob, token, true).unwrap();
    assert_eq!(fx.run(data.clone(), &[2]).0, Err(ResponseCode::AccountFrozenForToken));

    fx.state.set_frozen(bob, token, false).unwrap();
    fx.state.set_paused(token, true).unwrap();
    assert_eq!(fx.run(data.clone(), &[2]).0, Err(ResponseCode::TokenIsPaused));

    fx.state.set_paused(token, false).unwrap();
    assert_eq!(fx.run(data, &[2]).0, Ok(()));
}

#[test]
fn test_nft_transfer_requires_ownership() {
    let mut fx = Fixture::new();
    let token = fx.nft(vec![]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.give_nft(alice, token, 1);
    fx.state.associate(bob, token).unwrap();

    let (result, _) = fx.run(
        transfer(vec![], vec![TokenTransferList::nft(token, vec![NftTransfer::new(alice, bob, 2)])]),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::SenderDoesNotOwnNftSerialNo));

    let (result, effects) = fx.run(
        transfer(vec![], vec![TokenTransferList::nft(token, vec![NftTransfer::new(alice, bob, 1)])]),
        &[2],
    );
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.nft(NftId { token, serial: 1 }).unwrap().owner, bob);
    assert_eq!(fx.state.token_balance(bob, token), 1);
    assert_eq!(effects.nft_transfers.len(), 1);
}

// ===========================================================================
// Hooks
// ===========================================================================

#[test]
fn test_hook_authorises_debit_without_signature() {
    let mut fx = Fixture::new();
    let owner = fx
        .state
        .create_account(
            AccountSpec::new(key(20))
                .with_balance(HBAR)
                .with_hook(1, AllowanceHook::allow(1_000)),
        )
        .unwrap();
    let bob = fx.bob;
    let (result, effects) = fx.run(
        transfer(
            vec![AccountAmount::new(owner, -100).with_hook(1, 2_000), AccountAmount::new(bob, 100)],
            vec![],
        ),
        &[2],
    );
    assert_eq!(result, Ok(()));
    assert_eq!(
        effects.child_records,
        vec![ChildRecord::HookExecution {
            owner,
            hook_id: 1,
            gas_used: 1_000
        }]
    );
    assert_eq!(fx.state.balance(owner), HBAR - 100);
}

#[test]
fn test_hooks_disabled_fail_pure_checks() {
    let mut fx = Fixture::new();
    fx.config = LedgerConfig::default().with_hooks_enabled(false);
    let (alice, bob) = (fx.alice, fx.bob);
    let (result, _) = fx.run(
        transfer(
            vec![AccountAmount::new(alice, -1).with_hook(1, 10), AccountAmount::new(bob, 1)],
            vec![],
        ),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::HooksNotEnabled));
}

// ===========================================================================
// Custom fees
// ===========================================================================

#[test]
fn test_fixed_hbar_fee_charged_once_per_sender() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.fungible(vec![CustomFee::fixed_hbar(10, collector)]);
    let (alice, bob, treasury) = (fx.alice, fx.bob, fx.treasury);
    fx.fund(alice, token, 100);
    fx.state.associate(bob, token).unwrap();

    let (result, effects) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -10), (bob, 10)])]), &[2]);
    assert_eq!(result, Ok(()));
    assert_eq!(
        effects.assessed_custom_fees,
        vec![AssessedCustomFee {
            amount: 10,
            token: None,
            collector,
            effective_payers: vec![alice],
        }]
    );
    assert_eq!(fx.state.balance(alice), 100 * HBAR - 10);
    assert_eq!(fx.state.balance(collector), 100 * HBAR + 10);

    // The treasury is exempt.
    let (result, effects) = fx.run(transfer(vec![], vec![ft(token, &[(treasury, -10), (bob, 10)])]), &[1]);
    assert_eq!(result, Ok(()));
    assert!(effects.assessed_custom_fees.is_empty());
}

#[test]
fn test_all_collectors_exempt() {
    let mut fx = Fixture::new();
    let (collector, carol) = (fx.collector, fx.carol);
    let token = fx.fungible(vec![
        CustomFee::fixed_hbar(10, collector).with_all_collectors_exempt(),
        CustomFee::fixed_hbar(20, carol),
    ]);
    let bob = fx.bob;
    fx.fund(carol, token, 100);
    fx.state.associate(bob, token).unwrap();

    let (result, effects) = fx.run(transfer(vec![], vec![ft(token, &[(carol, -10), (bob, 10)])]), &[4]);
    assert_eq!(result, Ok(()));
    assert!(effects.assessed_custom_fees.is_empty());
}

#[test]
fn test_fractional_fee_taken_from_receivers() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.fungible(vec![CustomFee::fractional(1, 10, 1, 0, collector)]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.fund(alice, token, 1_000);
    fx.state.associate(bob, token).unwrap();

    let (result, effects) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -100), (bob, 100)])]), &[2]);
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.token_balance(bob, token), 90);
    assert_eq!(fx.state.token_balance(collector, token), 10);
    assert_eq!(fx.state.token_balance(alice, token), 900);
    assert_eq!(effects.assessed_custom_fees[0].effective_payers, vec![bob]);
    assert_eq!(effects.token_adjustment(token, bob), 90);
}

#[test]
fn test_fractional_fee_shares_receiver_credit_across_senders() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.fungible(vec![CustomFee::fractional(1, 10, 0, 0, collector)]);
    let (alice, bob, carol) = (fx.alice, fx.bob, fx.carol);
    fx.fund(alice, token, 100);
    fx.fund(carol, token, 100);
    fx.state.associate(bob, token).unwrap();

    let (result, effects) = fx.run(
        transfer(vec![], vec![ft(token, &[(alice, -50), (carol, -50), (bob, 100)])]),
        &[2, 4],
    );
    assert_eq!(result, Ok(()));
    assert_eq!(effects.assessed_custom_fees.len(), 2);
    assert_eq!(fx.state.token_balance(bob, token), 90);
    assert_eq!(fx.state.token_balance(collector, token), 10);
}

#[test]
fn test_fractional_fees_cannot_exceed_receiver_credit() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.fungible(vec![CustomFee::fractional(1, 10, 15, 0, collector)]);
    let (alice, bob, carol) = (fx.alice, fx.bob, fx.carol);
    fx.fund(alice, token, 10);
    fx.fund(carol, token, 10);
    fx.fund(bob, token, 100);

    // Each sender owes the 15 minimum; bob is credited 20 in total.
    let (result, _) = fx.run(
        transfer(vec![], vec![ft(token, &[(alice, -10), (carol, -10), (bob, 20)])]),
        &[2, 4],
    );
    assert_eq!(result, Err(ResponseCode::InsufficientSenderAccountBalanceForCustomFee));
    assert_eq!(fx.state.token_balance(bob, token), 100);
    assert_eq!(fx.state.token_balance(collector, token), 0);
}

#[test]
fn test_fractional_fee_net_of_transfers() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.fungible(vec![CustomFee::fractional(1, 10, 0, 5, collector).with_net_of_transfers()]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.fund(alice, token, 1_000);
    fx.state.associate(bob, token).unwrap();

    let (result, _) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -100), (bob, 100)])]), &[2]);
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.token_balance(bob, token), 100);
    assert_eq!(fx.state.token_balance(collector, token), 5);
    assert_eq!(fx.state.token_balance(alice, token), 895);
}

#[test]
fn test_royalty_on_exchanged_hbar() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.nft(vec![CustomFee::royalty(
        1,
        10,
        Some(FixedFee {
            amount: 50,
            denominating_token: None,
        }),
        collector,
    )]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.give_nft(alice, token, 1);
    fx.state.associate(bob, token).unwrap();

    let (result, _) = fx.run(
        transfer(
            vec![AccountAmount::new(bob, -1_000), AccountAmount::new(alice, 1_000)],
            vec![TokenTransferList::nft(token, vec![NftTransfer::new(alice, bob, 1)])],
        ),
        &[2, 3],
    );
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.balance(alice), 100 * HBAR + 900);
    assert_eq!(fx.state.balance(collector), 100 * HBAR + 100);
}

#[test]
fn test_royalty_fallback_paid_by_receiver_who_must_sign() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.nft(vec![CustomFee::royalty(
        1,
        10,
        Some(FixedFee {
            amount: 50,
            denominating_token: None,
        }),
        collector,
    )]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.give_nft(alice, token, 1);
    fx.state.associate(bob, token).unwrap();
    let data = transfer(vec![], vec![TokenTransferList::nft(token, vec![NftTransfer::new(alice, bob, 1)])]);

    assert_eq!(fx.run(data.clone(), &[2]).0, Err(ResponseCode::InvalidSignature));
    let (result, effects) = fx.run(data, &[2, 3]);
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.balance(bob), 100 * HBAR - 50);
    assert_eq!(effects.assessed_custom_fees[0].effective_payers, vec![bob]);
}

fn nested_fee_tokens(fx: &mut Fixture) -> TokenId {
    let collector = fx.collector;
    let alice = fx.alice;
    let c = fx.fungible(vec![CustomFee::fixed_hbar(1, collector)]);
    let b = fx.fungible(vec![CustomFee::fixed_hts(1, c, collector)]);
    let a = fx.fungible(vec![CustomFee::fixed_hts(1, b, collector)]);
    fx.state.associate(collector, b).unwrap();
    fx.state.associate(collector, c).unwrap();
    fx.fund(alice, a, 100);
    fx.fund(alice, b, 100);
    fx.fund(alice, c, 100);
    let bob = fx.bob;
    fx.state.associate(bob, a).unwrap();
    a
}

#[test]
fn test_custom_fee_depth_limit() {
    let mut fx = Fixture::new();
    let a = nested_fee_tokens(&mut fx);
    let (alice, bob) = (fx.alice, fx.bob);
    let data = transfer(vec![], vec![ft(a, &[(alice, -10), (bob, 10)])]);
    assert_eq!(
        fx.run(data.clone(), &[2]).0,
        Err(ResponseCode::CustomFeeChargingExceededMaxRecursionDepth)
    );

    fx.config.limits.max_custom_fee_depth = 3;
    let (result, effects) = fx.run(data, &[2]);
    assert_eq!(result, Ok(()));
    assert_eq!(effects.assessed_custom_fees.len(), 3);
}

#[test]
fn test_max_assessed_custom_fees() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let token = fx.fungible(vec![CustomFee::fixed_hbar(1, collector), CustomFee::fixed_hbar(2, collector)]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.fund(alice, token, 100);
    fx.state.associate(bob, token).unwrap();
    fx.config.limits.max_custom_fees_assessed = 1;
    let (result, _) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -10), (bob, 10)])]), &[2]);
    assert_eq!(result, Err(ResponseCode::CustomFeeChargingExceededMaxAccountAmounts));
}

#[test]
fn test_fee_collector_must_be_associated() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let denomination = fx.fungible(vec![]);
    let token = fx.fungible(vec![CustomFee::fixed_hts(5, denomination, collector)]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.fund(alice, token, 100);
    fx.fund(alice, denomination, 100);
    fx.state.associate(bob, token).unwrap();
    let (result, _) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -10), (bob, 10)])]), &[2]);
    assert_eq!(result, Err(ResponseCode::TokenNotAssociatedToFeeCollector));
}

#[test]
fn test_sender_cannot_cover_custom_fee() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let denomination = fx.fungible(vec![]);
    let token = fx.fungible(vec![CustomFee::fixed_hts(5, denomination, collector)]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.state.associate(collector, denomination).unwrap();
    fx.fund(alice, token, 100);
    fx.fund(alice, denomination, 4);
    fx.state.associate(bob, token).unwrap();
    let (result, _) = fx.run(transfer(vec![], vec![ft(token, &[(alice, -10), (bob, 10)])]), &[2]);
    assert_eq!(result, Err(ResponseCode::InsufficientSenderAccountBalanceForCustomFee));
}

// ===========================================================================
// Airdrops
// ===========================================================================

#[test]
fn test_airdrop_splits_immediate_and_pending() {
    let mut fx = Fixture::new();
    let token = fx.fungible(vec![]);
    let (alice, bob, carol) = (fx.alice, fx.bob, fx.carol);
    fx.fund(alice, token, 100);

    let (result, effects) = fx.run(airdrop(vec![ft(token, &[(alice, -30), (bob, 10), (carol, 20)])]), &[2]);
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.token_balance(carol, token), 20);
    assert_eq!(fx.state.token_balance(alice, token), 80);
    let pending = PendingAirdropId::fungible(alice, bob, token);
    assert_eq!(fx.state.pending_airdrop(&pending).unwrap().amount, Some(10));
    assert_eq!(effects.new_pending_airdrops.len(), 1);

    // Fungible pending amounts aggregate.
    let (result, _) = fx.run(airdrop(vec![ft(token, &[(alice, -5), (bob, 5)])]), &[2]);
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.pending_airdrop(&pending).unwrap().amount, Some(15));
    assert_eq!(fx.state.pending_airdrop_count(), 1);
}

#[test]
fn test_airdrop_nft_pending_duplicate() {
    let mut fx = Fixture::new();
    let token = fx.nft(vec![]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.give_nft(alice, token, 1);
    let data = airdrop(vec![TokenTransferList::nft(token, vec![NftTransfer::new(alice, bob, 1)])]);
    assert_eq!(fx.run(data.clone(), &[2]).0, Ok(()));
    assert_eq!(fx.run(data, &[2]).0, Err(ResponseCode::PendingNftAirdropAlreadyExists));
}

#[test]
fn test_airdrop_rejections() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let fallback = fx.nft(vec![CustomFee::royalty(
        1,
        2,
        Some(FixedFee {
            amount: 1,
            denominating_token: None,
        }),
        collector,
    )]);
    let token = fx.fungible(vec![]);
    let (alice, bob, carol) = (fx.alice, fx.bob, fx.carol);
    fx.give_nft(alice, fallback, 1);
    fx.fund(alice, token, 100);
    fx.fund(bob, token, 100);

    let (result, _) = fx.run(
        airdrop(vec![TokenTransferList::nft(fallback, vec![NftTransfer::new(alice, carol, 1)])]),
        &[2],
    );
    assert_eq!(result, Err(ResponseCode::TokenAirdropWithFallbackRoyalty));

    let (result, _) = fx.run(airdrop(vec![ft(token, &[(alice, -10), (bob, -10), (carol, 20)])]), &[2, 3]);
    assert_eq!(result, Err(ResponseCode::InvalidAccountAmounts));

    let (result, _) = fx.run(airdrop(vec![ft(token, &[(alice, -200), (carol, 200)])]), &[2]);
    assert_eq!(result, Err(ResponseCode::InsufficientTokenBalance));

    let many: Vec<(AccountId, i64)> = std::iter::once((alice, -11))
        .chain((0..11).map(|n| (AccountId::new(5_000 + n), 1)))
        .collect();
    let (result, _) = fx.run(airdrop(vec![ft(token, &many)]), &[2]);
    assert_eq!(result, Err(ResponseCode::TokenReferenceListSizeLimitExceeded));
}

#[test]
fn test_claim_moves_pending_tokens() {
    let mut fx = Fixture::new();
    let token = fx.fungible(vec![]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.fund(alice, token, 100);
    assert_eq!(fx.run(airdrop(vec![ft(token, &[(alice, -15), (bob, 15)])]), &[2]).0, Ok(()));
    let id = PendingAirdropId::fungible(alice, bob, token);
    let claim = TransactionData::TokenClaimAirdrop(TokenClaimAirdropBody {
        pending_airdrops: vec![id],
    });

    assert_eq!(fx.run(claim.clone(), &[2]).0, Err(ResponseCode::InvalidSignature));
    let (result, effects) = fx.run(claim.clone(), &[3]);
    assert_eq!(result, Ok(()));
    assert_eq!(fx.state.token_balance(bob, token), 15);
    assert_eq!(fx.state.token_balance(alice, token), 85);
    assert!(!fx.state.relation(bob, token).unwrap().automatic);
    assert_eq!(effects.token_adjustment(token, bob), 15);
    assert_eq!(fx.run(claim, &[3]).0, Err(ResponseCode::InvalidPendingAirdropId));
}

#[test]
fn test_cancel_removes_pending_airdrop() {
    let mut fx = Fixture::new();
    let token = fx.nft(vec![]);
    let (alice, bob) = (fx.alice, fx.bob);
    fx.give_nft(alice, token, 1);
    let data = airdrop(vec![TokenTransferList::nft(token, vec![NftTransfer::new(alice, bob, 1)])]);
    assert_eq!(fx.run(data, &[2]).0, Ok(()));
    let id = PendingAirdropId::nft(alice, bob, NftId { token, serial: 1 });
    let cancel = TransactionData::TokenCancelAirdrop(TokenCancelAirdropBody {
        pending_airdrops: vec![id],
    });
    assert_eq!(fx.run(cancel.clone(), &[3]).0, Err(ResponseCode::InvalidSignature));
    assert_eq!(fx.run(cancel, &[2]).0, Ok(()));
    assert_eq!(fx.state.pending_airdrop_count(), 0);
    assert_eq!(fx.state.nft(NftId { token, serial: 1 }).unwrap().owner, alice);
}

#[test_case(vec![], ResponseCode::EmptyPendingAirdropIdList; "empty")]
#[test_case(vec![1, 1], ResponseCode::PendingAirdropIdRepeated; "repeated")]
#[test_case((1..=11).collect(), ResponseCode::PendingAirdropIdListTooLong; "too long")]
fn test_pending_id_list_checks(serials: Vec<u64>, expected: ResponseCode) {
    let mut fx = Fixture::new();
    let (alice, bob) = (fx.alice, fx.bob);
    let ids = serials
        .into_iter()
        .map(|serial| PendingAirdropId::nft(alice, bob, NftId { token: TokenId::new(7), serial }))
        .collect();
    let (result, _) = fx.run(
        TransactionData::TokenClaimAirdrop(TokenClaimAirdropBody { pending_airdrops: ids }),
        &[3],
    );
    assert_eq!(result, Err(expected));
}

// ===========================================================================
// Mint, associate, topic
// ===========================================================================

fn mint(token: TokenId, amount: u64, metadata: Vec<Vec<u8>>) -> TransactionData {
    TransactionData::TokenMint(TokenMintBody {
        token,
        amount,
        metadata,
    })
}

#[test]
fn test_mint_fungible_and_nft() {
    let mut fx = Fixture::new();
    let fungible = fx.fungible(vec![]);
    let nft = fx.nft(vec![]);
    let treasury = fx.treasury;

    let (result, effects) = fx.run(mint(fungible, 500, vec![]), &[1]);
    assert_eq!(result, Ok(()));
    assert_eq!(effects.new_total_supply, Some(1_000_500));
    assert_eq!(fx.state.token_balance(treasury, fungible), 1_000_500);

    let (result, effects) = fx.run(mint(nft, 0, vec![vec![1], vec![2]]), &[1]);
    assert_eq!(result, Ok(()));
    assert_eq!(effects.serial_numbers, vec![4, 5]);
    assert_eq!(fx.state.token_balance(treasury, nft), 5);
}

#[test_case(0, vec![], ResponseCode::InvalidTokenMintMetadata; "nothing to mint")]
#[test_case(0, vec![vec![0]; 11], ResponseCode::BatchSizeLimitExceeded; "batch too large")]
#[test_case(0, vec![vec![0; 101]], ResponseCode::MetadataTooLong; "metadata too long")]
fn test_mint_nft_rejections(amount: u64, metadata: Vec<Vec<u8>>, expected: ResponseCode) {
    let mut fx = Fixture::new();
    let nft = fx.nft(vec![]);
    assert_eq!(fx.run(mint(nft, amount, metadata), &[1]).0, Err(expected));
}

#[test]
fn test_mint_keys_and_supply() {
    let mut fx = Fixture::new();
    let treasury = fx.treasury;
    let keyless = fx
        .state
        .create_token(TokenSpec::fungible("K", treasury, 10))
        .unwrap();
    assert_eq!(fx.run(mint(keyless, 1, vec![]), &[1]).0, Err(ResponseCode::TokenHasNoSupplyKey));

    let capped = fx
        .state
        .create_token(TokenSpec::fungible("C", treasury, 10).with_supply_key(key(1)).with_max_supply(15))
        .unwrap();
    assert_eq!(fx.run(mint(capped, 1, vec![]), &[2]).0, Err(ResponseCode::InvalidSignature));
    assert_eq!(fx.run(mint(capped, 6, vec![]), &[1]).0, Err(ResponseCode::TokenMaxSupplyReached));
    assert_eq!(fx.run(mint(capped, 0, vec![]), &[1]).0, Err(ResponseCode::InvalidTokenMintAmount));
    assert_eq!(fx.run(mint(capped, 5, vec![]), &[1]).0, Ok(()));
}

#[test]
fn test_associate() {
    let mut fx = Fixture::new();
    let first = fx.fungible(vec![]);
    let second = fx.fungible(vec![]);
    let bob = fx.bob;
    let associate = |tokens: Vec<TokenId>| {
        TransactionData::TokenAssociate(TokenAssociateBody { account: bob, tokens })
    };
    assert_eq!(
        fx.run(associate(vec![first, first]), &[3]).0,
        Err(ResponseCode::TokenIdRepeatedInTokenList)
    );
    assert_eq!(fx.run(associate(vec![first, second]), &[2]).0, Err(ResponseCode::InvalidSignature));
    assert_eq!(fx.run(associate(vec![first, second]), &[3]).0, Ok(()));
    assert!(fx.state.relation(bob, second).is_some());
    assert_eq!(
        fx.run(associate(vec![first]), &[3]).0,
        Err(ResponseCode::TokenAlreadyAssociatedToAccount)
    );
}

#[test]
fn test_genesis_distribution() {
    let mut fx = Fixture::new();
    let fungible = fx.fungible(vec![]);
    let nft = fx.nft(vec![]);
    let (treasury, bob) = (fx.treasury, fx.bob);
    assert_eq!(
        fx.state.distribute(fungible, bob, 10),
        Err(ResponseCode::TokenNotAssociatedToAccount)
    );
    fx.state.associate(bob, fungible).unwrap();
    fx.state.associate(bob, nft).unwrap();
    fx.state.distribute(fungible, bob, 10).unwrap();
    fx.state.give_nft(nft, 2, bob).unwrap();
    assert_eq!(fx.state.token_balance(bob, fungible), 10);
    assert_eq!(fx.state.token_balance(treasury, fungible), 999_990);
    assert_eq!(fx.state.nft(NftId { token: nft, serial: 2 }).unwrap().owner, bob);
    assert_eq!(
        fx.state.give_nft(nft, 2, bob),
        Err(ResponseCode::SenderDoesNotOwnNftSerialNo)
    );
}

fn topic(op: ConsensusCreateTopicBody) -> TransactionData {
    TransactionData::ConsensusCreateTopic(op)
}

fn topic_body() -> ConsensusCreateTopicBody {
    ConsensusCreateTopicBody {
        memo: "topic".to_string(),
        admin_key: Some(key(2)),
        submit_key: Some(key(3)),
        auto_renew_period_secs: 7_776_000,
        ..ConsensusCreateTopicBody::default()
    }
}

#[test]
fn test_create_topic() {
    let mut fx = Fixture::new();
    let (result, effects) = fx.run(topic(topic_body()), &[2]);
    assert_eq!(result, Ok(()));
    let id = effects.created_topic.unwrap();
    let created = fx.state.topic(id).unwrap();
    assert_eq!(created.memo, "topic");
    assert_eq!(created.expiration, Timestamp::from_secs(10_000 + 7_776_000));
}

#[test]
fn test_create_topic_rejections() {
    let mut fx = Fixture::new();
    let collector = fx.collector;

    let mut op = topic_body();
    op.memo = "x".repeat(101);
    assert_eq!(fx.run(topic(op), &[2]).0, Err(ResponseCode::MemoTooLong));

    let mut op = topic_body();
    op.memo = "a\0b".to_string();
    assert_eq!(fx.run(topic(op), &[2]).0, Err(ResponseCode::InvalidZeroByteInString));

    let mut op = topic_body();
    op.submit_key = Some(Key::Threshold { threshold: 0, keys: vec![key(3)] });
    assert_eq!(fx.run(topic(op), &[2]).0, Err(ResponseCode::BadEncoding));

    assert_eq!(fx.run(topic(topic_body()), &[3]).0, Err(ResponseCode::InvalidSignature));

    let mut op = topic_body();
    op.auto_renew_period_secs = 1;
    assert_eq!(fx.run(topic(op), &[2]).0, Err(ResponseCode::AutorenewDurationNotInRange));

    let mut op = topic_body();
    op.auto_renew_account = Some(AccountId::new(9_999));
    assert_eq!(fx.run(topic(op), &[2]).0, Err(ResponseCode::InvalidAutorenewAccount));

    let mut op = topic_body();
    op.custom_fees = vec![TopicCustomFee {
        fee: FixedFee { amount: 0, denominating_token: None },
        collector,
    }];
    assert_eq!(fx.run(topic(op), &[2]).0, Err(ResponseCode::CustomFeeMustBePositive));

    let mut op = topic_body();
    op.custom_fees = vec![TopicCustomFee {
        fee: FixedFee { amount: 1, denominating_token: None },
        collector: AccountId::new(9_999),
    }];
    assert_eq!(fx.run(topic(op), &[2]).0, Err(ResponseCode::InvalidCustomFeeCollector));
}

// ===========================================================================
// Calculator view
// ===========================================================================

#[test]
fn test_calculator_view_matches_handler_outcome() {
    let mut fx = Fixture::new();
    let token = fx.fungible(vec![]);
    let (alice, bob, carol) = (fx.alice, fx.bob, fx.carol);
    fx.fund(alice, token, 100);
    let lists = vec![ft(token, &[(alice, -30), (bob, 10), (carol, 20)])];

    let counts = count_transfers(&[], &lists, &fx.state);
    assert_eq!(counts.auto_associations, 1);
    assert_eq!(counts.unassociable_credits, 1);

    let (result, effects) = fx.run(airdrop(lists), &[2]);
    assert_matches!(result, Ok(()));
    assert_eq!(effects.automatic_associations.len() as u64, counts.auto_associations);
    assert_eq!(effects.new_pending_airdrops.len() as u64, counts.unassociable_credits);
}

#[test]
fn test_fixed_fee_denominations_count_as_token_types() {
    let mut fx = Fixture::new();
    let collector = fx.collector;
    let denomination = fx.fungible(vec![]);
    let nft = fx.nft(vec![CustomFee::fixed_hts(2, denomination, collector)]);
    let (treasury, alice, bob) = (fx.treasury, fx.alice, fx.bob);
    fx.give_nft(alice, nft, 1);
    fx.state.associate(bob, nft).unwrap();

    let from_alice = vec![TokenTransferList::nft(nft, vec![NftTransfer::new(alice, bob, 1)])];
    assert_eq!(count_transfers(&[], &from_alice, &fx.state).token_types, 2);

    // The treasury is exempt, so no denominating token moves.
    let from_treasury = vec![TokenTransferList::nft(nft, vec![NftTransfer::new(treasury, bob, 2)])];
    assert_eq!(count_transfers(&[], &from_treasury, &fx.state).token_types, 1);
}
