//! Simple Fees Test Harness
//!
//! An in-process network for end-to-end fee suites:
//!
//! - a [`FeePipeline`] with two nodes and the fee collection account;
//! - deterministic keys and funded accounts;
//! - token setup (fungible and NFT, with custom fees);
//! - transaction builders mirroring the transaction kinds under test;
//! - USD fee expectations derived from the canonical schedule prices, and
//!   the assertions that compare them against what was charged.
//!
//! Expectations are computed from the price constants below rather than
//! through the calculator, so a suite catches a calculator that drifts from
//! the published schedule.

#![allow(clippy::arithmetic_side_effects)]

use {
    log::*,
    simplefees_ledger::{AccountSpec, LedgerState, TokenSpec},
    simplefees_pipeline::{
        FeePipeline, FeeQuote, PipelineConfig, TransactionRecord, DEFAULT_FEE_COLLECTION_ACCOUNT,
    },
    simplefees_schedule::ExchangeRate,
    simplefees_types::{
        AccountAmount, AccountId, AccountRef, ConsensusCreateTopicBody, CryptoTransferBody,
        CustomFee, Key, NftTransfer, PrivateKey, ResponseCode, Timestamp, TokenAirdropBody,
        TokenAssociateBody, TokenCancelAirdropBody, TokenClaimAirdropBody, TokenId,
        TokenMintBody, TokenTransferList, Transaction, TransactionBody, TransactionData,
        TransactionId, PendingAirdropId, TINYBARS_PER_HBAR,
    },
};

// ─── Constants ───────────────────────────────────────────────────────────────

pub const HBAR: u64 = TINYBARS_PER_HBAR;

/// Node every builder submits through unless told otherwise.
pub const NODE: AccountId = AccountId::new(3);
pub const SECOND_NODE: AccountId = AccountId::new(4);
pub const FEE_COLLECTOR: AccountId = DEFAULT_FEE_COLLECTION_ACCOUNT;

pub const NODE_BALANCE: u64 = 100 * HBAR;
pub const GENESIS_TIME: i64 = 1_700_000_000;
pub const DEFAULT_FEE_LIMIT: u64 = 5 * HBAR;
pub const DEFAULT_VALID_DURATION_SECS: u64 = 120;

// ─── Canonical schedule prices (USD) ─────────────────────────────────────────

pub const NODE_BASE_FEE_USD: f64 = 0.0001;
pub const NETWORK_MULTIPLIER: f64 = 9.0;
pub const NODE_INCLUDED_SIGNATURES: u64 = 1;
pub const NODE_INCLUDED_BYTES: u64 = 1024;

pub const SIGNATURE_FEE_USD: f64 = 0.0001;
pub const PROCESSING_BYTES_FEE_USD: f64 = 0.000_001;
pub const KEYS_FEE_USD: f64 = 0.01;
pub const ACCOUNTS_FEE_USD: f64 = 0.0001;
pub const TOKEN_TYPES_FEE_USD: f64 = 0.001;
pub const NFT_SERIALS_FEE_USD: f64 = 0.02;
pub const HOOK_EXECUTION_FEE_USD: f64 = 0.005;
pub const GAS_FEE_USD: f64 = 0.000_000_085_2;
pub const AIRDROPS_FEE_USD: f64 = 0.05;
pub const AUTO_ASSOCIATION_FEE_USD: f64 = 0.05;
pub const ACCOUNT_CREATION_FEE_USD: f64 = 0.05;

pub const CRYPTO_TRANSFER_BASE_FEE_USD: f64 = 0.0;
pub const TOKEN_TRANSFER_BASE_FEE_USD: f64 = 0.0009;
pub const TOKEN_TRANSFER_WITH_CUSTOM_FEES_BASE_FEE_USD: f64 = 0.0019;
pub const TRANSFER_INCLUDED_ACCOUNTS: u64 = 2;
pub const TRANSFER_INCLUDED_TOKEN_TYPES: u64 = 1;
pub const TOKEN_MINT_BASE_FEE_USD: f64 = 0.0009;
pub const TOKEN_MINT_NFT_BASE_FEE_USD: f64 = 0.019;
pub const TOPIC_CREATE_BASE_FEE_USD: f64 = 0.0099;
pub const TOPIC_CREATE_INCLUDED_KEYS: u64 = 1;
pub const TOPIC_CREATE_WITH_CUSTOM_FEES_BASE_FEE_USD: f64 = 0.199;
pub const TOKEN_ASSOCIATE_BASE_FEE_USD: f64 = 0.0499;
pub const PENDING_AIRDROP_BASE_FEE_USD: f64 = 0.0009;

// ─── Expected fees ───────────────────────────────────────────────────────────

fn overage_usd(count: u64, included: u64, price: f64) -> f64 {
    count.saturating_sub(included) as f64 * price
}

/// Node fee for a transaction of at most [`NODE_INCLUDED_BYTES`].
pub fn node_fee_usd(signatures: u64) -> f64 {
    NODE_BASE_FEE_USD + overage_usd(signatures, NODE_INCLUDED_SIGNATURES, SIGNATURE_FEE_USD)
}

/// What a submitting node pays on a due-diligence failure.
pub fn network_fee_usd(signatures: u64) -> f64 {
    node_fee_usd(signatures) * NETWORK_MULTIPLIER
}

/// What a payer pays when the service portion is waived.
pub fn node_and_network_fee_usd(signatures: u64) -> f64 {
    node_fee_usd(signatures) * (1.0 + NETWORK_MULTIPLIER)
}

/// Adds the node and network charge for bytes above the node allotment to
/// an expectation computed for a small transaction.
pub fn with_byte_overage_usd(expected: f64, transaction_bytes: u64) -> f64 {
    expected
        + overage_usd(transaction_bytes, NODE_INCLUDED_BYTES, PROCESSING_BYTES_FEE_USD)
            * (1.0 + NETWORK_MULTIPLIER)
}

/// Billable dimensions of a transfer, as the fee suites state them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransferExtras {
    pub signatures: u64,
    pub accounts: u64,
    pub token_types: u64,
    pub hook_executions: u64,
    pub gas: u64,
    pub created_accounts: u64,
    pub auto_associations: u64,
    pub with_custom_fees: bool,
}

impl TransferExtras {
    pub fn new(signatures: u64, accounts: u64, token_types: u64) -> Self {
        Self {
            signatures,
            accounts,
            token_types,
            ..Self::default()
        }
    }

    fn service_usd(&self) -> f64 {
        let base = if self.with_custom_fees {
            TOKEN_TRANSFER_WITH_CUSTOM_FEES_BASE_FEE_USD
        } else if self.token_types > 0 {
            TOKEN_TRANSFER_BASE_FEE_USD
        } else {
            CRYPTO_TRANSFER_BASE_FEE_USD
        };
        let token_types = if self.token_types > 0 {
            overage_usd(self.token_types, TRANSFER_INCLUDED_TOKEN_TYPES, TOKEN_TYPES_FEE_USD)
        } else {
            0.0
        };
        base + overage_usd(self.accounts, TRANSFER_INCLUDED_ACCOUNTS, ACCOUNTS_FEE_USD)
            + token_types
            + self.hook_executions as f64 * HOOK_EXECUTION_FEE_USD
            + self.gas as f64 * GAS_FEE_USD
            + self.created_accounts as f64 * ACCOUNT_CREATION_FEE_USD
            + self.auto_associations as f64 * AUTO_ASSOCIATION_FEE_USD
    }
}

pub fn expected_crypto_transfer_usd(extras: &TransferExtras) -> f64 {
    node_and_network_fee_usd(extras.signatures) + extras.service_usd()
}

/// An airdrop pays the transfer of its immediate part plus one
/// `AIRDROPS` unit per pending credit.
pub fn expected_token_airdrop_usd(extras: &TransferExtras, pending_airdrops: u64) -> f64 {
    expected_crypto_transfer_usd(extras) + pending_airdrops as f64 * AIRDROPS_FEE_USD
}

pub fn expected_token_mint_usd(signatures: u64, nft_serials: u64) -> f64 {
    let nft = if nft_serials > 0 {
        TOKEN_MINT_NFT_BASE_FEE_USD + overage_usd(nft_serials, 1, NFT_SERIALS_FEE_USD)
    } else {
        0.0
    };
    node_and_network_fee_usd(signatures) + TOKEN_MINT_BASE_FEE_USD + nft
}

pub fn expected_topic_create_usd(signatures: u64, keys: u64, with_custom_fees: bool) -> f64 {
    let custom = if with_custom_fees {
        TOPIC_CREATE_WITH_CUSTOM_FEES_BASE_FEE_USD
    } else {
        0.0
    };
    node_and_network_fee_usd(signatures)
        + TOPIC_CREATE_BASE_FEE_USD
        + overage_usd(keys, TOPIC_CREATE_INCLUDED_KEYS, KEYS_FEE_USD)
        + custom
}

pub fn expected_token_associate_usd(signatures: u64, token_types: u64) -> f64 {
    node_and_network_fee_usd(signatures)
        + TOKEN_ASSOCIATE_BASE_FEE_USD
        + overage_usd(token_types, 1, TOKEN_TYPES_FEE_USD)
}

pub fn expected_claim_or_cancel_usd(signatures: u64) -> f64 {
    node_and_network_fee_usd(signatures) + PENDING_AIRDROP_BASE_FEE_USD
}

// ─── Fee assertions ──────────────────────────────────────────────────────────

fn percent_difference(actual: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        return if actual == 0.0 { 0.0 } else { f64::INFINITY };
    }
    ((actual - expected) / expected).abs() * 100.0
}

/// Asserts the fee recorded for `record`, in USD at the record's rate, is
/// within `allowed_percent_difference` of `expected_usd`.
pub fn validate_charged_usd_within(
    record: &TransactionRecord,
    expected_usd: f64,
    allowed_percent_difference: f64,
) {
    let actual = record.charged_usd();
    let difference = percent_difference(actual, expected_usd);
    debug!(
        "{}: charged ${actual:.10}, expected ${expected_usd:.10} ({difference:.6}% off)",
        record.transaction_id
    );
    assert!(
        difference <= allowed_percent_difference,
        "{}: charged ${actual:.10} ({} tinybars), expected ${expected_usd:.10} within {allowed_percent_difference}%, \
         off by {difference:.6}% ({:?})",
        record.transaction_id,
        record.transaction_fee,
        record.status,
    );
}

/// Asserts a balance drop, converted to USD at `rate`, matches
/// `expected_usd`. The tolerance never goes below one percent, since a
/// balance delta can include value moved by the transaction itself.
pub fn validate_charged_fee_to_usd(
    initial_balance: u64,
    after_balance: u64,
    rate: &ExchangeRate,
    expected_usd: f64,
    allowed_percent_difference: f64,
) {
    let effective = allowed_percent_difference.max(1.0);
    let delta = initial_balance.saturating_sub(after_balance);
    let actual = rate.tinybars_to_usd(delta);
    let difference = percent_difference(actual, expected_usd);
    debug!("balance {initial_balance} -> {after_balance}: ${actual:.10} vs ${expected_usd:.10}");
    assert!(
        difference <= effective,
        "balance dropped by {delta} tinybars (${actual:.10}), expected ${expected_usd:.10} within {effective}%",
    );
}

// ─── Accounts and keys ───────────────────────────────────────────────────────

/// A funded account and the key that signs for it.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub id: AccountId,
    pub key: PrivateKey,
}

impl TestAccount {
    pub fn public_key(&self) -> Key {
        public_key(&self.key)
    }
}

impl From<&TestAccount> for AccountRef {
    fn from(account: &TestAccount) -> Self {
        AccountRef::Id(account.id)
    }
}

pub fn public_key(key: &PrivateKey) -> Key {
    key.public_key()
        .unwrap_or_else(|err| panic!("unusable test key {key:?}: {err}"))
}

// ─── Transfer list builders ──────────────────────────────────────────────────

pub fn moving_hbar(amount: u64, from: AccountId, to: impl Into<AccountRef>) -> Vec<AccountAmount> {
    let amount = amount as i64;
    vec![AccountAmount::new(from, -amount), AccountAmount::new(to, amount)]
}

pub fn moving(token: TokenId, amount: u64, from: AccountId, to: impl Into<AccountRef>) -> TokenTransferList {
    TokenTransferList::fungible(token, moving_hbar(amount, from, to))
}

/// One sender spreading `amount` to each receiver.
pub fn distributing(token: TokenId, amount: u64, from: AccountId, to: &[AccountId]) -> TokenTransferList {
    let mut transfers = vec![AccountAmount::new(from, -((amount as i64) * to.len() as i64))];
    transfers.extend(to.iter().map(|receiver| AccountAmount::new(*receiver, amount as i64)));
    TokenTransferList::fungible(token, transfers)
}

pub fn moving_unique(token: TokenId, serials: &[u64], from: AccountId, to: impl Into<AccountRef>) -> TokenTransferList {
    let to = to.into();
    TokenTransferList::nft(
        token,
        serials
            .iter()
            .map(|serial| NftTransfer::new(from, to.clone(), *serial))
            .collect(),
    )
}

// ─── Transaction builder ─────────────────────────────────────────────────────

/// A transaction under construction. Signed by the payer unless
/// [`signed_by`](Self::signed_by) says otherwise.
#[derive(Debug, Clone)]
pub struct TxnBuilder {
    body: TransactionBody,
    signers: Vec<PrivateKey>,
}

impl TxnBuilder {
    pub fn fee(mut self, max_transaction_fee: u64) -> Self {
        self.body.max_transaction_fee = max_transaction_fee;
        self
    }

    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.body.memo = memo.into();
        self
    }

    pub fn node(mut self, node: AccountId) -> Self {
        self.body.node_account = node;
        self
    }

    pub fn valid_start(mut self, valid_start: Timestamp) -> Self {
        self.body.transaction_id.valid_start = valid_start;
        self
    }

    pub fn valid_duration(mut self, secs: u64) -> Self {
        self.body.valid_duration_secs = secs;
        self
    }

    pub fn payer(mut self, payer: &TestAccount) -> Self {
        self.body.transaction_id.payer = payer.id;
        self
    }

    pub fn signed_by(mut self, keys: &[&PrivateKey]) -> Self {
        self.signers = keys.iter().map(|key| (*key).clone()).collect();
        self
    }

    pub fn body(&self) -> &TransactionBody {
        &self.body
    }

    pub fn build(self) -> Transaction {
        let keys: Vec<&PrivateKey> = self.signers.iter().collect();
        Transaction::signed(self.body, &keys)
            .unwrap_or_else(|err| panic!("failed to sign test transaction: {err}"))
    }
}

// ─── Test network ────────────────────────────────────────────────────────────

/// A pipeline seeded with nodes, the collector and helpers to populate it.
pub struct SimpleFeesTestNetwork {
    pub pipeline: FeePipeline,
    next_key: u64,
    next_nanos: u32,
}

impl Default for SimpleFeesTestNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleFeesTestNetwork {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// A network whose configuration has the given dotted keys set.
    pub fn with_overrides(overrides: &[(&str, &str)]) -> Self {
        let mut config = PipelineConfig::default();
        for (key, value) in overrides {
            config
                .apply_override(key, value)
                .unwrap_or_else(|err| panic!("bad override {key}={value}: {err}"));
        }
        Self::with_config(config)
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let mut next_key = 0;
        let mut state = LedgerState::new();
        for (id, balance) in [(NODE, NODE_BALANCE), (SECOND_NODE, NODE_BALANCE), (FEE_COLLECTOR, 0)] {
            let key = ed25519_key(&mut next_key);
            state
                .create_account_with_id(id, AccountSpec::new(public_key(&key)).with_balance(balance))
                .unwrap_or_else(|code| panic!("genesis account {id}: {code}"));
        }

        let mut pipeline = FeePipeline::new(config, state)
            .unwrap_or_else(|err| panic!("failed to start pipeline: {err}"));
        for node in [NODE, SECOND_NODE] {
            pipeline
                .add_node(node)
                .unwrap_or_else(|err| panic!("failed to add node {node}: {err}"));
        }
        pipeline.set_time(Timestamp::from_secs(GENESIS_TIME));
        Self {
            pipeline,
            next_key,
            next_nanos: 0,
        }
    }

    // --- keys and accounts ---

    pub fn new_key(&mut self) -> PrivateKey {
        ed25519_key(&mut self.next_key)
    }

    pub fn new_ecdsa_key(&mut self) -> PrivateKey {
        self.next_key += 1;
        PrivateKey::ecdsa_from_seed(seed(self.next_key))
            .unwrap_or_else(|err| panic!("bad ECDSA seed {}: {err}", self.next_key))
    }

    pub fn create_account(&mut self, balance: u64) -> TestAccount {
        self.create_account_with(balance, |spec| spec)
    }

    /// Creates an account, letting `customize` set slots, hooks or aliases.
    pub fn create_account_with(
        &mut self,
        balance: u64,
        customize: impl FnOnce(AccountSpec) -> AccountSpec,
    ) -> TestAccount {
        let key = self.new_key();
        self.create_account_for_key(key, balance, customize)
    }

    /// An account keyed with secp256k1 instead of ed25519.
    pub fn create_ecdsa_account(&mut self, balance: u64) -> TestAccount {
        let key = self.new_ecdsa_key();
        self.create_account_for_key(key, balance, |spec| spec)
    }

    fn create_account_for_key(
        &mut self,
        key: PrivateKey,
        balance: u64,
        customize: impl FnOnce(AccountSpec) -> AccountSpec,
    ) -> TestAccount {
        let spec = customize(AccountSpec::new(public_key(&key)).with_balance(balance));
        let id = self
            .pipeline
            .state_mut()
            .create_account(spec)
            .unwrap_or_else(|code| panic!("failed to create account: {code}"));
        TestAccount { id, key }
    }

    // --- tokens ---

    /// A fungible token whose supply key is the treasury's key.
    pub fn create_fungible_token(
        &mut self,
        treasury: &TestAccount,
        initial_supply: u64,
        custom_fees: Vec<CustomFee>,
    ) -> TokenId {
        let spec = custom_fees.into_iter().fold(
            TokenSpec::fungible("FT", treasury.id, initial_supply).with_supply_key(treasury.public_key()),
            TokenSpec::with_custom_fee,
        );
        self.create_token(spec)
    }

    /// An NFT with `serials` serials minted to the treasury, whose key is
    /// the supply key.
    pub fn create_nft(&mut self, treasury: &TestAccount, serials: u64, custom_fees: Vec<CustomFee>) -> TokenId {
        let spec = custom_fees.into_iter().fold(
            TokenSpec::non_fungible("NFT", treasury.id, treasury.public_key()),
            TokenSpec::with_custom_fee,
        );
        let token = self.create_token(spec);
        if serials > 0 {
            let metadata = (1..=serials).map(|serial| serial.to_le_bytes().to_vec()).collect();
            self.pipeline
                .state_mut()
                .mint_nfts(token, metadata)
                .unwrap_or_else(|code| panic!("failed to mint {token}: {code}"));
        }
        token
    }

    pub fn create_token(&mut self, spec: TokenSpec) -> TokenId {
        self.pipeline
            .state_mut()
            .create_token(spec)
            .unwrap_or_else(|code| panic!("failed to create token: {code}"))
    }

    pub fn associate(&mut self, account: AccountId, tokens: &[TokenId]) {
        for token in tokens {
            self.pipeline
                .state_mut()
                .associate(account, *token)
                .unwrap_or_else(|code| panic!("failed to associate {account} with {token}: {code}"));
        }
    }

    /// Associates `account` if needed and moves `amount` from the treasury.
    pub fn fund_tokens(&mut self, token: TokenId, account: AccountId, amount: u64) {
        if self.pipeline.relation(account, token).is_none() {
            self.associate(account, &[token]);
        }
        self.pipeline
            .state_mut()
            .distribute(token, account, amount)
            .unwrap_or_else(|code| panic!("failed to fund {account} with {token}: {code}"));
    }

    /// Associates `account` if needed and hands it serials from the treasury.
    pub fn fund_nfts(&mut self, token: TokenId, account: AccountId, serials: &[u64]) {
        if self.pipeline.relation(account, token).is_none() {
            self.associate(account, &[token]);
        }
        for serial in serials {
            self.pipeline
                .state_mut()
                .give_nft(token, *serial, account)
                .unwrap_or_else(|code| panic!("failed to give {token}#{serial} to {account}: {code}"));
        }
    }

    // --- transactions ---

    /// A transaction paid by `payer`, valid from one second before now.
    /// Each call gets a distinct id.
    pub fn transaction(&mut self, payer: &TestAccount, data: TransactionData) -> TxnBuilder {
        self.next_nanos += 1;
        let now = self.pipeline.now();
        TxnBuilder {
            body: TransactionBody {
                transaction_id: TransactionId {
                    payer: payer.id,
                    valid_start: Timestamp {
                        seconds: now.seconds - 1,
                        nanos: self.next_nanos,
                    },
                },
                node_account: NODE,
                max_transaction_fee: DEFAULT_FEE_LIMIT,
                valid_duration_secs: DEFAULT_VALID_DURATION_SECS,
                memo: String::new(),
                data,
            },
            signers: vec![payer.key.clone()],
        }
    }

    pub fn crypto_transfer(
        &mut self,
        payer: &TestAccount,
        hbar_transfers: Vec<AccountAmount>,
        token_transfers: Vec<TokenTransferList>,
    ) -> TxnBuilder {
        self.transaction(
            payer,
            TransactionData::CryptoTransfer(CryptoTransferBody {
                hbar_transfers,
                token_transfers,
            }),
        )
    }

    pub fn token_airdrop(&mut self, payer: &TestAccount, token_transfers: Vec<TokenTransferList>) -> TxnBuilder {
        self.transaction(payer, TransactionData::TokenAirdrop(TokenAirdropBody { token_transfers }))
    }

    pub fn mint_token(&mut self, payer: &TestAccount, token: TokenId, amount: u64, metadata: Vec<Vec<u8>>) -> TxnBuilder {
        self.transaction(
            payer,
            TransactionData::TokenMint(TokenMintBody {
                token,
                amount,
                metadata,
            }),
        )
    }

    pub fn create_topic(&mut self, payer: &TestAccount, topic: ConsensusCreateTopicBody) -> TxnBuilder {
        self.transaction(payer, TransactionData::ConsensusCreateTopic(topic))
    }

    pub fn token_associate(&mut self, payer: &TestAccount, account: AccountId, tokens: Vec<TokenId>) -> TxnBuilder {
        self.transaction(
            payer,
            TransactionData::TokenAssociate(TokenAssociateBody { account, tokens }),
        )
    }

    pub fn token_claim_airdrop(&mut self, payer: &TestAccount, pending_airdrops: Vec<PendingAirdropId>) -> TxnBuilder {
        self.transaction(
            payer,
            TransactionData::TokenClaimAirdrop(TokenClaimAirdropBody { pending_airdrops }),
        )
    }

    pub fn token_cancel_airdrop(&mut self, payer: &TestAccount, pending_airdrops: Vec<PendingAirdropId>) -> TxnBuilder {
        self.transaction(
            payer,
            TransactionData::TokenCancelAirdrop(TokenCancelAirdropBody { pending_airdrops }),
        )
    }

    // --- submission ---

    pub fn submit(&mut self, txn: &Transaction) -> Result<FeeQuote, ResponseCode> {
        let node = txn.body.node_account;
        self.pipeline.submit(txn, node)
    }

    /// Pre-handle and handle only, as when a node forwards a transaction
    /// that never went through this node's ingest.
    pub fn handle(&mut self, txn: &Transaction) -> TransactionRecord {
        let node = txn.body.node_account;
        self.pipeline.handle(txn, node)
    }

    /// Ingest then handle; panics when ingest rejects.
    pub fn execute(&mut self, txn: &Transaction) -> TransactionRecord {
        let node = txn.body.node_account;
        self.pipeline
            .submit_and_handle(txn, node)
            .unwrap_or_else(|code| panic!("{} rejected at ingest: {code}", txn.body.transaction_id))
    }

    /// Like [`execute`](Self::execute), asserting success.
    pub fn execute_ok(&mut self, txn: &Transaction) -> TransactionRecord {
        let record = self.execute(txn);
        assert_eq!(
            record.status,
            ResponseCode::Success,
            "{} failed: {record:?}",
            txn.body.transaction_id
        );
        record
    }

    // --- queries ---

    pub fn balance(&self, account: AccountId) -> u64 {
        self.pipeline.balance(account)
    }

    pub fn token_balance(&self, account: AccountId, token: TokenId) -> u64 {
        self.pipeline.token_balance(account, token)
    }

    pub fn rate(&self) -> ExchangeRate {
        *self.pipeline.exchange_rates().active(self.pipeline.now())
    }

    pub fn total_hbar(&self) -> u128 {
        self.pipeline.state().total_hbar()
    }
}

fn seed(n: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    seed[..8].copy_from_slice(&n.to_le_bytes());
    seed[31] = 1;
    seed
}

fn ed25519_key(counter: &mut u64) -> PrivateKey {
    *counter += 1;
    PrivateKey::ed25519_from_seed(seed(*counter))
}
