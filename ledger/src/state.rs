//! In-memory ledger: accounts, tokens, relations, NFTs, pending airdrops
//! and topics.

use {
    crate::{
        account::{Account, AccountSpec, UNLIMITED_AUTO_ASSOCIATIONS},
        custom_fees,
        token::{Nft, PendingAirdrop, Token, TokenRelation, TokenSpec, TokenType},
        topic::Topic,
    },
    log::*,
    serde::{Deserialize, Serialize},
    simplefees_calculator::CalculatorState,
    simplefees_types::{
        key::is_evm_address, AccountId, AccountRef, CustomFeeKind, Key, NftId, PendingAirdropId,
        ResponseCode, TokenId, TopicId,
    },
    std::collections::BTreeMap,
};

/// First number handed out to entities created after genesis.
pub const FIRST_USER_ENTITY_NUM: u64 = 1001;

pub type Result<T> = std::result::Result<T, ResponseCode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    accounts: BTreeMap<AccountId, Account>,
    aliases: BTreeMap<Vec<u8>, AccountId>,
    tokens: BTreeMap<TokenId, Token>,
    relations: BTreeMap<(AccountId, TokenId), TokenRelation>,
    nfts: BTreeMap<NftId, Nft>,
    pending_airdrops: BTreeMap<PendingAirdropId, PendingAirdrop>,
    topics: BTreeMap<TopicId, Topic>,
    next_entity_num: u64,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            aliases: BTreeMap::new(),
            tokens: BTreeMap::new(),
            relations: BTreeMap::new(),
            nfts: BTreeMap::new(),
            pending_airdrops: BTreeMap::new(),
            topics: BTreeMap::new(),
            next_entity_num: FIRST_USER_ENTITY_NUM,
        }
    }

    // ---------------------------------------------------------------------
    // Setup
    // ---------------------------------------------------------------------

    /// Creates an account with the next free entity number.
    pub fn create_account(&mut self, spec: AccountSpec) -> Result<AccountId> {
        let id = AccountId::new(self.next_entity_num);
        self.create_account_with_id(id, spec)?;
        Ok(id)
    }

    /// Creates an account at a fixed id, e.g. a node or system account.
    pub fn create_account_with_id(&mut self, id: AccountId, spec: AccountSpec) -> Result<()> {
        if self.accounts.contains_key(&id) {
            return Err(ResponseCode::InvalidAccountId);
        }
        if let Some(key) = &spec.key {
            if !key.is_valid() {
                return Err(ResponseCode::BadEncoding);
            }
        }
        if let Some(alias) = &spec.alias {
            if self.aliases.contains_key(alias) {
                return Err(ResponseCode::InvalidAliasKey);
            }
            self.aliases.insert(alias.clone(), id);
        }
        self.accounts.insert(id, spec.into_account());
        self.bump_entity_num(id.num);
        debug!("created account {id}");
        Ok(())
    }

    /// Creates a token. The treasury is associated and receives the
    /// initial supply; collectors of fees denominated in the new token are
    /// associated too.
    pub fn create_token(&mut self, spec: TokenSpec) -> Result<TokenId> {
        if !self.accounts.contains_key(&spec.treasury) {
            return Err(ResponseCode::InvalidAccountId);
        }
        if spec.token_type == TokenType::NonFungibleUnique && spec.initial_supply != 0 {
            return Err(ResponseCode::InvalidTokenMintAmount);
        }
        let id = TokenId::new(self.next_entity_num);
        for fee in &spec.custom_fees {
            if !self.accounts.contains_key(&fee.collector) {
                return Err(ResponseCode::InvalidCustomFeeCollector);
            }
            match fee.denominating_token(id) {
                Some(token) if token != id && !self.tokens.contains_key(&token) => {
                    return Err(ResponseCode::InvalidTokenIdInCustomFees);
                }
                _ => {}
            }
        }
        let treasury = spec.treasury;
        let initial_supply = spec.initial_supply;
        let self_denominated: Vec<AccountId> = spec
            .custom_fees
            .iter()
            .filter(|fee| fee.denominating_token(id) == Some(id))
            .map(|fee| fee.collector)
            .collect();

        self.tokens.insert(id, spec.into_token());
        self.bump_entity_num(id.num);
        self.relations.insert(
            (treasury, id),
            TokenRelation {
                balance: initial_supply,
                ..TokenRelation::default()
            },
        );
        for collector in self_denominated {
            self.relations.entry((collector, id)).or_default();
        }
        debug!("created token {id} with treasury {treasury}");
        Ok(id)
    }

    /// Explicit association.
    pub fn associate(&mut self, account: AccountId, token: TokenId) -> Result<()> {
        if !self.accounts.contains_key(&account) {
            return Err(ResponseCode::InvalidAccountId);
        }
        if !self.tokens.contains_key(&token) {
            return Err(ResponseCode::InvalidTokenId);
        }
        if self.relations.contains_key(&(account, token)) {
            return Err(ResponseCode::TokenAlreadyAssociatedToAccount);
        }
        self.relations.insert((account, token), TokenRelation::default());
        Ok(())
    }

    pub fn set_frozen(&mut self, account: AccountId, token: TokenId, frozen: bool) -> Result<()> {
        let relation = self
            .relations
            .get_mut(&(account, token))
            .ok_or(ResponseCode::TokenNotAssociatedToAccount)?;
        relation.frozen = frozen;
        Ok(())
    }

    pub fn set_paused(&mut self, token: TokenId, paused: bool) -> Result<()> {
        let token = self.tokens.get_mut(&token).ok_or(ResponseCode::InvalidTokenId)?;
        token.paused = paused;
        Ok(())
    }

    /// Mints serials to the treasury and returns them.
    pub fn mint_nfts(&mut self, token: TokenId, metadata: Vec<Vec<u8>>) -> Result<Vec<u64>> {
        self.mint(token, 0, metadata)
    }

    /// Moves fungible units from the treasury to an associated account.
    pub fn distribute(&mut self, token: TokenId, to: AccountId, amount: u64) -> Result<()> {
        let treasury = self.tokens.get(&token).ok_or(ResponseCode::InvalidTokenId)?.treasury;
        if !self.relations.contains_key(&(to, token)) {
            return Err(ResponseCode::TokenNotAssociatedToAccount);
        }
        let delta = i64::try_from(amount).map_err(|_| ResponseCode::InvalidAccountAmounts)?;
        self.adjust_token(treasury, token, delta.saturating_neg())?;
        self.adjust_token(to, token, delta)
    }

    /// Moves one serial from the treasury to an associated account.
    pub fn give_nft(&mut self, token: TokenId, serial: u64, to: AccountId) -> Result<()> {
        let treasury = self.tokens.get(&token).ok_or(ResponseCode::InvalidTokenId)?.treasury;
        if !self.relations.contains_key(&(to, token)) {
            return Err(ResponseCode::TokenNotAssociatedToAccount);
        }
        self.move_nft(NftId { token, serial }, treasury, to)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Account)> {
        self.accounts.iter()
    }

    pub fn account_by_alias(&self, alias: &[u8]) -> Option<AccountId> {
        self.aliases.get(alias).copied()
    }

    /// Tinybar balance; zero for unknown accounts.
    pub fn balance(&self, id: AccountId) -> u64 {
        self.accounts.get(&id).map_or(0, |account| account.balance)
    }

    /// Sum of every HBAR balance.
    pub fn total_hbar(&self) -> u128 {
        self.accounts
            .values()
            .map(|account| u128::from(account.balance))
            .fold(0u128, u128::saturating_add)
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(&id)
    }

    pub fn relation(&self, account: AccountId, token: TokenId) -> Option<&TokenRelation> {
        self.relations.get(&(account, token))
    }

    /// Fungible units or NFT count held; zero when not associated.
    pub fn token_balance(&self, account: AccountId, token: TokenId) -> u64 {
        self.relation(account, token).map_or(0, |relation| relation.balance)
    }

    pub fn nft(&self, id: NftId) -> Option<&Nft> {
        self.nfts.get(&id)
    }

    pub fn pending_airdrop(&self, id: &PendingAirdropId) -> Option<&PendingAirdrop> {
        self.pending_airdrops.get(id)
    }

    pub fn pending_airdrops(&self) -> impl Iterator<Item = (&PendingAirdropId, &PendingAirdrop)> {
        self.pending_airdrops.iter()
    }

    pub fn pending_airdrop_count(&self) -> usize {
        self.pending_airdrops.len()
    }

    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.topics.get(&id)
    }

    /// Resolves an id (which must exist) or an alias.
    pub fn resolve(&self, account: &AccountRef) -> Option<AccountId> {
        match account {
            AccountRef::Id(id) => self.accounts.contains_key(id).then_some(*id),
            AccountRef::Alias(alias) => self.aliases.get(alias).copied(),
        }
    }

    // ---------------------------------------------------------------------
    // Mutations used by the pipeline and handlers
    // ---------------------------------------------------------------------

    /// Applies every HBAR delta or none of them.
    pub fn apply_hbar_adjustments(&mut self, adjustments: &BTreeMap<AccountId, i64>) -> Result<()> {
        for (account, delta) in adjustments {
            let entry = self.accounts.get(account).ok_or(ResponseCode::InvalidAccountId)?;
            apply_delta(entry.balance, *delta, ResponseCode::InsufficientAccountBalance)?;
        }
        for (account, delta) in adjustments {
            self.adjust_hbar(*account, *delta)?;
        }
        Ok(())
    }

    pub(crate) fn adjust_hbar(&mut self, account: AccountId, delta: i64) -> Result<()> {
        let entry = self
            .accounts
            .get_mut(&account)
            .ok_or(ResponseCode::InvalidAccountId)?;
        entry.balance = apply_delta(entry.balance, delta, ResponseCode::InsufficientAccountBalance)?;
        Ok(())
    }

    pub(crate) fn adjust_token(&mut self, account: AccountId, token: TokenId, delta: i64) -> Result<()> {
        let relation = self
            .relations
            .get_mut(&(account, token))
            .ok_or(ResponseCode::TokenNotAssociatedToAccount)?;
        relation.balance = apply_delta(relation.balance, delta, ResponseCode::InsufficientTokenBalance)?;
        Ok(())
    }

    /// Moves one serial and the owners' NFT counts.
    pub(crate) fn move_nft(&mut self, nft: NftId, from: AccountId, to: AccountId) -> Result<()> {
        let entry = self.nfts.get_mut(&nft).ok_or(ResponseCode::InvalidNftId)?;
        if entry.owner != from {
            return Err(ResponseCode::SenderDoesNotOwnNftSerialNo);
        }
        entry.owner = to;
        self.adjust_token(from, nft.token, -1)?;
        self.adjust_token(to, nft.token, 1)
    }

    /// Makes sure `account` can receive `token`, consuming a free
    /// automatic association slot when needed. Returns whether an
    /// automatic association was created.
    pub(crate) fn ensure_receiver_association(
        &mut self,
        account: AccountId,
        token: TokenId,
    ) -> Result<bool> {
        if let Some(relation) = self.relations.get(&(account, token)) {
            if relation.frozen {
                return Err(ResponseCode::AccountFrozenForToken);
            }
            return Ok(false);
        }
        let entry = self
            .accounts
            .get_mut(&account)
            .ok_or(ResponseCode::InvalidAccountId)?;
        if entry.free_auto_association_slots() == Some(0) {
            return Err(if entry.max_automatic_associations == 0 {
                ResponseCode::TokenNotAssociatedToAccount
            } else {
                ResponseCode::NoRemainingAutomaticAssociations
            });
        }
        entry.used_automatic_associations = entry.used_automatic_associations.saturating_add(1);
        self.relations.insert(
            (account, token),
            TokenRelation {
                automatic: true,
                ..TokenRelation::default()
            },
        );
        trace!("auto-associated {account} with {token}");
        Ok(true)
    }

    /// Creates the account an unknown alias stands for.
    pub(crate) fn create_from_alias(&mut self, alias: &[u8]) -> Result<AccountId> {
        let spec = if let Some(key) = Key::from_alias(alias) {
            AccountSpec::new(key)
                .with_alias(alias.to_vec())
                .with_max_automatic_associations(UNLIMITED_AUTO_ASSOCIATIONS)
        } else if is_evm_address(alias) {
            AccountSpec::hollow(alias.to_vec())
        } else {
            return Err(ResponseCode::InvalidAliasKey);
        };
        self.create_account(spec)
    }

    /// Mints fungible units or NFT serials into the treasury.
    pub(crate) fn mint(&mut self, token_id: TokenId, amount: u64, metadata: Vec<Vec<u8>>) -> Result<Vec<u64>> {
        let token = self.tokens.get_mut(&token_id).ok_or(ResponseCode::InvalidTokenId)?;
        let units = if token.is_fungible() {
            amount
        } else {
            metadata.len() as u64
        };
        let new_supply = token
            .total_supply
            .checked_add(units)
            .ok_or(ResponseCode::TokenMaxSupplyReached)?;
        if token.max_supply != 0 && new_supply > token.max_supply {
            return Err(ResponseCode::TokenMaxSupplyReached);
        }
        token.total_supply = new_supply;
        let treasury = token.treasury;

        let mut serials = Vec::with_capacity(metadata.len());
        if !token.is_fungible() {
            for data in metadata {
                token.last_serial = token.last_serial.saturating_add(1);
                let serial = token.last_serial;
                self.nfts.insert(
                    NftId {
                        token: token_id,
                        serial,
                    },
                    Nft {
                        owner: treasury,
                        metadata: data,
                    },
                );
                serials.push(serial);
            }
        }
        let relation = self.relations.entry((treasury, token_id)).or_default();
        relation.balance = relation.balance.saturating_add(units);
        Ok(serials)
    }

    pub(crate) fn add_pending_airdrop(&mut self, id: PendingAirdropId, amount: Option<u64>) -> Result<()> {
        match (self.pending_airdrops.get_mut(&id), amount) {
            (Some(existing), Some(more)) => {
                let total = existing.amount.unwrap_or(0);
                existing.amount = Some(total.saturating_add(more));
            }
            (Some(_), None) => return Err(ResponseCode::PendingNftAirdropAlreadyExists),
            (None, _) => {
                self.pending_airdrops.insert(id, PendingAirdrop { amount });
            }
        }
        Ok(())
    }

    pub(crate) fn remove_pending_airdrop(&mut self, id: &PendingAirdropId) -> Result<PendingAirdrop> {
        self.pending_airdrops
            .remove(id)
            .ok_or(ResponseCode::InvalidPendingAirdropId)
    }

    pub(crate) fn insert_topic(&mut self, topic: Topic) -> TopicId {
        let id = TopicId::new(self.next_entity_num);
        self.topics.insert(id, topic);
        self.bump_entity_num(id.num);
        id
    }

    fn bump_entity_num(&mut self, used: u64) {
        if used >= self.next_entity_num {
            self.next_entity_num = used.saturating_add(1);
        }
    }
}

fn apply_delta(balance: u64, delta: i64, insufficient: ResponseCode) -> Result<u64> {
    let updated = i128::from(balance).saturating_add(i128::from(delta));
    if updated < 0 {
        return Err(insufficient);
    }
    u64::try_from(updated).map_err(|_| ResponseCode::InvalidAccountAmounts)
}

impl CalculatorState for LedgerState {
    fn token_has_custom_fees(&self, token: TokenId) -> bool {
        self.tokens
            .get(&token)
            .is_some_and(|token| !token.custom_fees.is_empty())
    }

    fn resolve(&self, account: &AccountRef) -> Option<AccountId> {
        LedgerState::resolve(self, account)
    }

    fn is_associated(&self, account: AccountId, token: TokenId) -> bool {
        self.relations.contains_key(&(account, token))
    }

    fn free_auto_association_slots(&self, account: AccountId) -> Option<u64> {
        self.accounts
            .get(&account)
            .map_or(Some(0), Account::free_auto_association_slots)
    }

    fn fixed_fee_denominations(&self, token: TokenId, payer: AccountId) -> Vec<TokenId> {
        let Some(fee_token) = self.tokens.get(&token) else {
            return Vec::new();
        };
        fee_token
            .custom_fees
            .iter()
            .filter(|fee| !custom_fees::is_exempt(fee_token, fee, payer))
            .filter_map(|fee| match fee.kind {
                CustomFeeKind::Fixed(fixed) => fixed.denominating_token,
                _ => None,
            })
            .collect()
    }
}
