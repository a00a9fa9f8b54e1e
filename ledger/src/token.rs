//! Tokens, account-token relations, NFTs and pending airdrops.

use {
    serde::{Deserialize, Serialize},
    simplefees_types::{AccountId, CustomFee, CustomFeeKind, Key},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    FungibleCommon,
    NonFungibleUnique,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub token_type: TokenType,
    pub treasury: AccountId,
    pub total_supply: u64,
    /// Zero means no maximum.
    pub max_supply: u64,
    /// Serial assigned to the most recently minted NFT.
    pub last_serial: u64,
    pub supply_key: Option<Key>,
    pub freeze_key: Option<Key>,
    pub pause_key: Option<Key>,
    pub paused: bool,
    pub custom_fees: Vec<CustomFee>,
}

impl Token {
    pub fn is_fungible(&self) -> bool {
        self.token_type == TokenType::FungibleCommon
    }

    pub fn has_fallback_royalty(&self) -> bool {
        self.custom_fees.iter().any(|fee| {
            matches!(fee.kind, CustomFeeKind::Royalty(royalty) if royalty.fallback.is_some())
        })
    }

    /// Whether `account` collects any of this token's custom fees.
    pub fn is_fee_collector(&self, account: AccountId) -> bool {
        self.custom_fees.iter().any(|fee| fee.collector == account)
    }
}

/// Association between an account and a token. For NFTs `balance` counts
/// owned serials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRelation {
    pub balance: u64,
    pub frozen: bool,
    /// Created by an automatic association rather than an explicit one.
    pub automatic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub owner: AccountId,
    pub metadata: Vec<u8>,
}

/// Value held by a pending airdrop: the aggregated fungible amount, or
/// nothing for an NFT serial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAirdrop {
    pub amount: Option<u64>,
}

/// Parameters of a token created through the setup API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSpec {
    pub name: String,
    pub token_type: TokenType,
    pub treasury: AccountId,
    pub initial_supply: u64,
    pub max_supply: u64,
    pub supply_key: Option<Key>,
    pub freeze_key: Option<Key>,
    pub pause_key: Option<Key>,
    pub custom_fees: Vec<CustomFee>,
}

impl TokenSpec {
    pub fn fungible(name: impl Into<String>, treasury: AccountId, initial_supply: u64) -> Self {
        Self {
            name: name.into(),
            token_type: TokenType::FungibleCommon,
            treasury,
            initial_supply,
            max_supply: 0,
            supply_key: None,
            freeze_key: None,
            pause_key: None,
            custom_fees: Vec::new(),
        }
    }

    pub fn non_fungible(name: impl Into<String>, treasury: AccountId, supply_key: Key) -> Self {
        Self {
            name: name.into(),
            token_type: TokenType::NonFungibleUnique,
            treasury,
            initial_supply: 0,
            max_supply: 0,
            supply_key: Some(supply_key),
            freeze_key: None,
            pause_key: None,
            custom_fees: Vec::new(),
        }
    }

    pub fn with_supply_key(mut self, key: Key) -> Self {
        self.supply_key = Some(key);
        self
    }

    pub fn with_freeze_key(mut self, key: Key) -> Self {
        self.freeze_key = Some(key);
        self
    }

    pub fn with_pause_key(mut self, key: Key) -> Self {
        self.pause_key = Some(key);
        self
    }

    pub fn with_max_supply(mut self, max_supply: u64) -> Self {
        self.max_supply = max_supply;
        self
    }

    pub fn with_custom_fee(mut self, fee: CustomFee) -> Self {
        self.custom_fees.push(fee);
        self
    }

    pub(crate) fn into_token(self) -> Token {
        Token {
            name: self.name,
            token_type: self.token_type,
            treasury: self.treasury,
            total_supply: self.initial_supply,
            max_supply: self.max_supply,
            last_serial: 0,
            supply_key: self.supply_key,
            freeze_key: self.freeze_key,
            pause_key: self.pause_key,
            paused: false,
            custom_fees: self.custom_fees,
        }
    }
}
