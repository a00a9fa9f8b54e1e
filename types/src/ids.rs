use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Hook ids are scoped to the owning account.
pub type HookId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid entity id `{input}`: expected `shard.realm.num`")]
pub struct ParseEntityIdError {
    pub input: String,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            BorshSerialize,
            BorshDeserialize,
            Serialize,
            Deserialize,
        )]
        pub struct $name {
            pub shard: u64,
            pub realm: u64,
            pub num: u64,
        }

        impl $name {
            /// An id in shard 0, realm 0.
            pub const fn new(num: u64) -> Self {
                Self {
                    shard: 0,
                    realm: 0,
                    num,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
            }
        }

        impl FromStr for $name {
            type Err = ParseEntityIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let err = || ParseEntityIdError {
                    input: s.to_string(),
                };
                let mut parts = s.split('.').map(|part| part.parse::<u64>());
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some(Ok(shard)), Some(Ok(realm)), Some(Ok(num)), None) => {
                        Ok(Self { shard, realm, num })
                    }
                    _ => Err(err()),
                }
            }
        }
    };
}

entity_id!(
    /// Identifies an account.
    AccountId
);
entity_id!(
    /// Identifies a fungible or non-fungible token.
    TokenId
);
entity_id!(
    /// Identifies a consensus topic.
    TopicId
);

/// One serial of a non-fungible token.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct NftId {
    pub token: TokenId,
    pub serial: u64,
}

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.token, self.serial)
    }
}

/// Key of a pending airdrop. Fungible airdrops carry no serial and are
/// aggregated per (sender, receiver, token).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct PendingAirdropId {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub token: TokenId,
    pub serial: Option<u64>,
}

impl PendingAirdropId {
    pub const fn fungible(sender: AccountId, receiver: AccountId, token: TokenId) -> Self {
        Self {
            sender,
            receiver,
            token,
            serial: None,
        }
    }

    pub const fn nft(sender: AccountId, receiver: AccountId, nft: NftId) -> Self {
        Self {
            sender,
            receiver,
            token: nft.token,
            serial: Some(nft.serial),
        }
    }
}

/// An account named either by id or by alias (a serialized public key or a
/// 20-byte EVM address). Aliases that do not resolve may trigger an
/// automatic account creation when credited.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub enum AccountRef {
    Id(AccountId),
    Alias(Vec<u8>),
}

impl AccountRef {
    pub fn id(&self) -> Option<AccountId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Alias(_) => None,
        }
    }
}

impl From<AccountId> for AccountRef {
    fn from(id: AccountId) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Alias(alias) => write!(f, "alias:{}", hex::encode(alias)),
        }
    }
}
