use {
    crate::{
        custom_fee::FixedFee,
        functionality::Functionality,
        ids::{AccountId, AccountRef, HookId, PendingAirdropId, TokenId},
        key::Key,
        signature::{PrivateKey, SignatureError, SignatureMap},
        timestamp::Timestamp,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::{fmt, io},
};

/// Uniquely identifies a transaction by payer and valid start.
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
pub struct TransactionId {
    pub payer: AccountId,
    pub valid_start: Timestamp,
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.payer, self.valid_start)
    }
}

/// Invokes an allowance hook of the debited account instead of requiring
/// its signature.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct HookCall {
    pub hook_id: HookId,
    pub gas_limit: u64,
}

/// A signed HBAR or fungible token adjustment.
#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct AccountAmount {
    pub account: AccountRef,
    pub amount: i64,
    pub hook_call: Option<HookCall>,
}

impl AccountAmount {
    pub fn new(account: impl Into<AccountRef>, amount: i64) -> Self {
        Self {
            account: account.into(),
            amount,
            hook_call: None,
        }
    }

    pub fn with_hook(mut self, hook_id: HookId, gas_limit: u64) -> Self {
        self.hook_call = Some(HookCall { hook_id, gas_limit });
        self
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct NftTransfer {
    pub sender: AccountRef,
    pub receiver: AccountRef,
    pub serial: u64,
    pub sender_hook_call: Option<HookCall>,
}

impl NftTransfer {
    pub fn new(sender: impl Into<AccountRef>, receiver: impl Into<AccountRef>, serial: u64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            serial,
            sender_hook_call: None,
        }
    }
}

/// Fungible adjustments or NFT moves of one token.
#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TokenTransferList {
    pub token: TokenId,
    pub transfers: Vec<AccountAmount>,
    pub nft_transfers: Vec<NftTransfer>,
}

impl TokenTransferList {
    pub fn fungible(token: TokenId, transfers: Vec<AccountAmount>) -> Self {
        Self {
            token,
            transfers,
            nft_transfers: Vec::new(),
        }
    }

    pub fn nft(token: TokenId, nft_transfers: Vec<NftTransfer>) -> Self {
        Self {
            token,
            transfers: Vec::new(),
            nft_transfers,
        }
    }

    /// Every account reference named in the list.
    pub fn accounts(&self) -> impl Iterator<Item = &AccountRef> {
        self.transfers.iter().map(|aa| &aa.account).chain(
            self.nft_transfers
                .iter()
                .flat_map(|nft| [&nft.sender, &nft.receiver]),
        )
    }

    /// Every hook call in the list.
    pub fn hook_calls(&self) -> impl Iterator<Item = &HookCall> {
        self.transfers
            .iter()
            .filter_map(|aa| aa.hook_call.as_ref())
            .chain(self.nft_transfers.iter().filter_map(|nft| nft.sender_hook_call.as_ref()))
    }
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct CryptoTransferBody {
    pub hbar_transfers: Vec<AccountAmount>,
    pub token_transfers: Vec<TokenTransferList>,
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TokenAirdropBody {
    pub token_transfers: Vec<TokenTransferList>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TokenMintBody {
    pub token: TokenId,
    /// Fungible units; must be zero for NFTs.
    pub amount: u64,
    /// One entry per NFT serial; must be empty for fungible tokens.
    pub metadata: Vec<Vec<u8>>,
}

/// Fixed fee charged for submitting a message to a topic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TopicCustomFee {
    pub fee: FixedFee,
    pub collector: AccountId,
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct ConsensusCreateTopicBody {
    pub memo: String,
    pub admin_key: Option<Key>,
    pub submit_key: Option<Key>,
    pub auto_renew_account: Option<AccountId>,
    pub auto_renew_period_secs: u64,
    pub custom_fees: Vec<TopicCustomFee>,
    pub fee_exempt_keys: Vec<Key>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TokenAssociateBody {
    pub account: AccountId,
    pub tokens: Vec<TokenId>,
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TokenClaimAirdropBody {
    pub pending_airdrops: Vec<PendingAirdropId>,
}

#[derive(
    Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TokenCancelAirdropBody {
    pub pending_airdrops: Vec<PendingAirdropId>,
}

#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum TransactionData {
    CryptoTransfer(CryptoTransferBody),
    TokenAirdrop(TokenAirdropBody),
    TokenMint(TokenMintBody),
    ConsensusCreateTopic(ConsensusCreateTopicBody),
    TokenAssociate(TokenAssociateBody),
    TokenClaimAirdrop(TokenClaimAirdropBody),
    TokenCancelAirdrop(TokenCancelAirdropBody),
}

impl TransactionData {
    pub fn functionality(&self) -> Functionality {
        match self {
            Self::CryptoTransfer(_) => Functionality::CryptoTransfer,
            Self::TokenAirdrop(_) => Functionality::TokenAirdrop,
            Self::TokenMint(_) => Functionality::TokenMint,
            Self::ConsensusCreateTopic(_) => Functionality::ConsensusCreateTopic,
            Self::TokenAssociate(_) => Functionality::TokenAssociateToAccount,
            Self::TokenClaimAirdrop(_) => Functionality::TokenClaimAirdrop,
            Self::TokenCancelAirdrop(_) => Functionality::TokenCancelAirdrop,
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct TransactionBody {
    pub transaction_id: TransactionId,
    /// Node the payer intends to submit through.
    pub node_account: AccountId,
    /// Most the payer is willing to pay, in tinybars.
    pub max_transaction_fee: u64,
    pub valid_duration_secs: u64,
    pub memo: String,
    pub data: TransactionData,
}

impl TransactionBody {
    pub fn payer(&self) -> AccountId {
        self.transaction_id.payer
    }

    /// Bytes covered by every signature.
    pub fn signed_bytes(&self) -> io::Result<Vec<u8>> {
        borsh::to_vec(self)
    }
}

/// A body plus the signatures over its bytes.
#[derive(
    Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct Transaction {
    pub body: TransactionBody,
    pub signatures: SignatureMap,
}

impl Transaction {
    /// Signs `body` with each key in order.
    pub fn signed(body: TransactionBody, keys: &[&PrivateKey]) -> Result<Self, SignatureError> {
        let mut txn = Self {
            body,
            signatures: SignatureMap::default(),
        };
        txn.add_signatures(keys)?;
        Ok(txn)
    }

    pub fn add_signatures(&mut self, keys: &[&PrivateKey]) -> Result<(), SignatureError> {
        let message = self
            .body
            .signed_bytes()
            .map_err(|err| SignatureError::Encoding(err.to_string()))?;
        for key in keys {
            self.signatures.pairs.push(key.sign(&message)?);
        }
        Ok(())
    }

    /// Size of the signed transaction on the wire.
    pub fn serialized_size(&self) -> io::Result<u64> {
        borsh::object_length(self).map(|len| len as u64)
    }

    pub fn functionality(&self) -> Functionality {
        self.body.data.functionality()
    }
}
