//! Core data types shared by every simple-fees crate.
//!
//! # Contents
//!
//! - **Entity ids**: [`AccountId`], [`TokenId`], [`TopicId`], [`NftId`],
//!   [`PendingAirdropId`] and the alias-aware [`AccountRef`].
//! - **Keys and signatures**: [`Key`] structures, [`PrivateKey`] signing and
//!   [`SignatureMap`] verification over the borsh-encoded body.
//! - **Transactions**: [`TransactionBody`] with one [`TransactionData`]
//!   variant per supported [`Functionality`].
//! - **Custom fees**: fixed, fractional and royalty fee definitions.
//! - **Status codes**: the [`ResponseCode`] taxonomy returned by every stage.

pub mod custom_fee;
pub mod functionality;
pub mod ids;
pub mod key;
pub mod response_code;
pub mod signature;
pub mod timestamp;
pub mod transaction;

pub use {
    custom_fee::{CustomFee, CustomFeeKind, FixedFee, FractionalFee, RoyaltyFee},
    functionality::Functionality,
    ids::{AccountId, AccountRef, HookId, NftId, PendingAirdropId, TokenId, TopicId},
    key::Key,
    response_code::ResponseCode,
    signature::{PrivateKey, SignatureBytes, SignatureError, SignatureMap, SignaturePair, VerifiedKeys},
    timestamp::Timestamp,
    transaction::{
        AccountAmount, ConsensusCreateTopicBody, CryptoTransferBody, HookCall, NftTransfer,
        TokenAirdropBody, TokenAssociateBody, TokenCancelAirdropBody, TokenClaimAirdropBody,
        TokenMintBody, TokenTransferList, TopicCustomFee, Transaction, TransactionBody,
        TransactionData, TransactionId,
    },
};

/// Tinybars in one HBAR.
pub const TINYBARS_PER_HBAR: u64 = 100_000_000;

/// Tinycents in one US cent.
pub const TINYCENTS_PER_CENT: u64 = 100_000_000;
