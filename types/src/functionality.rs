use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter, EnumString, IntoStaticStr},
};

/// Transaction kinds the pipeline accepts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub enum Functionality {
    CryptoTransfer,
    TokenAirdrop,
    TokenMint,
    ConsensusCreateTopic,
    TokenAssociateToAccount,
    TokenClaimAirdrop,
    TokenCancelAirdrop,
}
