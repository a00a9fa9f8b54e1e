use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumIter, EnumString, IntoStaticStr},
};

/// A billable dimension of a transaction.
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
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Extra {
    Signatures,
    ProcessingBytes,
    Keys,
    Accounts,
    TokenTypes,
    NftSerials,
    HookExecutions,
    Gas,
    Airdrops,
    CreatedAutoAssociations,
    CreatedAccounts,
}

impl Extra {
    /// Extras priced as part of the node fee rather than a service fee.
    pub fn is_node_extra(self) -> bool {
        matches!(self, Self::Signatures | Self::ProcessingBytes)
    }
}

/// A priced service entry. One transaction kind may combine several.
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
pub enum FeeEntry {
    CryptoTransfer,
    TokenTransfer,
    TokenTransferWithCustomFees,
    TokenAirdrop,
    TokenMint,
    TokenMintNft,
    ConsensusCreateTopic,
    ConsensusCreateTopicWithCustomFees,
    TokenAssociateToAccount,
    TokenClaimAirdrop,
    TokenCancelAirdrop,
}

impl FeeEntry {
    /// Service group the entry is listed under in the JSON layout.
    pub fn service(self) -> &'static str {
        match self {
            Self::CryptoTransfer => "Crypto",
            Self::ConsensusCreateTopic | Self::ConsensusCreateTopicWithCustomFees => "Consensus",
            Self::TokenTransfer
            | Self::TokenTransferWithCustomFees
            | Self::TokenAirdrop
            | Self::TokenMint
            | Self::TokenMintNft
            | Self::TokenAssociateToAccount
            | Self::TokenClaimAirdrop
            | Self::TokenCancelAirdrop => "Token",
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::str::FromStr, strum::IntoEnumIterator};

    #[test]
    fn test_extra_names() {
        assert_eq!(Extra::ProcessingBytes.to_string(), "PROCESSING_BYTES");
        assert_eq!(
            Extra::from_str("CREATED_AUTO_ASSOCIATIONS"),
            Ok(Extra::CreatedAutoAssociations)
        );
        assert!(Extra::from_str("BOGUS").is_err());
    }

    #[test]
    fn test_only_signatures_and_bytes_are_node_extras() {
        let node: Vec<_> = Extra::iter().filter(|e| e.is_node_extra()).collect();
        assert_eq!(node, vec![Extra::Signatures, Extra::ProcessingBytes]);
    }

    #[test]
    fn test_every_entry_has_a_service() {
        for entry in FeeEntry::iter() {
            assert!(["Crypto", "Token", "Consensus"].contains(&entry.service()));
        }
    }
}
