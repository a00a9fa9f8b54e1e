//! One [`ServiceFeeCalculator`] per transaction kind.

mod consensus_create_topic;
mod crypto_transfer;
mod pending_airdrop;
mod token_airdrop;
mod token_associate;
mod token_mint;

pub use {
    consensus_create_topic::ConsensusCreateTopicFeeCalculator,
    crypto_transfer::{charge_transfer_tier, CryptoTransferFeeCalculator},
    pending_airdrop::{TokenCancelAirdropFeeCalculator, TokenClaimAirdropFeeCalculator},
    token_airdrop::TokenAirdropFeeCalculator,
    token_associate::TokenAssociateFeeCalculator,
    token_mint::TokenMintFeeCalculator,
};

use crate::calculator::ServiceFeeCalculator;

pub(crate) fn all() -> Vec<Box<dyn ServiceFeeCalculator>> {
    vec![
        Box::new(CryptoTransferFeeCalculator),
        Box::new(TokenAirdropFeeCalculator),
        Box::new(TokenMintFeeCalculator),
        Box::new(ConsensusCreateTopicFeeCalculator),
        Box::new(TokenAssociateFeeCalculator),
        Box::new(TokenClaimAirdropFeeCalculator),
        Box::new(TokenCancelAirdropFeeCalculator),
    ]
}
