use {
    crate::ids::{AccountId, TokenId},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// A flat amount in HBAR (`denominating_token == None`) or in units of a
/// fungible token.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct FixedFee {
    pub amount: u64,
    pub denominating_token: Option<TokenId>,
}

/// A fraction of each fungible unit transferred.
///
/// ```text
/// fee = clamp(amount * numerator / denominator, minimum, maximum)
/// ```
///
/// `maximum == 0` means no upper bound. With `net_of_transfers` the sender
/// pays the fee on top of the transfer; otherwise the receivers' credits
/// are reduced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct FractionalFee {
    pub numerator: u64,
    pub denominator: u64,
    pub minimum: u64,
    pub maximum: u64,
    pub net_of_transfers: bool,
}

/// A fraction of the fungible value exchanged for an NFT, or a fixed
/// fallback fee paid by the receiver when nothing was exchanged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct RoyaltyFee {
    pub numerator: u64,
    pub denominator: u64,
    pub fallback: Option<FixedFee>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub enum CustomFeeKind {
    Fixed(FixedFee),
    Fractional(FractionalFee),
    Royalty(RoyaltyFee),
}

/// One entry of a token's custom fee schedule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
pub struct CustomFee {
    pub kind: CustomFeeKind,
    pub collector: AccountId,
    /// When set, every collector of the token's fees is exempt from this fee.
    pub all_collectors_are_exempt: bool,
}

impl CustomFee {
    pub fn fixed_hbar(amount: u64, collector: AccountId) -> Self {
        Self::new(
            CustomFeeKind::Fixed(FixedFee {
                amount,
                denominating_token: None,
            }),
            collector,
        )
    }

    pub fn fixed_hts(amount: u64, token: TokenId, collector: AccountId) -> Self {
        Self::new(
            CustomFeeKind::Fixed(FixedFee {
                amount,
                denominating_token: Some(token),
            }),
            collector,
        )
    }

    pub fn fractional(
        numerator: u64,
        denominator: u64,
        minimum: u64,
        maximum: u64,
        collector: AccountId,
    ) -> Self {
        Self::new(
            CustomFeeKind::Fractional(FractionalFee {
                numerator,
                denominator,
                minimum,
                maximum,
                net_of_transfers: false,
            }),
            collector,
        )
    }

    pub fn royalty(
        numerator: u64,
        denominator: u64,
        fallback: Option<FixedFee>,
        collector: AccountId,
    ) -> Self {
        Self::new(
            CustomFeeKind::Royalty(RoyaltyFee {
                numerator,
                denominator,
                fallback,
            }),
            collector,
        )
    }

    /// Marks a fractional fee as charged to the sender on top of the
    /// transfer. No effect on other kinds.
    pub fn with_net_of_transfers(mut self) -> Self {
        if let CustomFeeKind::Fractional(fee) = &mut self.kind {
            fee.net_of_transfers = true;
        }
        self
    }

    pub fn with_all_collectors_exempt(mut self) -> Self {
        self.all_collectors_are_exempt = true;
        self
    }

    fn new(kind: CustomFeeKind, collector: AccountId) -> Self {
        Self {
            kind,
            collector,
            all_collectors_are_exempt: false,
        }
    }

    /// Token the collector must be associated with to receive this fee.
    pub fn denominating_token(&self, fee_token: TokenId) -> Option<TokenId> {
        match self.kind {
            CustomFeeKind::Fixed(fixed) => fixed.denominating_token,
            CustomFeeKind::Fractional(_) => Some(fee_token),
            CustomFeeKind::Royalty(_) => None,
        }
    }
}
