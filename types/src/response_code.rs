use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    strum_macros::{Display, EnumString, IntoStaticStr},
};

/// Outcome status of a transaction at any pipeline stage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    Success,
    FailInvalid,

    // -- Transaction-level checks --
    InvalidTransaction,
    InvalidTransactionBody,
    TransactionOversize,
    InvalidNodeAccount,
    MemoTooLong,
    InvalidZeroByteInString,
    InvalidTransactionDuration,
    InvalidTransactionStart,
    TransactionExpired,
    DuplicateTransaction,
    PayerAccountNotFound,
    InvalidSignature,
    InvalidPayerSignature,
    NotSupported,
    InsufficientTxFee,
    InsufficientPayerBalance,

    // -- Transfers --
    InvalidAccountId,
    InvalidAccountAmounts,
    AccountRepeatedInAccountAmounts,
    TransfersNotZeroSumForToken,
    InvalidTokenId,
    AccountAmountTransfersOnlyAllowedForFungibleCommon,
    InvalidNftId,
    SenderDoesNotOwnNftSerialNo,
    InsufficientAccountBalance,
    InsufficientTokenBalance,
    TokenNotAssociatedToAccount,
    NoRemainingAutomaticAssociations,
    AccountFrozenForToken,
    TokenIsPaused,
    InvalidAliasKey,
    MaxChildRecordsExceeded,

    // -- Hooks --
    HooksNotEnabled,
    HookNotFound,
    InsufficientGas,
    RejectedByAccountAllowanceHook,

    // -- Custom fees --
    CustomFeeChargingExceededMaxRecursionDepth,
    CustomFeeChargingExceededMaxAccountAmounts,
    InsufficientSenderAccountBalanceForCustomFee,
    TokenNotAssociatedToFeeCollector,
    CustomFeeMustBePositive,
    InvalidCustomFeeCollector,
    InvalidTokenIdInCustomFees,
    CustomFeesListTooLong,

    // -- Airdrops --
    TokenAirdropWithFallbackRoyalty,
    PendingNftAirdropAlreadyExists,
    TokenReferenceListSizeLimitExceeded,
    InvalidPendingAirdropId,
    PendingAirdropIdRepeated,
    PendingAirdropIdListTooLong,
    EmptyPendingAirdropIdList,

    // -- Associations --
    TokenIdRepeatedInTokenList,
    TokenAlreadyAssociatedToAccount,

    // -- Mint --
    TokenHasNoSupplyKey,
    InvalidTokenMintAmount,
    InvalidTokenMintMetadata,
    BatchSizeLimitExceeded,
    MetadataTooLong,
    TokenMaxSupplyReached,

    // -- Topics --
    BadEncoding,
    InvalidAutorenewAccount,
    AutorenewDurationNotInRange,
}

impl ResponseCode {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl std::error::Error for ResponseCode {}
