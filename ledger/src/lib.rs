//! Ledger State and the transaction handlers that change it.
//!
//! The ledger is a plain in-memory model: accounts with HBAR balances and
//! keys, tokens with custom fee schedules, account-token relations, NFTs,
//! pending airdrops and topics. Handlers never touch the committed state
//! directly; the pipeline hands them a scratch copy inside a
//! [`HandleContext`] and keeps it only when the handler succeeds.

pub mod account;
pub mod config;
pub mod context;
pub mod custom_fees;
pub mod handlers;
pub mod hooks;
pub mod record;
pub mod state;
pub mod token;
pub mod topic;
pub mod transfer;

#[cfg(test)]
mod tests;

pub use {
    account::{Account, AccountSpec, AllowanceHook, HookRule, UNLIMITED_AUTO_ASSOCIATIONS},
    config::{HooksConfig, LedgerConfig, LedgerLimits},
    context::HandleContext,
    handlers::{HandlerRegistry, TransactionHandler},
    record::{
        AssessedCustomFee, ChildRecord, NftTransferRecord, PendingAirdropRecord,
        TransactionEffects,
    },
    state::{LedgerState, FIRST_USER_ENTITY_NUM},
    token::{Nft, PendingAirdrop, Token, TokenRelation, TokenSpec, TokenType},
    topic::Topic,
};
