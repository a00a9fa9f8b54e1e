//! # Charging pipeline
//!
//! Transactions pass through three stages, and the stage a transaction
//! fails at decides who pays:
//!
//! | stage      | on failure                                          |
//! |------------|-----------------------------------------------------|
//! | ingest     | rejected, nothing charged                           |
//! | pre-handle | submitting node pays the network fee                |
//! | handle     | payer pays the full fee, ledger changes roll back   |
//!
//! Fees are computed by [`simplefees_calculator`] from the active
//! [`FeeSchedule`](simplefees_schedule::FeeSchedule), converted to tinybars
//! at the active exchange rate and split between the submitting node (node
//! fee) and the fee collection account (network and service fees).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut pipeline = FeePipeline::new(PipelineConfig::default(), state)?;
//! pipeline.add_node(AccountId::new(3))?;
//! let record = pipeline.submit_and_handle(&txn, AccountId::new(3))?;
//! assert!(record.is_success());
//! ```

pub mod charging;
mod checks;
pub mod config;
pub mod dedup;
pub mod error;
mod handle;
mod ingest;
mod pipeline;
pub mod pre_handle;
pub mod record;


pub use {
    charging::{ChargingPolicy, FeeCharger, FeeDistribution},
    config::{FeesConfig, PipelineConfig, TransactionsConfig, DEFAULT_FEE_COLLECTION_ACCOUNT},
    error::{ConfigError, PipelineError, Result},
    pipeline::FeePipeline,
    pre_handle::PreHandled,
    record::{FeeQuote, TransactionRecord},
};
