//! Extras Counter and Fee Calculator.
//!
//! Every transaction pays three components, all in tinycents:
//!
//! ```text
//! node    = node.base + Σ price(e) · max(0, count(e) − node.included(e))
//! network = node · multiplier
//! service = Σ over the entries its kind is priced with
//! ```
//!
//! The service portion is accumulated by one [`ServiceFeeCalculator`] per
//! [`Functionality`](simplefees_types::Functionality); counts that depend on
//! ledger state are read through [`CalculatorState`].

pub mod calculator;
pub mod error;
pub mod extras;
pub mod result;
pub mod services;
pub mod state;


pub use {
    calculator::{FeeAccumulator, FeeAssessment, FeeContext, ServiceFeeCalculator, SimpleFeeCalculator},
    error::{FeeCalculationError, Result},
    extras::{count_transfers, ExtraCounts, TransferCounts},
    result::FeeResult,
    state::{CalculatorState, NoState},
};
