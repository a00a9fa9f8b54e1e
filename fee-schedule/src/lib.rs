//! Fee Schedule Store.
//!
//! Base fees and per-unit extra prices for every priced [`FeeEntry`],
//! denominated in USD tinycents, together with the [`ExchangeRate`] that
//! converts them to tinybars.
//!
//! # Modules
//!
//! - [`extra`]: billable dimensions and service entries.
//! - [`schedule`]: the in-memory [`FeeSchedule`] and its canonical values.
//! - [`json`]: the JSON layout schedules are distributed in.
//! - [`exchange_rate`]: USD/HBAR conversion.
//! - [`error`]: error types.

pub mod error;
pub mod exchange_rate;
pub mod extra;
pub mod json;
pub mod schedule;


pub use {
    error::{Result, ScheduleError},
    exchange_rate::{
        tinycents_to_cents, tinycents_to_usd, usd_to_tinycents, ExchangeRate, ExchangeRateSet,
        TINYCENTS_PER_USD,
    },
    extra::{Extra, FeeEntry},
    schedule::{FeeSchedule, NetworkFee, NodeFee, ServiceFee},
};

/// The canonical schedule in its distributed JSON form.
pub const CANONICAL_SCHEDULE_JSON: &str = include_str!("../schedules/simple-fees.json");
