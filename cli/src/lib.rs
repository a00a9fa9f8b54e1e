//! `simplefees` command line tool: offline fee estimates and schedule
//! inspection.

pub mod calculate;
pub mod clap_app;
pub mod cli;
pub mod schedule;
