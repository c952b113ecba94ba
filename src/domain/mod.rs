//! Core domain types and logic.

pub mod error;
pub mod price;
pub mod indicator;
pub mod regression;
pub mod adf;
pub mod pair_selection;
pub mod signal;
pub mod position;
pub mod pnl;
pub mod optimizer;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod universe;
pub mod config_validation;
