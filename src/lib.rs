//! stratbench: research harness for a pairs mean-reversion strategy and a
//! calendar-effect ("big moves on Monday") strategy over daily price history.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
