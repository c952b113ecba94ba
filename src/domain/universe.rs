//! Symbol universe: parse symbol lists and fetch them best-effort.
//!
//! A symbol whose fetch fails or returns too few bars is logged and skipped;
//! the run continues with whatever remains.

use crate::domain::error::StratbenchError;
use crate::domain::price::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Unavailable(String),
    InsufficientBars { bars: usize, minimum: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Unavailable(reason) => write!(f, "{reason}"),
            SkipReason::InsufficientBars { bars, minimum } => {
                write!(f, "only {bars} bars, minimum {minimum} required")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchedUniverse {
    pub series: Vec<PriceSeries>,
    pub skipped: Vec<SkippedSymbol>,
}

impl FetchedUniverse {
    pub fn symbols(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.symbol()).collect()
    }
}

/// Fetch every symbol, skipping failures. Errors only when nothing survives.
pub fn fetch_universe(
    data_port: &dyn DataPort,
    symbols: &[String],
    start_date: NaiveDate,
    end_date: NaiveDate,
    min_bars: usize,
) -> Result<FetchedUniverse, StratbenchError> {
    let mut series = Vec::new();
    let mut skipped = Vec::new();

    for symbol in symbols {
        let fetched = match data_port.fetch_prices(symbol, start_date, end_date) {
            Ok(s) => s,
            Err(e) => {
                warn!(symbol = %symbol, "skipping symbol: {e}");
                skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::Unavailable(e.to_string()),
                });
                continue;
            }
        };

        if fetched.len() < min_bars {
            let reason = SkipReason::InsufficientBars {
                bars: fetched.len(),
                minimum: min_bars,
            };
            warn!(symbol = %symbol, "skipping symbol: {reason}");
            skipped.push(SkippedSymbol {
                symbol: symbol.clone(),
                reason,
            });
            continue;
        }

        info!(symbol = %symbol, bars = fetched.len(), "fetched");
        series.push(fetched);
    }

    if series.is_empty() {
        return Err(StratbenchError::DataUnavailable {
            symbol: symbols.join(","),
            reason: "every symbol failed to load".into(),
        });
    }

    if !skipped.is_empty() {
        info!(
            "continuing with {} of {} symbols",
            series.len(),
            series.len() + skipped.len()
        );
    }

    Ok(FetchedUniverse { series, skipped })
}
