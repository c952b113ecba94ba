//! Configuration validation.
//!
//! Runs before any data is fetched. The typed readers here are shared with
//! the CLI builders so a value that validates is read the same way later.

use crate::domain::error::StratbenchError;
use crate::domain::optimizer::{GridAxis, DEFAULT_AXIS};
use crate::domain::strategy::StrategyKind;
use crate::domain::universe::parse_symbols;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub const DATA_SECTION: &str = "data";
pub const REPORT_SECTION: &str = "report";

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    require_string(config, DATA_SECTION, "directory")?;
    let start_date = read_date(config, DATA_SECTION, "start_date")?;
    let end_date = read_date(config, DATA_SECTION, "end_date")?;
    if start_date >= end_date {
        return Err(invalid(
            DATA_SECTION,
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

pub fn validate_strategy_config(
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<(), StratbenchError> {
    match kind {
        StrategyKind::StatArb => validate_stat_arb_config(config),
        StrategyKind::BigMovesMonday => validate_big_moves_config(config),
    }
}

pub fn validate_stat_arb_config(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    let section = StrategyKind::StatArb.section();

    let symbols = read_symbols(config, section)?;
    if symbols.len() < 2 {
        return Err(invalid(section, "symbols", "at least two symbols are required"));
    }

    if read_number(config, section, "formation_bars", 90usize)? < 10 {
        return Err(invalid(section, "formation_bars", "formation_bars must be at least 10"));
    }
    if read_number(config, section, "lookback", 15usize)? < 2 {
        return Err(invalid(section, "lookback", "lookback must be at least 2"));
    }
    let band_multiplier = read_number(config, section, "band_multiplier", 1.0f64)?;
    if !(band_multiplier.is_finite() && band_multiplier > 0.0) {
        return Err(invalid(section, "band_multiplier", "band_multiplier must be positive"));
    }
    Ok(())
}

pub fn validate_big_moves_config(config: &dyn ConfigPort) -> Result<(), StratbenchError> {
    let section = StrategyKind::BigMovesMonday.section();

    read_symbols(config, section)?;
    if read_number(config, section, "range_window", 25usize)? < 1 {
        return Err(invalid(section, "range_window", "range_window must be at least 1"));
    }
    read_number(config, section, "hold_periods", 3usize)?;
    read_axis(config, section, "ma_threshold")?;
    read_axis(config, section, "ibs_threshold")?;
    read_bool(config, section, "parallel", true)?;
    Ok(())
}

/// Comma-separated symbol list, uppercased, no duplicates.
pub fn read_symbols(config: &dyn ConfigPort, section: &str) -> Result<Vec<String>, StratbenchError> {
    let raw = require_string(config, section, "symbols")?;
    parse_symbols(&raw).map_err(|e| invalid(section, "symbols", &e.to_string()))
}

pub fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, StratbenchError> {
    let raw = require_string(config, section, key)?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(section, key, &format!("invalid {key} format, expected YYYY-MM-DD"))
    })
}

/// A missing or blank key yields `default`; anything unparsable is an error.
pub fn read_number<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, StratbenchError> {
    match optional_string(config, section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| invalid(section, key, &format!("'{raw}' is not a valid number"))),
    }
}

pub fn read_bool(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: bool,
) -> Result<bool, StratbenchError> {
    match optional_string(config, section, key) {
        None => Ok(default),
        Some(raw) => match raw.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(invalid(section, key, &format!("'{raw}' is not a boolean"))),
        },
    }
}

/// `{prefix}_start`, `{prefix}_stop`, `{prefix}_step`, checked by generating the values.
pub fn read_axis(
    config: &dyn ConfigPort,
    section: &str,
    prefix: &str,
) -> Result<GridAxis, StratbenchError> {
    let axis = GridAxis {
        start: read_number(config, section, &format!("{prefix}_start"), DEFAULT_AXIS.start)?,
        stop: read_number(config, section, &format!("{prefix}_stop"), DEFAULT_AXIS.stop)?,
        step: read_number(config, section, &format!("{prefix}_step"), DEFAULT_AXIS.step)?,
    };
    axis.values()
        .map_err(|e| invalid(section, &format!("{prefix}_step"), &e.to_string()))?;
    Ok(axis)
}

pub fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, StratbenchError> {
    optional_string(config, section, key).ok_or_else(|| StratbenchError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    })
}

pub fn optional_string(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn invalid(section: &str, key: &str, reason: &str) -> StratbenchError {
    StratbenchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
