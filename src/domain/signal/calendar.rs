//! Big moves on Monday.
//!
//! A bar qualifies when all three hold:
//! 1. Calendar: Monday, previous trading day a Friday, and the bar four
//!    trading days ahead a Friday (an uninterrupted five-day week).
//! 2. Big down move: 1 - close / previous close >= ma_threshold × trailing
//!    average relative range.
//! 3. Weak close: IBS < ibs_threshold.
//!
//! The raw signal is lagged one bar before it is used for positioning, so a
//! position opens on the bar after the signal and earns that bar's return.

use crate::domain::error::StratbenchError;
use crate::domain::indicator::IndicatorRow;
use crate::domain::signal::{lag_one, Signal};
use chrono::Weekday;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BigMovesParams {
    pub ma_threshold: f64,
    pub ibs_threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSignals {
    pub calendar: Vec<bool>,
    pub big_down_move: Vec<bool>,
    pub weak_close: Vec<bool>,
    pub raw: Vec<Signal>,
    pub lagged: Vec<Option<Signal>>,
}

/// Condition 1 at `i`. Reads the trading calendar four bars ahead, which is
/// known in advance; no prices beyond `i` are used.
pub fn is_full_week_monday(rows: &[IndicatorRow], i: usize) -> bool {
    rows[i].weekday == Weekday::Mon
        && i > 0
        && rows[i - 1].weekday == Weekday::Fri
        && rows.get(i + 4).is_some_and(|r| r.weekday == Weekday::Fri)
}

pub fn big_moves_monday_signals(
    rows: &[IndicatorRow],
    params: BigMovesParams,
) -> Result<CalendarSignals, StratbenchError> {
    if !(params.ma_threshold.is_finite() && params.ibs_threshold.is_finite()) {
        return Err(StratbenchError::numeric("thresholds must be finite"));
    }

    let calendar: Vec<bool> = (0..rows.len())
        .map(|i| is_full_week_monday(rows, i))
        .collect();

    let big_down_move: Vec<bool> = rows
        .iter()
        .map(|r| match (r.down_move, r.range_average) {
            (Some(down), Some(avg)) => down >= params.ma_threshold * avg,
            _ => false,
        })
        .collect();

    let weak_close: Vec<bool> = rows
        .iter()
        .map(|r| r.ibs.is_some_and(|ibs| ibs < params.ibs_threshold))
        .collect();

    let raw: Vec<Signal> = (0..rows.len())
        .map(|i| {
            if calendar[i] && big_down_move[i] && weak_close[i] {
                Signal::Long
            } else {
                Signal::Flat
            }
        })
        .collect();
    let lagged = lag_one(&raw);

    Ok(CalendarSignals {
        calendar,
        big_down_move,
        weak_close,
        raw,
        lagged,
    })
}
