//! Derived per-bar indicators.
//!
//! - `rolling`: trailing mean / sample standard deviation
//! - `returns`: differences and log returns
//! - `IndicatorRow`: the per-bar fields the calendar strategy reads

pub mod returns;
pub mod rolling;

use crate::domain::price::PriceSeries;
use chrono::{Datelike, NaiveDate, Weekday};

/// Trailing window for the relative-range average.
pub const DEFAULT_RANGE_WINDOW: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub adj_close: f64,
    /// ln(adj_close[t] / adj_close[t-1])
    pub log_return: Option<f64>,
    /// 1 - adj_close[t] / adj_close[t-1]; positive on a down day.
    pub down_move: Option<f64>,
    /// (high - low) / adj_close
    pub relative_range: f64,
    pub range_average: Option<f64>,
    pub ibs: Option<f64>,
}

/// Build one row per bar. Rows are shared read-only between evaluations.
pub fn compute_indicator_rows(series: &PriceSeries, range_window: usize) -> Vec<IndicatorRow> {
    let bars = series.bars();
    let closes = series.adj_closes();
    let log_returns = returns::log_returns(&closes);
    let ranges: Vec<f64> = bars.iter().map(|b| b.relative_range()).collect();
    let range_average = rolling::rolling_mean(&ranges, range_window);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            weekday: bar.date.weekday(),
            adj_close: bar.adj_close,
            log_return: log_returns[i],
            down_move: (i > 0).then(|| 1.0 - bar.adj_close / closes[i - 1]),
            relative_range: ranges[i],
            range_average: range_average[i],
            ibs: bar.ibs(),
        })
        .collect()
}
