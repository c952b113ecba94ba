//! PnL accumulator.
//!
//! strategy_return[t] = position[t-1] × period_return[t]. The position applied
//! to a period is always the one decided a bar earlier. Positions that already
//! carry their execution lag go through [`accumulate_executed_pnl`] instead,
//! which applies position[t] to period_return[t]. Cumulative series are running
//! sums with undefined entries counted as zero.

use crate::domain::error::StratbenchError;
use crate::domain::indicator::returns::{differences, log_returns};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// v[t] - v[t-1], for spreads.
    Difference,
    /// ln(v[t] / v[t-1]), for prices.
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PnlSeries {
    pub dates: Vec<NaiveDate>,
    pub positions: Vec<i8>,
    pub period_returns: Vec<Option<f64>>,
    pub strategy_returns: Vec<Option<f64>>,
    pub cumulative_pnl: Vec<f64>,
    pub buy_and_hold: Vec<f64>,
}

impl PnlSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Cumulative strategy PnL at the final bar.
    pub fn total_pnl(&self) -> f64 {
        self.cumulative_pnl.last().copied().unwrap_or(0.0)
    }

    /// Cumulative buy-and-hold return at the final bar.
    pub fn buy_and_hold_total(&self) -> f64 {
        self.buy_and_hold.last().copied().unwrap_or(0.0)
    }
}

fn running_sum(values: &[Option<f64>]) -> Vec<f64> {
    let mut total = 0.0;
    values
        .iter()
        .map(|v| {
            total += v.unwrap_or(0.0);
            total
        })
        .collect()
}

/// Strategy return from the position decided at the previous close.
pub fn accumulate_pnl(
    dates: &[NaiveDate],
    values: &[f64],
    positions: &[i8],
    kind: ReturnKind,
) -> Result<PnlSeries, StratbenchError> {
    accumulate(dates, values, positions, kind, |t| {
        t.checked_sub(1).map(|p| positions[p])
    })
}

/// Strategy return from positions already shifted onto their execution bar,
/// such as holds built from a lagged signal.
pub fn accumulate_executed_pnl(
    dates: &[NaiveDate],
    values: &[f64],
    positions: &[i8],
    kind: ReturnKind,
) -> Result<PnlSeries, StratbenchError> {
    accumulate(dates, values, positions, kind, |t| Some(positions[t]))
}

fn accumulate(
    dates: &[NaiveDate],
    values: &[f64],
    positions: &[i8],
    kind: ReturnKind,
    held_at: impl Fn(usize) -> Option<i8>,
) -> Result<PnlSeries, StratbenchError> {
    if dates.len() != values.len() || values.len() != positions.len() {
        return Err(StratbenchError::numeric(format!(
            "length mismatch: {} dates, {} values, {} positions",
            dates.len(),
            values.len(),
            positions.len()
        )));
    }

    let period_returns = match kind {
        ReturnKind::Difference => differences(values),
        ReturnKind::Log => {
            if let Some(v) = values.iter().find(|v| !(**v > 0.0)) {
                return Err(StratbenchError::numeric(format!(
                    "log return of non-positive value {v}"
                )));
            }
            log_returns(values)
        }
    };

    let mut strategy_returns = Vec::with_capacity(values.len());
    for (t, ret) in period_returns.iter().enumerate() {
        let strategy = match (held_at(t), ret) {
            (Some(held), Some(r)) => {
                let s = f64::from(held) * r;
                if !s.is_finite() {
                    return Err(StratbenchError::numeric(format!(
                        "non-finite strategy return on {}",
                        dates[t]
                    )));
                }
                Some(s)
            }
            _ => None,
        };
        strategy_returns.push(strategy);
    }

    Ok(PnlSeries {
        dates: dates.to_vec(),
        positions: positions.to_vec(),
        cumulative_pnl: running_sum(&strategy_returns),
        buy_and_hold: running_sum(&period_returns),
        period_returns,
        strategy_returns,
    })
}
