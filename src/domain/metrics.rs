//! Summary statistics over a PnL run.
//!
//! Returns are additive (spread points or summed log returns), so drawdown is
//! measured in the same units as the cumulative curve, from a running peak
//! that starts at zero.

use super::pnl::PnlSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PnlSummary {
    pub strategy_return: f64,
    pub buy_and_hold_return: f64,
    /// Fraction of bars with a non-zero position.
    pub exposure: f64,
    pub max_drawdown: f64,
    /// Longest run of bars spent below a prior peak.
    pub max_drawdown_duration: usize,
    pub periods: usize,
}

impl PnlSummary {
    pub fn compute(pnl: &PnlSeries) -> Self {
        let periods = pnl.len();
        let exposure = if periods > 0 {
            pnl.positions.iter().filter(|&&p| p != 0).count() as f64 / periods as f64
        } else {
            0.0
        };
        let (max_drawdown, max_drawdown_duration) = compute_drawdown(&pnl.cumulative_pnl);

        PnlSummary {
            strategy_return: pnl.total_pnl(),
            buy_and_hold_return: pnl.buy_and_hold_total(),
            exposure,
            max_drawdown,
            max_drawdown_duration,
            periods,
        }
    }
}

fn compute_drawdown(curve: &[f64]) -> (f64, usize) {
    let mut peak = 0.0_f64;
    let mut max_dd = 0.0_f64;
    let mut current_duration = 0usize;
    let mut max_duration = 0usize;

    for &value in curve {
        if value >= peak {
            peak = value;
            current_duration = 0;
        } else {
            let dd = peak - value;
            if dd > max_dd {
                max_dd = dd;
            }
            current_duration += 1;
            if current_duration > max_duration {
                max_duration = current_duration;
            }
        }
    }

    (max_dd, max_duration)
}
