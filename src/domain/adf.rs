//! Augmented Dickey-Fuller unit-root test.
//!
//! Regression with a constant and a fixed number of lagged differences:
//!
//! Δy[t] = α + γ·y[t-1] + Σ β_i·Δy[t-i] + ε[t]
//!
//! The statistic is the t-value of γ. Critical values come from the
//! MacKinnon (2010) response surfaces for the constant-only, single-series
//! case: cv(T) = b0 + b1/T + b2/T² + b3/T³ with T the regression's nobs.

use crate::domain::error::StratbenchError;
use crate::domain::regression::ols;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Lagged differences used by the pair selector.
pub const DEFAULT_ADF_LAG: usize = 1;

const MACKINNON_CONSTANT: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SignificanceLevel {
    OnePercent,
    FivePercent,
    TenPercent,
}

impl SignificanceLevel {
    /// Tightest first.
    pub const ALL: [SignificanceLevel; 3] = [
        SignificanceLevel::OnePercent,
        SignificanceLevel::FivePercent,
        SignificanceLevel::TenPercent,
    ];
}

impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignificanceLevel::OnePercent => write!(f, "1%"),
            SignificanceLevel::FivePercent => write!(f, "5%"),
            SignificanceLevel::TenPercent => write!(f, "10%"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValues {
    pub one_pct: f64,
    pub five_pct: f64,
    pub ten_pct: f64,
}

impl CriticalValues {
    pub fn for_nobs(nobs: usize) -> Self {
        let inv = 1.0 / nobs as f64;
        let eval = |b: &[f64; 4]| b[0] + b[1] * inv + b[2] * inv * inv + b[3] * inv * inv * inv;
        Self {
            one_pct: eval(&MACKINNON_CONSTANT[0]),
            five_pct: eval(&MACKINNON_CONSTANT[1]),
            ten_pct: eval(&MACKINNON_CONSTANT[2]),
        }
    }

    pub fn at(&self, level: SignificanceLevel) -> f64 {
        match level {
            SignificanceLevel::OnePercent => self.one_pct,
            SignificanceLevel::FivePercent => self.five_pct,
            SignificanceLevel::TenPercent => self.ten_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdfResult {
    pub t_statistic: f64,
    pub critical_values: CriticalValues,
    pub lag: usize,
    pub nobs: usize,
}

impl AdfResult {
    /// Whether the unit root is rejected at `level` (t-statistic below its critical value).
    pub fn rejects_at(&self, level: SignificanceLevel) -> bool {
        self.t_statistic < self.critical_values.at(level)
    }

    /// The tightest level at which the unit root is rejected.
    pub fn tightest_level(&self) -> Option<SignificanceLevel> {
        SignificanceLevel::ALL
            .into_iter()
            .find(|&level| self.rejects_at(level))
    }
}

pub fn adf_test(series: &[f64], lag: usize) -> Result<AdfResult, StratbenchError> {
    if series.iter().any(|v| !v.is_finite()) {
        return Err(StratbenchError::numeric("ADF input contains non-finite values"));
    }

    let regressors = 2 + lag;
    let n = series.len();
    // One observation lost to differencing, `lag` more to lagged differences.
    let nobs = n.saturating_sub(1 + lag);
    if nobs <= regressors {
        return Err(StratbenchError::numeric(format!(
            "ADF needs more than {} regression rows, series of {} gives {}",
            regressors, n, nobs
        )));
    }

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let x = DMatrix::from_fn(nobs, regressors, |row, col| {
        let t = row + lag;
        match col {
            0 => series[t],
            1 => 1.0,
            j => diff[t - (j - 1)],
        }
    });
    let y = DVector::from_fn(nobs, |row, _| diff[row + lag]);

    let fit = ols(&x, &y)?;
    let t_statistic = fit.t_value(0);
    if !t_statistic.is_finite() {
        return Err(StratbenchError::numeric("ADF statistic is not finite"));
    }

    Ok(AdfResult {
        t_statistic,
        critical_values: CriticalValues::for_nobs(nobs),
        lag,
        nobs,
    })
}
