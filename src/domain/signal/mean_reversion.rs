//! Band mean-reversion on a spread.
//!
//! - middle: trailing mean over `lookback` bars
//! - upper / lower: middle ± band_multiplier × trailing sample std
//! - long entry below the lower band, long exit at or above the middle
//! - short entry above the upper band, short exit at or below the middle
//!
//! Comparisons against an undefined band are false.

use crate::domain::error::StratbenchError;
use crate::domain::indicator::rolling::{rolling_mean, rolling_stddev};
use crate::domain::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanReversionParams {
    pub lookback: usize,
    pub band_multiplier: f64,
}

impl MeanReversionParams {
    pub fn validate(&self) -> Result<(), StratbenchError> {
        if self.lookback < 2 {
            return Err(StratbenchError::ConfigInvalid {
                section: "stat_arb".into(),
                key: "lookback".into(),
                reason: "lookback must be at least 2".into(),
            });
        }
        if !(self.band_multiplier.is_finite() && self.band_multiplier > 0.0) {
            return Err(StratbenchError::ConfigInvalid {
                section: "stat_arb".into(),
                key: "band_multiplier".into(),
                reason: "band_multiplier must be positive".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionSignals {
    pub moving_average: Vec<Option<f64>>,
    pub moving_std: Vec<Option<f64>>,
    pub upper_band: Vec<Option<f64>>,
    pub lower_band: Vec<Option<f64>>,
    pub long_entry: Vec<bool>,
    pub long_exit: Vec<bool>,
    pub short_entry: Vec<bool>,
    pub short_exit: Vec<bool>,
}

impl MeanReversionSignals {
    pub fn len(&self) -> usize {
        self.long_entry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.long_entry.is_empty()
    }

    /// Entry signal per bar: undefined until the bands exist.
    pub fn entry_signals(&self) -> Vec<Option<Signal>> {
        (0..self.len())
            .map(|i| {
                self.upper_band[i].map(|_| {
                    if self.long_entry[i] {
                        Signal::Long
                    } else if self.short_entry[i] {
                        Signal::Short
                    } else {
                        Signal::Flat
                    }
                })
            })
            .collect()
    }
}

pub fn mean_reversion_signals(
    spread: &[f64],
    params: MeanReversionParams,
) -> Result<MeanReversionSignals, StratbenchError> {
    params.validate()?;

    let moving_average = rolling_mean(spread, params.lookback);
    let moving_std = rolling_stddev(spread, params.lookback);

    let band = |sign: f64| -> Vec<Option<f64>> {
        moving_average
            .iter()
            .zip(&moving_std)
            .map(|(m, s)| Some(m.as_ref()? + sign * params.band_multiplier * s.as_ref()?))
            .collect()
    };
    let upper_band = band(1.0);
    let lower_band = band(-1.0);

    let compare = |reference: &[Option<f64>], test: fn(f64, f64) -> bool| -> Vec<bool> {
        spread
            .iter()
            .zip(reference)
            .map(|(&v, r)| r.is_some_and(|r| test(v, r)))
            .collect()
    };

    Ok(MeanReversionSignals {
        long_entry: compare(&lower_band, |v, r| v < r),
        long_exit: compare(&moving_average, |v, r| v >= r),
        short_entry: compare(&upper_band, |v, r| v > r),
        short_exit: compare(&moving_average, |v, r| v <= r),
        moving_average,
        moving_std,
        upper_band,
        lower_band,
    })
}
