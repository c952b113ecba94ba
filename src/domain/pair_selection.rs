//! Hedge-ratio regressions and cointegration screening across symbol combinations.
//!
//! For N aligned symbols every choice of one dependent symbol (with the other
//! N-1 as basis) is fitted by OLS without intercept over the formation window.
//! The full-history residual spread is then ADF-tested. The combination with
//! the most negative t-statistic among those rejecting a unit root at any
//! level wins.

use crate::domain::adf::{adf_test, AdfResult, SignificanceLevel};
use crate::domain::error::StratbenchError;
use crate::domain::price::AlignedPrices;
use crate::domain::regression::ols;
use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use std::fmt;
use tracing::{info, warn};

pub const DEFAULT_FORMATION_BARS: usize = 90;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Combination {
    pub basis: Vec<String>,
    pub dependent: String,
}

impl Combination {
    /// True when `symbol` takes part in the combination.
    pub fn involves(&self, symbol: &str) -> bool {
        self.dependent == symbol || self.basis.iter().any(|s| s == symbol)
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ {}", self.dependent, self.basis.join(" + "))
    }
}

/// Coefficients mapping basis prices to the dependent price, in basis order.
#[derive(Debug, Clone, PartialEq)]
pub struct HedgeRatio {
    pub coefficients: Vec<(String, f64)>,
}

impl HedgeRatio {
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, c)| *c)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl SpreadSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CombinationResult {
    pub combination: Combination,
    pub hedge_ratio: HedgeRatio,
    pub spread: SpreadSeries,
    pub adf: AdfResult,
    pub cointegrated_at: Option<SignificanceLevel>,
}

#[derive(Debug, Clone)]
pub struct CombinationFailure {
    pub combination: Combination,
    pub reason: String,
}

/// Every combination's outcome. When none qualifies the analysis travels
/// inside [`StratbenchError::NoCointegratedPair`].
#[derive(Debug, Clone)]
pub struct PairAnalysis {
    pub results: Vec<CombinationResult>,
    pub failures: Vec<CombinationFailure>,
}

/// Index into [`PairAnalysis::results`] plus the tightest qualifying level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSelection {
    pub index: usize,
    pub level: SignificanceLevel,
}

impl PairAnalysis {
    pub fn chosen(&self, selection: PairSelection) -> &CombinationResult {
        &self.results[selection.index]
    }

    pub fn combinations_tested(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Lowest t-statistic among cointegrated combinations; ties keep the earlier one.
    pub fn select(&self) -> Option<PairSelection> {
        let mut best: Option<PairSelection> = None;
        for (index, result) in self.results.iter().enumerate() {
            let Some(level) = result.cointegrated_at else {
                continue;
            };
            let better = match best {
                None => true,
                Some(b) => result.adf.t_statistic < self.results[b.index].adf.t_statistic,
            };
            if better {
                best = Some(PairSelection { index, level });
            }
        }

        best
    }
}

/// Combinations in enumeration order: basis sets of size N-1 in lexicographic
/// index order, which drops the last symbol first.
pub fn enumerate_combinations(symbols: &[String]) -> Vec<Combination> {
    (0..symbols.len())
        .rev()
        .map(|dependent| Combination {
            basis: symbols
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != dependent)
                .map(|(_, s)| s.clone())
                .collect(),
            dependent: symbols[dependent].clone(),
        })
        .collect()
}

pub fn fit_hedge_ratio(
    prices: &AlignedPrices,
    combination: &Combination,
    formation_bars: usize,
) -> Result<HedgeRatio, StratbenchError> {
    let basis_columns = combination
        .basis
        .iter()
        .map(|s| column(prices, s))
        .collect::<Result<Vec<_>, _>>()?;
    let dependent = column(prices, &combination.dependent)?;

    let rows = formation_bars.min(prices.len());
    let x = DMatrix::from_fn(rows, basis_columns.len(), |r, c| basis_columns[c][r]);
    let y = DVector::from_fn(rows, |r, _| dependent[r]);
    let fit = ols(&x, &y)?;

    Ok(HedgeRatio {
        coefficients: combination
            .basis
            .iter()
            .cloned()
            .zip(fit.params.iter().copied())
            .collect(),
    })
}

/// dependent - Σ coefficient × basis, over the full aligned history.
pub fn compute_spread(
    prices: &AlignedPrices,
    combination: &Combination,
    hedge_ratio: &HedgeRatio,
) -> Result<SpreadSeries, StratbenchError> {
    let mut values = column(prices, &combination.dependent)?.to_vec();
    for (symbol, coefficient) in &hedge_ratio.coefficients {
        let basis = column(prices, symbol)?;
        for (v, b) in values.iter_mut().zip(basis) {
            *v -= coefficient * b;
        }
    }
    Ok(SpreadSeries {
        dates: prices.dates.clone(),
        values,
    })
}

pub fn analyse_combinations(
    prices: &AlignedPrices,
    formation_bars: usize,
    adf_lag: usize,
) -> Result<PairAnalysis, StratbenchError> {
    if prices.symbols.len() < 2 {
        return Err(StratbenchError::InsufficientData {
            symbol: prices.symbols.join(","),
            bars: prices.symbols.len(),
            minimum: 2,
        });
    }
    if prices.len() < formation_bars {
        return Err(StratbenchError::InsufficientData {
            symbol: prices.symbols.join(","),
            bars: prices.len(),
            minimum: formation_bars,
        });
    }

    let mut results = Vec::new();
    let mut failures = Vec::new();

    for combination in enumerate_combinations(&prices.symbols) {
        let outcome = fit_hedge_ratio(prices, &combination, formation_bars).and_then(|hr| {
            let spread = compute_spread(prices, &combination, &hr)?;
            let adf = adf_test(&spread.values, adf_lag)?;
            Ok((hr, spread, adf))
        });

        match outcome {
            Ok((hedge_ratio, spread, adf)) => {
                let cointegrated_at = adf.tightest_level();
                info!(
                    combination = %combination,
                    t_statistic = adf.t_statistic,
                    cv_1 = adf.critical_values.one_pct,
                    cv_5 = adf.critical_values.five_pct,
                    cv_10 = adf.critical_values.ten_pct,
                    "ADF result"
                );
                results.push(CombinationResult {
                    combination,
                    hedge_ratio,
                    spread,
                    adf,
                    cointegrated_at,
                });
            }
            Err(e) => {
                warn!(combination = %combination, "combination skipped: {e}");
                failures.push(CombinationFailure {
                    combination,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(PairAnalysis { results, failures })
}

/// Analyse and select in one step. The analysis comes back with the
/// selection, or inside the error when nothing qualifies, so callers can
/// report every combination either way.
pub fn select_pair(
    prices: &AlignedPrices,
    formation_bars: usize,
    adf_lag: usize,
) -> Result<(PairAnalysis, PairSelection), StratbenchError> {
    let analysis = analyse_combinations(prices, formation_bars, adf_lag)?;
    let Some(selection) = analysis.select() else {
        warn!(
            combinations = analysis.combinations_tested(),
            "no combination rejects a unit root at any level"
        );
        return Err(StratbenchError::NoCointegratedPair {
            analysis: Box::new(analysis),
        });
    };
    let chosen = analysis.chosen(selection);
    info!(
        combination = %chosen.combination,
        t_statistic = chosen.adf.t_statistic,
        "chosen combination at {} level of significance",
        selection.level
    );
    Ok((analysis, selection))
}

fn column<'a>(prices: &'a AlignedPrices, symbol: &str) -> Result<&'a [f64], StratbenchError> {
    prices
        .column(symbol)
        .ok_or_else(|| StratbenchError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: "symbol missing from aligned prices".into(),
        })
}
