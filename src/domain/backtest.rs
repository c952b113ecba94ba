//! Strategy pipelines.
//!
//! Stat-arb: align -> pair selection -> band signals -> two-track positions
//! -> spread PnL. Big moves on Monday: indicator rows -> grid search ->
//! re-run at the best point -> log-return PnL, once per symbol.

use crate::domain::adf::DEFAULT_ADF_LAG;
use crate::domain::error::StratbenchError;
use crate::domain::indicator::{compute_indicator_rows, IndicatorRow, DEFAULT_RANGE_WINDOW};
use crate::domain::metrics::PnlSummary;
use crate::domain::optimizer::{GridOptimizer, OptimizationResult, ParameterGrid};
use crate::domain::pair_selection::{
    select_pair, CombinationResult, PairAnalysis, PairSelection, DEFAULT_FORMATION_BARS,
};
use crate::domain::pnl::{accumulate_executed_pnl, accumulate_pnl, PnlSeries, ReturnKind};
use crate::domain::position::{
    calendar_positions, mean_reversion_positions, MeanReversionPositions, DEFAULT_HOLD_PERIODS,
};
use crate::domain::price::{AlignedPrices, PriceSeries};
use crate::domain::signal::calendar::{big_moves_monday_signals, BigMovesParams, CalendarSignals};
use crate::domain::signal::mean_reversion::{
    mean_reversion_signals, MeanReversionParams, MeanReversionSignals,
};
use crate::domain::universe::{SkipReason, SkippedSymbol};
use chrono::NaiveDate;
use tracing::{info, warn};

/// Fewest bars a calendar run accepts; one return needs two prices.
pub const MIN_CALENDAR_BARS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct StatArbConfig {
    pub formation_bars: usize,
    pub adf_lag: usize,
    pub mean_reversion: MeanReversionParams,
}

impl Default for StatArbConfig {
    fn default() -> Self {
        Self {
            formation_bars: DEFAULT_FORMATION_BARS,
            adf_lag: DEFAULT_ADF_LAG,
            mean_reversion: MeanReversionParams {
                lookback: 15,
                band_multiplier: 1.0,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatArbRun {
    pub prices: AlignedPrices,
    pub analysis: PairAnalysis,
    pub selection: PairSelection,
    pub signals: MeanReversionSignals,
    pub positions: MeanReversionPositions,
    pub pnl: PnlSeries,
    pub summary: PnlSummary,
}

impl StatArbRun {
    pub fn chosen(&self) -> &CombinationResult {
        self.analysis.chosen(self.selection)
    }
}

pub fn run_stat_arb(
    series: &[PriceSeries],
    config: &StatArbConfig,
) -> Result<StatArbRun, StratbenchError> {
    config.mean_reversion.validate()?;

    let prices = AlignedPrices::align(series);
    info!(
        symbols = prices.symbols.len(),
        bars = prices.len(),
        "aligned prices on common dates"
    );

    let (analysis, selection) = select_pair(&prices, config.formation_bars, config.adf_lag)?;
    let chosen = analysis.chosen(selection);

    let signals = mean_reversion_signals(&chosen.spread.values, config.mean_reversion)?;
    let positions = mean_reversion_positions(&signals);
    let pnl = accumulate_pnl(
        &chosen.spread.dates,
        &chosen.spread.values,
        &positions.combined,
        ReturnKind::Difference,
    )?;
    let summary = PnlSummary::compute(&pnl);
    info!(
        combination = %chosen.combination,
        total_pnl = summary.strategy_return,
        "stat-arb run complete"
    );

    Ok(StatArbRun {
        prices,
        analysis,
        selection,
        signals,
        positions,
        pnl,
        summary,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct BigMovesConfig {
    pub range_window: usize,
    pub hold_periods: usize,
    pub grid: ParameterGrid,
    pub parallel: bool,
}

impl Default for BigMovesConfig {
    fn default() -> Self {
        Self {
            range_window: DEFAULT_RANGE_WINDOW,
            hold_periods: DEFAULT_HOLD_PERIODS,
            grid: ParameterGrid::default(),
            parallel: true,
        }
    }
}

/// One evaluation of the calendar strategy at fixed thresholds.
#[derive(Debug, Clone)]
pub struct CalendarRun {
    pub params: BigMovesParams,
    pub signals: CalendarSignals,
    pub positions: Vec<i8>,
    pub pnl: PnlSeries,
}

pub fn run_calendar_pipeline(
    rows: &[IndicatorRow],
    params: BigMovesParams,
    hold_periods: usize,
) -> Result<CalendarRun, StratbenchError> {
    let signals = big_moves_monday_signals(rows, params)?;
    let positions = calendar_positions(&signals, hold_periods);
    let pnl = calendar_pnl(rows, &positions)?;
    Ok(CalendarRun {
        params,
        signals,
        positions,
        pnl,
    })
}

/// Calendar positions come from the lagged signal, so they already sit on
/// their execution bar and earn that bar's return.
fn calendar_pnl(rows: &[IndicatorRow], positions: &[i8]) -> Result<PnlSeries, StratbenchError> {
    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.adj_close).collect();
    accumulate_executed_pnl(&dates, &closes, positions, ReturnKind::Log)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSummary {
    pub symbol: String,
    /// `None` when no grid point beat the flat baseline.
    pub params: Option<BigMovesParams>,
    pub pnl: PnlSummary,
}

#[derive(Debug)]
pub struct BigMovesRun {
    pub symbol: String,
    pub rows: Vec<IndicatorRow>,
    pub optimization: OptimizationResult,
    /// Re-run at the winning point, if any.
    pub best: Option<CalendarRun>,
    /// PnL of the chosen run, or an all-flat run carrying the buy-and-hold baseline.
    pub pnl: PnlSeries,
    pub summary: SymbolSummary,
}

pub fn run_big_moves_monday(
    series: &PriceSeries,
    config: &BigMovesConfig,
) -> Result<BigMovesRun, StratbenchError> {
    if series.len() < MIN_CALENDAR_BARS {
        return Err(StratbenchError::InsufficientData {
            symbol: series.symbol().to_string(),
            bars: series.len(),
            minimum: MIN_CALENDAR_BARS,
        });
    }

    let rows = compute_indicator_rows(series, config.range_window);
    let optimization = GridOptimizer::new(config.hold_periods)
        .with_parallelism(config.parallel)
        .optimize(&rows, &config.grid);

    let failures = optimization.failure_count();
    if failures > 0 {
        warn!(
            symbol = series.symbol(),
            "{failures} of {} grid points failed",
            optimization.evaluations.len()
        );
    }

    let best = match optimization.best {
        Some(scored) => {
            info!(
                symbol = series.symbol(),
                ma_threshold = scored.params.ma_threshold,
                ibs_threshold = scored.params.ibs_threshold,
                score = scored.score,
                "best parameters"
            );
            Some(run_calendar_pipeline(&rows, scored.params, config.hold_periods)?)
        }
        None => {
            info!(
                symbol = series.symbol(),
                "no grid point beat the flat baseline"
            );
            None
        }
    };

    let pnl = match &best {
        Some(run) => run.pnl.clone(),
        None => calendar_pnl(&rows, &vec![0; rows.len()])?,
    };
    let summary = SymbolSummary {
        symbol: series.symbol().to_string(),
        params: best.as_ref().map(|run| run.params),
        pnl: PnlSummary::compute(&pnl),
    };

    Ok(BigMovesRun {
        symbol: series.symbol().to_string(),
        rows,
        optimization,
        best,
        pnl,
        summary,
    })
}

#[derive(Debug)]
pub struct BigMovesBatch {
    pub runs: Vec<BigMovesRun>,
    pub skipped: Vec<SkippedSymbol>,
}

impl BigMovesBatch {
    pub fn summaries(&self) -> Vec<&SymbolSummary> {
        self.runs.iter().map(|r| &r.summary).collect()
    }
}

/// Runs every symbol in sequence. A symbol whose run fails is skipped.
pub fn run_big_moves_batch(
    series: &[PriceSeries],
    config: &BigMovesConfig,
) -> BigMovesBatch {
    let mut runs = Vec::with_capacity(series.len());
    let mut skipped = Vec::new();

    for s in series {
        match run_big_moves_monday(s, config) {
            Ok(run) => runs.push(run),
            Err(e) => {
                warn!(symbol = s.symbol(), "skipping symbol: {e}");
                skipped.push(SkippedSymbol {
                    symbol: s.symbol().to_string(),
                    reason: SkipReason::Unavailable(e.to_string()),
                });
            }
        }
    }

    BigMovesBatch { runs, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::PriceBar;
    use approx::assert_relative_eq;

    fn flat_series(symbol: &str, n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..n)
            .map(|i| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                adj_close: 100.0,
                volume: 1_000,
            })
            .collect();
        PriceSeries::new(symbol, bars).unwrap()
    }

    fn small_grid() -> ParameterGrid {
        ParameterGrid {
            ma_thresholds: vec![0.1, 0.2],
            ibs_thresholds: vec![0.3, 0.5],
        }
    }

    #[test]
    fn stat_arb_defaults() {
        let c = StatArbConfig::default();
        assert_eq!(c.formation_bars, 90);
        assert_eq!(c.adf_lag, 1);
        assert_eq!(c.mean_reversion.lookback, 15);
        assert_relative_eq!(c.mean_reversion.band_multiplier, 1.0);
    }

    #[test]
    fn stat_arb_rejects_bad_params_before_work() {
        let config = StatArbConfig {
            mean_reversion: MeanReversionParams {
                lookback: 1,
                band_multiplier: 1.0,
            },
            ..StatArbConfig::default()
        };
        let err = run_stat_arb(&[], &config).unwrap_err();
        assert!(matches!(err, StratbenchError::ConfigInvalid { key, .. } if key == "lookback"));
    }

    #[test]
    fn stat_arb_needs_two_symbols() {
        let err = run_stat_arb(&[flat_series("A", 120)], &StatArbConfig::default()).unwrap_err();
        assert!(matches!(err, StratbenchError::InsufficientData { .. }));
    }

    #[test]
    fn flat_prices_never_trade() {
        let config = BigMovesConfig {
            grid: small_grid(),
            parallel: false,
            ..BigMovesConfig::default()
        };
        let run = run_big_moves_monday(&flat_series("FLAT", 40), &config).unwrap();
        assert!(run.best.is_none());
        assert!(run.summary.params.is_none());
        assert_eq!(run.optimization.evaluations.len(), 4);
        assert_relative_eq!(run.summary.pnl.strategy_return, 0.0);
        assert_relative_eq!(run.summary.pnl.buy_and_hold_return, 0.0);
        assert_eq!(run.pnl.len(), 40);
    }

    #[test]
    fn single_bar_is_insufficient() {
        let err = run_big_moves_monday(&flat_series("ONE", 1), &BigMovesConfig::default())
            .unwrap_err();
        assert!(matches!(err, StratbenchError::InsufficientData { minimum: 2, .. }));
    }

    #[test]
    fn batch_skips_failed_symbols() {
        let config = BigMovesConfig {
            grid: small_grid(),
            ..BigMovesConfig::default()
        };
        let batch = run_big_moves_batch(&[flat_series("OK", 30), flat_series("SHORT", 1)], &config);
        assert_eq!(batch.runs.len(), 1);
        assert_eq!(batch.summaries()[0].symbol, "OK");
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].symbol, "SHORT");
    }
}
