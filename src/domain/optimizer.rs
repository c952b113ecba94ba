//! Grid search over (ma_threshold, ibs_threshold) for the calendar strategy.
//!
//! The grid is expanded once into an ordered list of points (ma outer, ibs
//! inner). Points may be evaluated in parallel; selection walks the results
//! in that order and adopts a point only when its score strictly beats the
//! best so far, starting from a flat baseline of zero.

use crate::domain::backtest::run_calendar_pipeline;
use crate::domain::error::StratbenchError;
use crate::domain::indicator::IndicatorRow;
use crate::domain::signal::calendar::BigMovesParams;
use rayon::prelude::*;
use tracing::{debug, warn};

const MAX_AXIS_POINTS: usize = 10_000;

/// 0.0, 0.1, ..., 0.9 on both axes.
pub const DEFAULT_AXIS: GridAxis = GridAxis {
    start: 0.0,
    stop: 1.0,
    step: 0.1,
};

/// Half-open range `start, start + step, ...` below `stop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl GridAxis {
    pub fn values(&self) -> Result<Vec<f64>, StratbenchError> {
        if !(self.start.is_finite() && self.stop.is_finite() && self.step.is_finite()) {
            return Err(StratbenchError::numeric("grid axis bounds must be finite"));
        }
        if self.step <= 0.0 {
            return Err(StratbenchError::numeric("grid axis step must be positive"));
        }
        if self.stop <= self.start {
            return Err(StratbenchError::numeric("grid axis stop must exceed start"));
        }

        let count = ((self.stop - self.start) / self.step - 1e-9).ceil() as usize;
        if count > MAX_AXIS_POINTS {
            return Err(StratbenchError::numeric(format!(
                "grid axis has {count} points, limit is {MAX_AXIS_POINTS}"
            )));
        }
        Ok((0..count)
            .map(|i| self.start + i as f64 * self.step)
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGrid {
    pub ma_thresholds: Vec<f64>,
    pub ibs_thresholds: Vec<f64>,
}

impl Default for ParameterGrid {
    fn default() -> Self {
        let values: Vec<f64> = (0..10).map(|i| f64::from(i) * DEFAULT_AXIS.step).collect();
        Self {
            ma_thresholds: values.clone(),
            ibs_thresholds: values,
        }
    }
}

impl ParameterGrid {
    pub fn from_axes(ma: GridAxis, ibs: GridAxis) -> Result<Self, StratbenchError> {
        Ok(Self {
            ma_thresholds: ma.values()?,
            ibs_thresholds: ibs.values()?,
        })
    }

    pub fn size(&self) -> usize {
        self.ma_thresholds.len() * self.ibs_thresholds.len()
    }

    /// Cartesian product in enumeration order.
    pub fn points(&self) -> Vec<BigMovesParams> {
        self.ma_thresholds
            .iter()
            .flat_map(|&ma_threshold| {
                self.ibs_thresholds.iter().map(move |&ibs_threshold| BigMovesParams {
                    ma_threshold,
                    ibs_threshold,
                })
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct GridEvaluation {
    pub params: BigMovesParams,
    pub outcome: Result<f64, StratbenchError>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredParams {
    pub params: BigMovesParams,
    pub score: f64,
}

#[derive(Debug)]
pub struct OptimizationResult {
    /// `None` when no point beat the zero baseline.
    pub best: Option<ScoredParams>,
    pub evaluations: Vec<GridEvaluation>,
}

impl OptimizationResult {
    pub fn failures(&self) -> impl Iterator<Item = &GridEvaluation> {
        self.evaluations.iter().filter(|e| e.outcome.is_err())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

/// Runs the calendar pipeline at every grid point against shared indicator rows.
pub struct GridOptimizer {
    hold_periods: usize,
    parallel: bool,
}

impl GridOptimizer {
    pub fn new(hold_periods: usize) -> Self {
        Self {
            hold_periods,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn evaluate(&self, rows: &[IndicatorRow], params: BigMovesParams) -> Result<f64, StratbenchError> {
        let wrap = |reason: String| StratbenchError::GridPointEvaluation {
            ma_threshold: params.ma_threshold,
            ibs_threshold: params.ibs_threshold,
            reason,
        };

        let run = run_calendar_pipeline(rows, params, self.hold_periods)
            .map_err(|e| wrap(e.to_string()))?;
        let score = run.pnl.total_pnl();
        if !score.is_finite() {
            return Err(wrap("cumulative PnL is not finite".into()));
        }
        Ok(score)
    }

    pub fn optimize(&self, rows: &[IndicatorRow], grid: &ParameterGrid) -> OptimizationResult {
        let points = grid.points();

        let evaluate = |params: &BigMovesParams| GridEvaluation {
            params: *params,
            outcome: self.evaluate(rows, *params),
        };
        let evaluations: Vec<GridEvaluation> = if self.parallel {
            points.par_iter().map(evaluate).collect()
        } else {
            points.iter().map(evaluate).collect()
        };

        let mut best: Option<ScoredParams> = None;
        let mut best_score = 0.0;
        for evaluation in &evaluations {
            match &evaluation.outcome {
                Ok(score) => {
                    debug!(
                        ma_threshold = evaluation.params.ma_threshold,
                        ibs_threshold = evaluation.params.ibs_threshold,
                        score,
                        "grid point evaluated"
                    );
                    if *score > best_score {
                        best_score = *score;
                        best = Some(ScoredParams {
                            params: evaluation.params,
                            score: *score,
                        });
                    }
                }
                Err(e) => warn!("skipping grid point: {e}"),
            }
        }

        OptimizationResult { best, evaluations }
    }
}
