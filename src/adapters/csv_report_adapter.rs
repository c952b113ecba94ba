//! CSV report adapter.
//!
//! Writes into one output directory:
//! - `{name}_pnl.csv`: the per-bar PnL curve of a run
//! - `summary.csv`: one row per symbol
//! - `combinations.csv`: every stat-arb combination with its ADF outcome

use crate::domain::backtest::SymbolSummary;
use crate::domain::error::StratbenchError;
use crate::domain::pair_selection::PairAnalysis;
use crate::domain::pnl::PnlSeries;
use crate::ports::report_port::ReportPort;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct CsvReportAdapter {
    output_dir: PathBuf,
}

impl CsvReportAdapter {
    pub fn new(output_dir: PathBuf) -> Result<Self, StratbenchError> {
        fs::create_dir_all(&output_dir).map_err(|e| StratbenchError::Report {
            reason: format!("failed to create {}: {e}", output_dir.display()),
        })?;
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn writer(&self, file_name: &str) -> Result<(Writer<fs::File>, PathBuf), StratbenchError> {
        let path = self.output_dir.join(file_name);
        let writer = Writer::from_path(&path).map_err(|e| report_error(&path, e))?;
        Ok((writer, path))
    }
}

fn report_error(path: &Path, e: impl std::fmt::Display) -> StratbenchError {
    StratbenchError::Report {
        reason: format!("failed to write {}: {e}", path.display()),
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl ReportPort for CsvReportAdapter {
    fn write_pnl(&self, name: &str, pnl: &PnlSeries) -> Result<(), StratbenchError> {
        let (mut w, path) = self.writer(&format!("{name}_pnl.csv"))?;
        let err = |e: csv::Error| report_error(&path, e);

        w.write_record([
            "date",
            "position",
            "period_return",
            "strategy_return",
            "cumulative_pnl",
            "buy_and_hold",
        ])
        .map_err(err)?;
        for i in 0..pnl.len() {
            w.write_record([
                pnl.dates[i].to_string(),
                pnl.positions[i].to_string(),
                opt(pnl.period_returns[i]),
                opt(pnl.strategy_returns[i]),
                pnl.cumulative_pnl[i].to_string(),
                pnl.buy_and_hold[i].to_string(),
            ])
            .map_err(err)?;
        }
        w.flush().map_err(|e| report_error(&path, e))?;

        info!(path = %path.display(), "wrote PnL curve");
        Ok(())
    }

    fn write_summary(&self, summaries: &[&SymbolSummary]) -> Result<(), StratbenchError> {
        let (mut w, path) = self.writer("summary.csv")?;
        let err = |e: csv::Error| report_error(&path, e);

        w.write_record([
            "symbol",
            "ma_threshold",
            "ibs_threshold",
            "buy_and_hold_return",
            "strategy_return",
            "exposure",
            "max_drawdown",
        ])
        .map_err(err)?;
        for s in summaries {
            w.write_record([
                s.symbol.clone(),
                opt(s.params.map(|p| p.ma_threshold)),
                opt(s.params.map(|p| p.ibs_threshold)),
                s.pnl.buy_and_hold_return.to_string(),
                s.pnl.strategy_return.to_string(),
                s.pnl.exposure.to_string(),
                s.pnl.max_drawdown.to_string(),
            ])
            .map_err(err)?;
        }
        w.flush().map_err(|e| report_error(&path, e))?;

        info!(path = %path.display(), rows = summaries.len(), "wrote summary");
        Ok(())
    }

    fn write_combinations(&self, analysis: &PairAnalysis) -> Result<(), StratbenchError> {
        let (mut w, path) = self.writer("combinations.csv")?;
        let err = |e: csv::Error| report_error(&path, e);

        w.write_record([
            "combination",
            "hedge_ratio",
            "t_statistic",
            "cv_1pct",
            "cv_5pct",
            "cv_10pct",
            "cointegrated_at",
            "error",
        ])
        .map_err(err)?;
        for r in &analysis.results {
            let hedge = r
                .hedge_ratio
                .coefficients
                .iter()
                .map(|(symbol, beta)| format!("{symbol}={beta}"))
                .collect::<Vec<_>>()
                .join(" ");
            w.write_record([
                r.combination.to_string(),
                hedge,
                r.adf.t_statistic.to_string(),
                r.adf.critical_values.one_pct.to_string(),
                r.adf.critical_values.five_pct.to_string(),
                r.adf.critical_values.ten_pct.to_string(),
                r.cointegrated_at.map(|l| l.to_string()).unwrap_or_default(),
                String::new(),
            ])
            .map_err(err)?;
        }
        for f in &analysis.failures {
            w.write_record([
                f.combination.to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                f.reason.clone(),
            ])
            .map_err(err)?;
        }
        w.flush().map_err(|e| report_error(&path, e))?;

        info!(path = %path.display(), "wrote combination table");
        Ok(())
    }
}
