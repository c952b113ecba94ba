//! Report sink port.

use crate::domain::backtest::SymbolSummary;
use crate::domain::error::StratbenchError;
use crate::domain::pair_selection::PairAnalysis;
use crate::domain::pnl::PnlSeries;

/// Consumer of finished runs. Implementations decide the format.
pub trait ReportPort {
    /// Per-bar curve: position, returns, cumulative PnL and buy-and-hold baseline.
    fn write_pnl(&self, name: &str, pnl: &PnlSeries) -> Result<(), StratbenchError>;

    /// One row per symbol: chosen parameters and headline returns.
    fn write_summary(&self, summaries: &[&SymbolSummary]) -> Result<(), StratbenchError>;

    /// Every tested combination with its ADF outcome.
    fn write_combinations(&self, analysis: &PairAnalysis) -> Result<(), StratbenchError>;
}
