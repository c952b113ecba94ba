//! Domain error types.

use crate::domain::pair_selection::PairAnalysis;

/// Top-level error type for stratbench.
#[derive(Debug, thiserror::Error)]
pub enum StratbenchError {
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("invalid price series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    /// Carries every combination's outcome so callers can still report them.
    #[error(
        "no cointegrated combination at any significance level ({} tested)",
        .analysis.combinations_tested()
    )]
    NoCointegratedPair { analysis: Box<PairAnalysis> },

    #[error(
        "grid point (ma_threshold={ma_threshold}, ibs_threshold={ibs_threshold}) failed: {reason}"
    )]
    GridPointEvaluation {
        ma_threshold: f64,
        ibs_threshold: f64,
        reason: String,
    },

    #[error("numeric failure: {reason}")]
    Numeric { reason: String },

    #[error("unknown strategy '{name}' (expected stat_arb or big_moves_monday)")]
    UnknownStrategy { name: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StratbenchError {
    /// Process exit status: 1 io/report, 2 config, 4 numeric or no pair, 5 data.
    pub fn exit_code(&self) -> u8 {
        match self {
            StratbenchError::Io(_) | StratbenchError::Report { .. } => 1,
            StratbenchError::ConfigParse { .. }
            | StratbenchError::ConfigMissing { .. }
            | StratbenchError::ConfigInvalid { .. }
            | StratbenchError::UnknownStrategy { .. } => 2,
            StratbenchError::Numeric { .. }
            | StratbenchError::NoCointegratedPair { .. }
            | StratbenchError::GridPointEvaluation { .. } => 4,
            StratbenchError::DataUnavailable { .. }
            | StratbenchError::InvalidSeries { .. }
            | StratbenchError::InsufficientData { .. } => 5,
        }
    }

    pub(crate) fn numeric(reason: impl Into<String>) -> Self {
        StratbenchError::Numeric {
            reason: reason.into(),
        }
    }
}

impl From<&StratbenchError> for std::process::ExitCode {
    fn from(err: &StratbenchError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
