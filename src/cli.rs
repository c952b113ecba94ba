//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{
    run_big_moves_batch, run_stat_arb, BigMovesConfig, StatArbConfig, StatArbRun, SymbolSummary,
    MIN_CALENDAR_BARS,
};
use crate::domain::config_validation::{
    optional_string, read_axis, read_bool, read_date, read_number, read_symbols,
    require_string, validate_data_config, validate_strategy_config, DATA_SECTION,
    REPORT_SECTION,
};
use crate::domain::error::StratbenchError;
use crate::domain::optimizer::ParameterGrid;
use crate::domain::pair_selection::PairAnalysis;
use crate::domain::signal::mean_reversion::MeanReversionParams;
use crate::domain::strategy::StrategyKind;
use crate::domain::universe::{fetch_universe, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "stratbench",
    about = "Backtests a pairs mean-reversion and a big-moves-on-Monday strategy"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest (stat_arb or big_moves_monday)
    Backtest {
        strategy: String,
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding the strategy section
        #[arg(long)]
        symbols: Option<String>,
        /// Directory for CSV reports, overriding [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file without fetching data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
        /// Validate only this strategy's section
        #[arg(long)]
        strategy: Option<String>,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn execute(command: Command) -> Result<(), StratbenchError> {
    match command {
        Command::Backtest {
            strategy,
            config,
            symbols,
            output,
        } => run_backtest(&strategy, &config, symbols.as_deref(), output.as_deref()),
        Command::Validate { config, strategy } => run_validate(&config, strategy.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, StratbenchError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub directory: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub fn build_data_config(config: &dyn ConfigPort) -> Result<DataConfig, StratbenchError> {
    Ok(DataConfig {
        directory: PathBuf::from(require_string(config, DATA_SECTION, "directory")?),
        start_date: read_date(config, DATA_SECTION, "start_date")?,
        end_date: read_date(config, DATA_SECTION, "end_date")?,
    })
}

pub fn build_stat_arb_config(config: &dyn ConfigPort) -> Result<StatArbConfig, StratbenchError> {
    let section = StrategyKind::StatArb.section();
    let defaults = StatArbConfig::default();
    Ok(StatArbConfig {
        formation_bars: read_number(config, section, "formation_bars", defaults.formation_bars)?,
        adf_lag: defaults.adf_lag,
        mean_reversion: MeanReversionParams {
            lookback: read_number(config, section, "lookback", defaults.mean_reversion.lookback)?,
            band_multiplier: read_number(
                config,
                section,
                "band_multiplier",
                defaults.mean_reversion.band_multiplier,
            )?,
        },
    })
}

pub fn build_big_moves_config(config: &dyn ConfigPort) -> Result<BigMovesConfig, StratbenchError> {
    let section = StrategyKind::BigMovesMonday.section();
    let defaults = BigMovesConfig::default();
    Ok(BigMovesConfig {
        range_window: read_number(config, section, "range_window", defaults.range_window)?,
        hold_periods: read_number(config, section, "hold_periods", defaults.hold_periods)?,
        grid: ParameterGrid::from_axes(
            read_axis(config, section, "ma_threshold")?,
            read_axis(config, section, "ibs_threshold")?,
        )?,
        parallel: read_bool(config, section, "parallel", defaults.parallel)?,
    })
}

/// `--symbols` wins over the strategy section's `symbols` key.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<Vec<String>, StratbenchError> {
    match symbols_override {
        Some(raw) => parse_symbols(raw).map_err(|e| StratbenchError::ConfigInvalid {
            section: "command line".into(),
            key: "symbols".into(),
            reason: e.to_string(),
        }),
        None => read_symbols(config, kind.section()),
    }
}

fn run_backtest(
    strategy: &str,
    config_path: &Path,
    symbols_override: Option<&str>,
    output_override: Option<&Path>,
) -> Result<(), StratbenchError> {
    // Resolve the strategy before touching any file.
    let kind: StrategyKind = strategy.parse()?;

    let config = load_config(config_path)?;
    validate_data_config(&config)?;
    if symbols_override.is_none() || config.has_section(kind.section()) {
        validate_strategy_config(&config, kind)?;
    }

    let data = build_data_config(&config)?;
    let symbols = resolve_symbols(symbols_override, &config, kind)?;
    let data_port = CsvAdapter::new(data.directory.clone());

    let output_dir = output_override
        .map(Path::to_path_buf)
        .or_else(|| optional_string(&config, REPORT_SECTION, "output_dir").map(PathBuf::from));
    let report = output_dir.map(CsvReportAdapter::new).transpose()?;
    let report = report.as_ref().map(|r| r as &dyn ReportPort);

    info!(
        strategy = %kind,
        symbols = %symbols.join(","),
        start = %data.start_date,
        end = %data.end_date,
        "running backtest"
    );

    match kind {
        StrategyKind::StatArb => {
            let cfg = build_stat_arb_config(&config)?;
            run_stat_arb_command(&data_port, &data, &symbols, &cfg, report)
        }
        StrategyKind::BigMovesMonday => {
            let cfg = build_big_moves_config(&config)?;
            run_big_moves_command(&data_port, &data, &symbols, &cfg, report)
        }
    }
}

pub fn run_stat_arb_command(
    data_port: &dyn DataPort,
    data: &DataConfig,
    symbols: &[String],
    cfg: &StatArbConfig,
    report: Option<&dyn ReportPort>,
) -> Result<(), StratbenchError> {
    let universe = fetch_universe(
        data_port,
        symbols,
        data.start_date,
        data.end_date,
        cfg.formation_bars,
    )?;
    if !universe.skipped.is_empty() {
        let skipped: Vec<&str> = universe.skipped.iter().map(|s| s.symbol.as_str()).collect();
        println!("Skipped: {}", skipped.join(", "));
    }

    let run = match run_stat_arb(&universe.series, cfg) {
        Ok(run) => run,
        Err(StratbenchError::NoCointegratedPair { analysis }) => {
            // Still show what was tested before failing.
            print!("{}", format_combination_table(&analysis));
            if let Some(report) = report {
                report.write_combinations(&analysis)?;
            }
            return Err(StratbenchError::NoCointegratedPair { analysis });
        }
        Err(e) => return Err(e),
    };

    print!("{}", format_combination_table(&run.analysis));
    print!("{}", format_stat_arb_result(&run));

    if let Some(report) = report {
        report.write_combinations(&run.analysis)?;
        report.write_pnl(StrategyKind::StatArb.name(), &run.pnl)?;
    }
    Ok(())
}

pub fn run_big_moves_command(
    data_port: &dyn DataPort,
    data: &DataConfig,
    symbols: &[String],
    cfg: &BigMovesConfig,
    report: Option<&dyn ReportPort>,
) -> Result<(), StratbenchError> {
    let universe = fetch_universe(
        data_port,
        symbols,
        data.start_date,
        data.end_date,
        MIN_CALENDAR_BARS,
    )?;
    let batch = run_big_moves_batch(&universe.series, cfg);
    if batch.runs.is_empty() {
        return Err(StratbenchError::DataUnavailable {
            symbol: symbols.join(","),
            reason: "no symbol completed a backtest".into(),
        });
    }

    let summaries = batch.summaries();
    print!("{}", format_summary_table(&summaries));

    let skipped: Vec<&str> = universe
        .skipped
        .iter()
        .chain(&batch.skipped)
        .map(|s| s.symbol.as_str())
        .collect();
    if !skipped.is_empty() {
        println!("Skipped: {}", skipped.join(", "));
    }

    if let Some(report) = report {
        for run in &batch.runs {
            report.write_pnl(&run.symbol, &run.pnl)?;
        }
        report.write_summary(&summaries)?;
    }
    Ok(())
}

pub fn format_combination_table(analysis: &PairAnalysis) -> String {
    let mut out = format!("Combinations tested: {}\n", analysis.combinations_tested());
    for r in &analysis.results {
        let verdict = match r.cointegrated_at {
            Some(level) => format!("cointegrated at {level}"),
            None => "not cointegrated".to_string(),
        };
        out.push_str(&format!(
            "  {:<30} t={:>8.4}  cv(1%/5%/10%)={:.3}/{:.3}/{:.3}  {}\n",
            r.combination.to_string(),
            r.adf.t_statistic,
            r.adf.critical_values.one_pct,
            r.adf.critical_values.five_pct,
            r.adf.critical_values.ten_pct,
            verdict
        ));
    }
    for f in &analysis.failures {
        out.push_str(&format!("  {:<30} failed: {}\n", f.combination.to_string(), f.reason));
    }
    out
}

pub fn format_stat_arb_result(run: &StatArbRun) -> String {
    let chosen = run.chosen();
    let hedge = chosen
        .hedge_ratio
        .coefficients
        .iter()
        .map(|(symbol, beta)| format!("{symbol}={beta:.4}"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = String::new();
    out.push_str(&format!(
        "\nChosen: {} at {} level of significance\n",
        chosen.combination, run.selection.level
    ));
    out.push_str(&format!("Hedge ratio:      {hedge}\n"));
    out.push_str(&format!("Total PnL:        {:.2}\n", run.summary.strategy_return));
    out.push_str(&format!("Spread change:    {:.2}\n", run.summary.buy_and_hold_return));
    out.push_str(&format!("Exposure:         {:.1}%\n", run.summary.exposure * 100.0));
    out.push_str(&format!("Max drawdown:     {:.2}\n", run.summary.max_drawdown));
    out
}

/// Returns are rounded for display only.
pub fn format_summary_table(summaries: &[&SymbolSummary]) -> String {
    let mut out = format!(
        "{:<8} {:>12} {:>13} {:>12} {:>12} {:>9} {:>10}\n",
        "symbol", "ma_threshold", "ibs_threshold", "buy_and_hold", "strategy", "exposure", "max_dd"
    );
    for s in summaries {
        let (ma, ibs) = match s.params {
            Some(p) => (format!("{:.2}", p.ma_threshold), format!("{:.2}", p.ibs_threshold)),
            None => ("-".to_string(), "-".to_string()),
        };
        out.push_str(&format!(
            "{:<8} {:>12} {:>13} {:>12.2} {:>12.2} {:>8.1}% {:>10.2}\n",
            s.symbol,
            ma,
            ibs,
            s.pnl.buy_and_hold_return,
            s.pnl.strategy_return,
            s.pnl.exposure * 100.0,
            s.pnl.max_drawdown
        ));
    }
    out
}

fn run_validate(config_path: &Path, strategy: Option<&str>) -> Result<(), StratbenchError> {
    let kinds: Vec<StrategyKind> = match strategy {
        Some(name) => vec![name.parse()?],
        None => Vec::new(),
    };

    let config = load_config(config_path)?;
    validate_data_config(&config)?;

    let kinds = if kinds.is_empty() {
        StrategyKind::ALL
            .into_iter()
            .filter(|k| config.has_section(k.section()))
            .collect()
    } else {
        kinds
    };
    if kinds.is_empty() {
        return Err(StratbenchError::ConfigMissing {
            section: "stat_arb or big_moves_monday".into(),
            key: "symbols".into(),
        });
    }

    for kind in &kinds {
        validate_strategy_config(&config, *kind)?;
        eprintln!("[{kind}] ok");
    }
    eprintln!("Configuration is valid.");
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), StratbenchError> {
    let config = load_config(config_path)?;
    let directory = require_string(&config, DATA_SECTION, "directory")?;
    let adapter = CsvAdapter::new(PathBuf::from(directory));

    let symbols = adapter.list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{symbol}");
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}
