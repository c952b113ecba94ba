//! CLI integration tests against real files on disk.
//!
//! Tests cover:
//! - Argument parsing for every subcommand
//! - Backtests of both strategies reading Yahoo-style CSV files
//! - Report output from `--output` and from `[report] output_dir`
//! - Validation and symbol listing
//! - Failures that must stop before any data is read
//! - A universe with no cointegrated pair still reporting its combinations

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::path::{Path, PathBuf};
use stratbench::cli::{self, Cli, Command};
use stratbench::domain::error::StratbenchError;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Price files for the cointegrated universe plus one calendar symbol.
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let prices = dir.path().join("prices");
        fs::create_dir_all(&prices).unwrap();
        for series in cointegrated_universe(200) {
            write_series(&prices, &series);
        }
        write_series(&prices, &monday_gap_series("SPY"));
        Self { dir }
    }

    /// Price files for two symbols that never cointegrate.
    fn diverging() -> Self {
        let dir = TempDir::new().unwrap();
        let prices = dir.path().join("prices");
        fs::create_dir_all(&prices).unwrap();
        for series in diverging_universe(200) {
            write_series(&prices, &series);
        }
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_config(&self, extra: &str) -> PathBuf {
        let content = format!(
            "[data]\ndirectory = {}\nstart_date = 2019-01-01\nend_date = 2025-12-31\n\n{extra}",
            self.path("prices").display()
        );
        let path = self.path("stratbench.ini");
        fs::write(&path, content).unwrap();
        path
    }
}

fn write_series(dir: &Path, series: &PriceSeries) {
    fs::write(
        dir.join(format!("{}.csv", series.symbol())),
        to_yahoo_csv(series),
    )
    .unwrap();
}

fn parse(args: &[&str]) -> Command {
    let argv = std::iter::once("stratbench").chain(args.iter().copied());
    Cli::try_parse_from(argv).unwrap().command
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

const STAT_ARB: &str = "[stat_arb]\nsymbols = A,B,NOISE\nformation_bars = 90\nlookback = 15\nband_multiplier = 1.0\n";
const BIG_MOVES: &str = "[big_moves_monday]\nsymbols = SPY\nrange_window = 25\nhold_periods = 3\nparallel = false\n";

mod argument_parsing {
    use super::*;

    #[test]
    fn backtest_takes_strategy_and_overrides() {
        let command = parse(&[
            "backtest",
            "stat_arb",
            "-c",
            "cfg.ini",
            "--symbols",
            "GLD,GDX",
            "-o",
            "out",
        ]);
        match command {
            Command::Backtest {
                strategy,
                config,
                symbols,
                output,
            } => {
                assert_eq!(strategy, "stat_arb");
                assert_eq!(config, PathBuf::from("cfg.ini"));
                assert_eq!(symbols.as_deref(), Some("GLD,GDX"));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn backtest_requires_config() {
        let argv = ["stratbench", "backtest", "stat_arb"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn list_symbols_subcommand_is_kebab_case() {
        assert!(matches!(
            parse(&["list-symbols", "--config", "cfg.ini"]),
            Command::ListSymbols { .. }
        ));
    }
}

mod backtest_command {
    use super::*;

    #[test]
    fn stat_arb_writes_reports() {
        let ws = Workspace::new();
        let config = ws.write_config(STAT_ARB);
        let out = ws.path("out");

        cli::execute(parse(&[
            "backtest",
            "stat_arb",
            "-c",
            config.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(line_count(&out.join("combinations.csv")), 4);
        assert_eq!(line_count(&out.join("stat_arb_pnl.csv")), 201);
    }

    #[test]
    fn big_moves_writes_summary_and_curve() {
        let ws = Workspace::new();
        let config = ws.write_config(BIG_MOVES);
        let out = ws.path("out");

        cli::execute(parse(&[
            "backtest",
            "big_moves_monday",
            "-c",
            config.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]))
        .unwrap();

        let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("SPY,0,0.2,"));
        assert_eq!(line_count(&out.join("SPY_pnl.csv")), 61);
    }

    #[test]
    fn report_section_sets_output_directory() {
        let ws = Workspace::new();
        let out = ws.path("from_config");
        let config = ws.write_config(&format!(
            "{BIG_MOVES}\n[report]\noutput_dir = {}\n",
            out.display()
        ));

        cli::execute(parse(&[
            "backtest",
            "big_moves_monday",
            "-c",
            config.to_str().unwrap(),
        ]))
        .unwrap();

        assert!(out.join("summary.csv").exists());
    }

    #[test]
    fn symbols_flag_replaces_configured_list() {
        let ws = Workspace::new();
        let config = ws.write_config(STAT_ARB);
        let out = ws.path("out");

        cli::execute(parse(&[
            "backtest",
            "stat_arb",
            "-c",
            config.to_str().unwrap(),
            "--symbols",
            "a,b",
            "-o",
            out.to_str().unwrap(),
        ]))
        .unwrap();

        // Two symbols give two directed combinations.
        assert_eq!(line_count(&out.join("combinations.csv")), 3);
    }

    #[test]
    fn no_cointegrated_pair_writes_combinations_and_exits_4() {
        let ws = Workspace::diverging();
        let config = ws.write_config(STAT_ARB);
        let out = ws.path("out");

        let err = cli::execute(parse(&[
            "backtest",
            "stat_arb",
            "-c",
            config.to_str().unwrap(),
            "--symbols",
            "A,B",
            "-o",
            out.to_str().unwrap(),
        ]))
        .unwrap_err();

        assert!(matches!(err, StratbenchError::NoCointegratedPair { .. }));
        assert_eq!(err.exit_code(), 4);
        assert_eq!(line_count(&out.join("combinations.csv")), 3);
        assert!(!out.join("stat_arb_pnl.csv").exists());
    }

    #[test]
    fn missing_symbol_files_are_skipped() {
        let ws = Workspace::new();
        let config = ws.write_config("[big_moves_monday]\nsymbols = SPY,QQQ\nparallel = false\n");
        let out = ws.path("out");

        cli::execute(parse(&[
            "backtest",
            "big_moves_monday",
            "-c",
            config.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]))
        .unwrap();

        assert_eq!(line_count(&out.join("summary.csv")), 2);
        assert!(!out.join("QQQ_pnl.csv").exists());
    }

    #[test]
    fn unknown_strategy_fails_before_reading_config() {
        let ws = Workspace::new();
        let missing = ws.path("does_not_exist.ini");

        let err = cli::execute(parse(&[
            "backtest",
            "pairs",
            "-c",
            missing.to_str().unwrap(),
        ]))
        .unwrap_err();
        assert!(matches!(err, StratbenchError::UnknownStrategy { .. }));
    }

    #[test]
    fn missing_config_file_is_a_config_error() {
        let ws = Workspace::new();
        let missing = ws.path("does_not_exist.ini");

        let err = cli::execute(parse(&[
            "backtest",
            "stat_arb",
            "-c",
            missing.to_str().unwrap(),
        ]))
        .unwrap_err();
        assert!(matches!(err, StratbenchError::ConfigParse { .. }));
    }

    #[test]
    fn invalid_dates_stop_before_fetching() {
        let ws = Workspace::new();
        let path = ws.path("bad.ini");
        fs::write(
            &path,
            format!(
                "[data]\ndirectory = {}\nstart_date = 2025-01-01\nend_date = 2019-01-01\n\n{STAT_ARB}",
                ws.path("prices").display()
            ),
        )
        .unwrap();
        let out = ws.path("out");

        let err = cli::execute(parse(&[
            "backtest",
            "stat_arb",
            "-c",
            path.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ]))
        .unwrap_err();
        assert!(matches!(err, StratbenchError::ConfigInvalid { .. }));
        assert!(!out.exists());
    }
}

mod validate_command {
    use super::*;

    #[test]
    fn validates_every_present_section() {
        let ws = Workspace::new();
        let config = ws.write_config(&format!("{STAT_ARB}\n{BIG_MOVES}"));

        cli::execute(parse(&["validate", "-c", config.to_str().unwrap()])).unwrap();
    }

    #[test]
    fn named_strategy_without_section_fails() {
        let ws = Workspace::new();
        let config = ws.write_config(STAT_ARB);

        let err = cli::execute(parse(&[
            "validate",
            "-c",
            config.to_str().unwrap(),
            "--strategy",
            "big_moves_monday",
        ]))
        .unwrap_err();
        assert!(matches!(err, StratbenchError::ConfigMissing { .. }));
    }

    #[test]
    fn config_without_strategy_sections_fails() {
        let ws = Workspace::new();
        let config = ws.write_config("");

        let err = cli::execute(parse(&["validate", "-c", config.to_str().unwrap()])).unwrap_err();
        assert!(matches!(err, StratbenchError::ConfigMissing { .. }));
    }
}

mod list_symbols_command {
    use super::*;

    #[test]
    fn lists_csv_files_in_data_directory() {
        let ws = Workspace::new();
        let config = ws.write_config("");

        cli::execute(parse(&["list-symbols", "-c", config.to_str().unwrap()])).unwrap();
    }

    #[test]
    fn missing_data_directory_is_an_error() {
        let ws = Workspace::new();
        let path = ws.path("nodir.ini");
        fs::write(
            &path,
            format!("[data]\ndirectory = {}\n", ws.path("nowhere").display()),
        )
        .unwrap();

        let err = cli::execute(parse(&["list-symbols", "-c", path.to_str().unwrap()])).unwrap_err();
        assert!(matches!(err, StratbenchError::Io(_)));
    }
}
