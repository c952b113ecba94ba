//! CSV price data adapter.
//!
//! One file per symbol, `{SYMBOL}.csv`, in the Yahoo Finance download layout:
//! `Date,Open,High,Low,Close,Adj Close,Volume`. Columns are located by header
//! name. A missing `Adj Close` column falls back to `Close`, and rows holding
//! `null` (Yahoo's marker for a missing quote) are skipped.

use crate::domain::error::StratbenchError;
use crate::domain::price::{PriceBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adj_close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self, String> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| find(name).ok_or_else(|| format!("missing {name} column"));

        let close = require("close")?;
        Ok(Self {
            date: require("date")?,
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close,
            adj_close: find("adj close").unwrap_or(close),
            volume: find("volume"),
        })
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{symbol}.csv"))
    }

    fn parse_bar(record: &StringRecord, cols: &Columns) -> Result<Option<PriceBar>, String> {
        let get = |idx: usize, name: &str| {
            record
                .get(idx)
                .map(str::trim)
                .ok_or_else(|| format!("missing {name} value"))
        };

        let fields = [
            get(cols.open, "open")?,
            get(cols.high, "high")?,
            get(cols.low, "low")?,
            get(cols.close, "close")?,
            get(cols.adj_close, "adj close")?,
        ];
        if fields.iter().any(|f| f.eq_ignore_ascii_case("null")) {
            return Ok(None);
        }

        let date_str = get(cols.date, "date")?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{date_str}': {e}"))?;

        let mut values = [0.0; 5];
        for (value, raw) in values.iter_mut().zip(fields) {
            *value = raw
                .parse::<f64>()
                .map_err(|e| format!("invalid price '{raw}' on {date}: {e}"))?;
        }
        let [open, high, low, close, adj_close] = values;

        let volume = match cols.volume.and_then(|idx| record.get(idx)).map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw
                .parse::<i64>()
                .or_else(|_| raw.parse::<f64>().map(|v| v as i64))
                .map_err(|e| format!("invalid volume '{raw}' on {date}: {e}"))?,
        };

        Ok(Some(PriceBar {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        }))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, StratbenchError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| StratbenchError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {e}", path.display()),
        })?;

        let invalid = |reason: String| StratbenchError::InvalidSeries {
            symbol: symbol.to_string(),
            reason,
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| invalid(format!("CSV header error: {e}")))?
            .clone();
        let cols = Columns::from_headers(&headers).map_err(invalid)?;

        let mut bars = Vec::new();
        let mut skipped_rows = 0usize;
        for result in rdr.records() {
            let record = result.map_err(|e| invalid(format!("CSV parse error: {e}")))?;
            match Self::parse_bar(&record, &cols).map_err(invalid)? {
                Some(bar) if bar.date >= start_date && bar.date <= end_date => bars.push(bar),
                Some(_) => {}
                None => skipped_rows += 1,
            }
        }
        if skipped_rows > 0 {
            debug!(symbol, skipped_rows, "skipped rows with missing quotes");
        }

        if bars.is_empty() {
            return Err(StratbenchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("no bars between {start_date} and {end_date}"),
            });
        }

        bars.sort_by_key(|b| b.date);
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StratbenchError> {
        let entries = fs::read_dir(&self.base_path)?;

        let mut symbols = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if !is_csv {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                symbols.push(stem.to_string_lossy().into_owned());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
