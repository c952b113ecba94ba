#![allow(dead_code)]

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashMap;
use stratbench::domain::error::StratbenchError;
pub use stratbench::domain::price::{PriceBar, PriceSeries};
use stratbench::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, series: &PriceSeries) -> Self {
        self.data
            .insert(series.symbol().to_string(), series.bars().to_vec());
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, StratbenchError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StratbenchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        let bars: Vec<PriceBar> = self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(StratbenchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "no data".into(),
            });
        }
        PriceSeries::new(symbol, bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StratbenchError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `n` consecutive Monday-to-Friday dates starting at `start`.
pub fn weekday_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    start
        .iter_days()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(n)
        .collect()
}

/// Deterministic noise so scenarios are reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn uniform(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Approximately standard normal (Irwin-Hall with 12 terms).
    pub fn normal(&mut self) -> f64 {
        (0..12).map(|_| self.uniform()).sum::<f64>() - 6.0
    }
}

/// Bar with high/low one unit either side of the close.
pub fn bar(date: NaiveDate, close: f64) -> PriceBar {
    PriceBar {
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        adj_close: close,
        volume: 1_000,
    }
}

pub fn series_from_closes(symbol: &str, dates: &[NaiveDate], closes: &[f64]) -> PriceSeries {
    let bars = dates.iter().zip(closes).map(|(d, c)| bar(*d, *c)).collect();
    PriceSeries::new(symbol, bars).unwrap()
}

/// A random walk, B = 2A + iid noise, and an independent walk.
pub fn cointegrated_universe(n: usize) -> Vec<PriceSeries> {
    let dates = weekday_dates(date(2020, 1, 6), n);
    let mut rng = Lcg::new(42);

    let mut a = Vec::with_capacity(n);
    let mut noise = Vec::with_capacity(n);
    let mut level_a = 100.0;
    let mut level_noise = 60.0;
    for _ in 0..n {
        level_a += rng.normal();
        level_noise += 0.5 * rng.normal();
        a.push(level_a);
        noise.push(level_noise);
    }
    let b: Vec<f64> = a.iter().map(|x| 2.0 * x + rng.normal()).collect();

    vec![
        series_from_closes("A", &dates, &a),
        series_from_closes("B", &dates, &b),
        series_from_closes("NOISE", &dates, &noise),
    ]
}

/// Two symbols that never cointegrate: B is A plus an explosive AR(1)
/// component, so every spread between them grows without bound.
pub fn diverging_universe(n: usize) -> Vec<PriceSeries> {
    let dates = weekday_dates(date(2020, 1, 6), n);
    let mut rng = Lcg::new(7);

    let mut a = Vec::with_capacity(n);
    let mut b = Vec::with_capacity(n);
    let mut level_a = 100.0;
    let mut drift = 10.0;
    for _ in 0..n {
        level_a += rng.normal();
        drift = 1.03 * drift + 0.5 * rng.normal();
        a.push(level_a);
        b.push(level_a + drift);
    }

    vec![
        series_from_closes("A", &dates, &a),
        series_from_closes("B", &dates, &b),
    ]
}

/// Index of the engineered gap-down Monday in [`monday_gap_series`].
pub const GAP_MONDAY: usize = 40;

/// 60 weekday bars from Monday 2024-01-01, flat at 100 except a gap-down
/// Monday at index 40 (2024-02-26) that closes weak, then a recovery.
pub fn monday_gap_series(symbol: &str) -> PriceSeries {
    let dates = weekday_dates(date(2024, 1, 1), 60);
    let bars = dates
        .iter()
        .enumerate()
        .map(|(i, d)| match i {
            GAP_MONDAY => PriceBar {
                date: *d,
                open: 99.0,
                high: 100.0,
                low: 96.5,
                close: 97.0,
                adj_close: 97.0,
                volume: 1_000,
            },
            41 => bar(*d, 98.0),
            42 => bar(*d, 99.0),
            _ => bar(*d, 100.0),
        })
        .collect();
    PriceSeries::new(symbol, bars).unwrap()
}

/// Yahoo-style CSV text for a series.
pub fn to_yahoo_csv(series: &PriceSeries) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for b in series.bars() {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.adj_close, b.volume
        ));
    }
    out
}
