//! Daily price bars, validated per-symbol series and date-aligned panels.

use crate::domain::error::StratbenchError;
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// (high - low) / adj_close
    pub fn relative_range(&self) -> f64 {
        (self.high - self.low) / self.adj_close
    }

    /// Internal bar strength: (adj_close - low) / (high - low).
    ///
    /// Undefined for a zero-range bar.
    pub fn ibs(&self) -> Option<f64> {
        let range = self.high - self.low;
        if range > 0.0 {
            Some((self.adj_close - self.low) / range)
        } else {
            None
        }
    }
}

/// Bars for one symbol, strictly increasing by date with positive adjusted closes.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, StratbenchError> {
        let symbol = symbol.into();

        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(StratbenchError::InvalidSeries {
                    symbol,
                    reason: format!(
                        "dates not strictly increasing ({} then {})",
                        pair[0].date, pair[1].date
                    ),
                });
            }
        }

        if let Some(bar) = bars
            .iter()
            .find(|b| !(b.adj_close.is_finite() && b.adj_close > 0.0))
        {
            return Err(StratbenchError::InvalidSeries {
                symbol,
                reason: format!("non-positive adjusted close on {}", bar.date),
            });
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn adj_closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.adj_close).collect()
    }
}

/// Adjusted closes of several symbols on their common dates.
#[derive(Debug, Clone)]
pub struct AlignedPrices {
    pub dates: Vec<NaiveDate>,
    pub symbols: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl AlignedPrices {
    /// Inner-join the series on date, keeping the caller's symbol order.
    pub fn align(series: &[PriceSeries]) -> Self {
        let mut common: Option<BTreeSet<NaiveDate>> = None;
        for s in series {
            let dates: BTreeSet<NaiveDate> = s.bars.iter().map(|b| b.date).collect();
            common = Some(match common {
                None => dates,
                Some(acc) => acc.intersection(&dates).copied().collect(),
            });
        }
        let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();

        let columns = series
            .iter()
            .map(|s| {
                let mut out = Vec::with_capacity(dates.len());
                let mut bars = s.bars.iter().peekable();
                for date in &dates {
                    while bars.next_if(|b| b.date < *date).is_some() {}
                    if let Some(bar) = bars.next_if(|b| b.date == *date) {
                        out.push(bar.adj_close);
                    }
                }
                out
            })
            .collect();

        Self {
            dates,
            symbols: series.iter().map(|s| s.symbol.clone()).collect(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn column_at(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }
}
