//! Price data port.

use crate::domain::error::StratbenchError;
use crate::domain::price::PriceSeries;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily bars for `symbol` within `[start_date, end_date]`, oldest first.
    /// An empty range is `DataUnavailable`, never an empty series.
    fn fetch_prices(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, StratbenchError>;

    fn list_symbols(&self) -> Result<Vec<String>, StratbenchError>;
}
