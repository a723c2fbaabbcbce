//! Market data capability.
//!
//! The analytics never fetch prices themselves. They ask a [`MarketData`]
//! implementation for current quotes and for an aligned table of daily closes.
//! Providers degrade instead of failing: an unknown ticker yields a sentinel
//! quote (price 0, sector "Unknown") and an all-missing history column.

mod file;
mod memory;

pub use file::FileMarketData;
pub use memory::InMemoryMarketData;

use crate::types::Quote;
use crate::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source of quotes and price history.
pub trait MarketData {
    /// Current price and sector for each ticker, one row per requested ticker,
    /// in request order.
    fn fetch_quotes(&self, tickers: &[String]) -> Vec<Quote>;

    /// Daily closes for the tickers over the lookback period, aligned by date.
    fn fetch_history(&self, tickers: &[String], period: Period) -> PriceHistory;
}

/// Lookback window for price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    OneMonth,
    ThreeMonths,
    #[default]
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    YearToDate,
    Max,
}

impl Period {
    /// First date included in the window ending at `last`. `None` means unbounded.
    pub fn start_date(&self, last: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            Period::OneMonth => 1,
            Period::ThreeMonths => 3,
            Period::SixMonths => 6,
            Period::OneYear => 12,
            Period::TwoYears => 24,
            Period::FiveYears => 60,
            Period::YearToDate => return NaiveDate::from_ymd_opt(last.year(), 1, 1),
            Period::Max => return None,
        };
        last.checked_sub_months(Months::new(months))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            "ytd" => Ok(Period::YearToDate),
            "max" => Ok(Period::Max),
            other => Err(Error::InvalidInput(format!(
                "Unknown period '{}'. Expected one of 1mo, 3mo, 6mo, 1y, 2y, 5y, ytd, max",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.as_str().to_string()
    }
}

/// One ticker's daily closes, aligned with [`PriceHistory::dates`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceColumn {
    pub ticker: String,
    pub closes: Vec<Option<f64>>,
}

/// Date x ticker table of daily closes. Missing observations are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PriceHistory {
    /// Trading days in ascending order
    pub dates: Vec<NaiveDate>,
    /// One column per ticker, each as long as `dates`
    pub columns: Vec<PriceColumn>,
}

impl PriceHistory {
    /// Create an empty table over the given dates.
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Add a column. Shorter inputs are padded with `None`, longer ones truncated.
    pub fn with_column(mut self, ticker: &str, mut closes: Vec<Option<f64>>) -> Self {
        closes.resize(self.dates.len(), None);
        self.columns.push(PriceColumn {
            ticker: ticker.trim().to_uppercase(),
            closes,
        });
        self
    }

    /// Number of trading days.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Tickers in column order.
    pub fn tickers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.ticker.as_str()).collect()
    }

    /// Closes for a ticker.
    pub fn column(&self, ticker: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.ticker == ticker)
            .map(|c| c.closes.as_slice())
    }

    /// Restrict to the requested tickers (in request order) and lookback period.
    ///
    /// Tickers without a column come back as all-`None` columns so the schema
    /// always matches the request.
    pub fn select(&self, tickers: &[String], period: Period) -> PriceHistory {
        let start = self
            .dates
            .last()
            .and_then(|&last| period.start_date(last));
        let first_row = match start {
            Some(start) => self.dates.partition_point(|d| *d < start),
            None => 0,
        };

        let mut selected = PriceHistory::new(self.dates[first_row..].to_vec());
        for ticker in tickers {
            let ticker = ticker.trim().to_uppercase();
            let closes = match self.column(&ticker) {
                Some(closes) => closes[first_row..].to_vec(),
                None => {
                    tracing::warn!("No price history for {}", ticker);
                    vec![None; selected.len()]
                }
            };
            selected = selected.with_column(&ticker, closes);
        }
        selected
    }
}
