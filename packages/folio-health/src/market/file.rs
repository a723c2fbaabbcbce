//! CSV file backed market data.
//!
//! Quotes file: `Ticker,Price,Sector`, one row per ticker.
//! History file: `Date,<TICKER>,<TICKER>,...` with ISO dates and blank cells
//! for missing closes.

use super::{MarketData, Period, PriceHistory};
use crate::types::{Quote, UNKNOWN_SECTOR};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct QuoteRecord {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Price")]
    price: Option<f64>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
}

/// Market data loaded once from CSV files.
#[derive(Debug, Clone, Default)]
pub struct FileMarketData {
    quotes: HashMap<String, Quote>,
    history: PriceHistory,
}

impl FileMarketData {
    /// Load quotes from a CSV file. History starts empty.
    pub fn new(quotes_path: impl AsRef<Path>) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(quotes_path.as_ref())?;
        Ok(Self {
            quotes: Self::read_quotes(reader)?,
            history: PriceHistory::default(),
        })
    }

    /// Load price history from a wide CSV file.
    pub fn with_history(mut self, history_path: impl AsRef<Path>) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(history_path.as_ref())?;
        self.history = Self::read_history(reader)?;
        Ok(self)
    }

    /// Number of tickers with a quote row.
    pub fn quote_count(&self) -> usize {
        self.quotes.len()
    }

    fn read_quotes<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<HashMap<String, Quote>> {
        let mut quotes = HashMap::new();
        for record in reader.deserialize() {
            let record: QuoteRecord = record?;
            let sector = record
                .sector
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SECTOR.to_string());
            let quote = Quote::new(&record.ticker, record.price.unwrap_or(0.0), &sector);
            quotes.insert(quote.ticker.clone(), quote);
        }
        tracing::debug!("Loaded {} quotes", quotes.len());
        Ok(quotes)
    }

    fn read_history<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<PriceHistory> {
        let headers = reader.headers()?.clone();
        if headers.len() < 2 || !headers[0].eq_ignore_ascii_case("date") {
            return Err(Error::InvalidInput(
                "History file must start with a Date column followed by one column per ticker"
                    .to_string(),
            ));
        }
        let tickers: Vec<&str> = headers.iter().skip(1).collect();

        let mut rows: Vec<(NaiveDate, Vec<Option<f64>>)> = Vec::new();
        for record in reader.records() {
            let record = record?;
            let raw_date = record.get(0).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|e| {
                Error::InvalidInput(format!("Bad date '{}' in history file: {}", raw_date, e))
            })?;
            let closes = (1..=tickers.len())
                .map(|i| {
                    record
                        .get(i)
                        .filter(|cell| !cell.is_empty())
                        .and_then(|cell| cell.parse::<f64>().ok())
                        .filter(|v| v.is_finite())
                })
                .collect();
            rows.push((date, closes));
        }
        rows.sort_by_key(|(date, _)| *date);

        let mut history = PriceHistory::new(rows.iter().map(|(date, _)| *date).collect());
        for (i, ticker) in tickers.iter().enumerate() {
            let closes = rows.iter().map(|(_, closes)| closes[i]).collect();
            history = history.with_column(ticker, closes);
        }
        tracing::debug!(
            "Loaded price history: {} days x {} tickers",
            history.len(),
            tickers.len()
        );
        Ok(history)
    }
}

impl MarketData for FileMarketData {
    fn fetch_quotes(&self, tickers: &[String]) -> Vec<Quote> {
        tickers
            .iter()
            .map(|ticker| {
                let key = ticker.trim().to_uppercase();
                self.quotes.get(&key).cloned().unwrap_or_else(|| {
                    tracing::warn!("No quote for {}, using sentinel", key);
                    Quote::unavailable(&key)
                })
            })
            .collect()
    }

    fn fetch_history(&self, tickers: &[String], period: Period) -> PriceHistory {
        self.history.select(tickers, period)
    }
}
