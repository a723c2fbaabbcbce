//! In-memory market data, for tests and for callers that already hold prices.

use super::{MarketData, Period, PriceHistory};
use crate::types::Quote;
use std::collections::HashMap;

/// Market data held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    quotes: HashMap<String, Quote>,
    history: PriceHistory,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a quote.
    pub fn with_quote(mut self, ticker: &str, price: f64, sector: &str) -> Self {
        let quote = Quote::new(ticker, price, sector);
        self.quotes.insert(quote.ticker.clone(), quote);
        self
    }

    /// Replace the price history.
    pub fn with_history(mut self, history: PriceHistory) -> Self {
        self.history = history;
        self
    }
}

impl MarketData for InMemoryMarketData {
    fn fetch_quotes(&self, tickers: &[String]) -> Vec<Quote> {
        tickers
            .iter()
            .map(|ticker| {
                let key = ticker.trim().to_uppercase();
                self.quotes
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| Quote::unavailable(&key))
            })
            .collect()
    }

    fn fetch_history(&self, tickers: &[String], period: Period) -> PriceHistory {
        self.history.select(tickers, period)
    }
}
