//! Daily return series built from price history.

use crate::market::PriceHistory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aligned table of daily fractional returns, one column per ticker.
///
/// Every cell is defined: the first trading day (no prior close) and any day
/// where a remaining ticker lacks a return are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReturnSeries {
    /// Trading days, ascending
    pub dates: Vec<NaiveDate>,
    /// Tickers in column order
    pub tickers: Vec<String>,
    /// `columns[i]` holds the returns of `tickers[i]`, aligned with `dates`
    pub columns: Vec<Vec<f64>>,
    /// Tickers dropped because no return could be computed for them
    pub dropped: Vec<String>,
}

impl ReturnSeries {
    /// Build returns from daily closes.
    ///
    /// Single- and multi-ticker histories produce the same shape: each ticker is
    /// a named column.
    pub fn from_prices(history: &PriceHistory) -> Self {
        let mut tickers = Vec::new();
        let mut raw: Vec<Vec<Option<f64>>> = Vec::new();
        let mut dropped = Vec::new();

        for column in &history.columns {
            let returns = pct_change(&column.closes);
            if returns.iter().all(Option::is_none) {
                tracing::warn!("No usable price data for {}, dropping from returns", column.ticker);
                dropped.push(column.ticker.clone());
                continue;
            }
            tickers.push(column.ticker.clone());
            raw.push(returns);
        }

        let mut dates = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); tickers.len()];
        // row 0 never has a prior close; short columns read as missing past their end
        for row in 1..history.len() {
            let cells: Option<Vec<f64>> = raw
                .iter()
                .map(|col| col.get(row).copied().flatten())
                .collect();
            let Some(cells) = cells else {
                continue;
            };
            dates.push(history.dates[row]);
            for (r, out) in cells.into_iter().zip(columns.iter_mut()) {
                out.push(r);
            }
        }

        tracing::debug!(
            "Built return series: {} days x {} tickers ({} dropped)",
            dates.len(),
            tickers.len(),
            dropped.len()
        );

        Self {
            dates,
            tickers,
            columns,
            dropped,
        }
    }

    /// Number of aligned observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Returns for a ticker.
    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.columns[i].as_slice())
    }
}

/// Period-over-period fractional change. Index 0 is always `None`.
fn pct_change(closes: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    for i in 1..closes.len() {
        if let (Some(prev), Some(curr)) = (closes[i - 1], closes[i]) {
            if prev != 0.0 {
                out[i] = Some(curr / prev - 1.0);
            }
        }
    }
    out
}
