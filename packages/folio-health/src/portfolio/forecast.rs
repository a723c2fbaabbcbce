//! What-if forecast: profit and loss under an expected price change.

use crate::math::safe_div;
use crate::types::Quote;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;

/// Share count used when a forecast entry does not give one.
pub const DEFAULT_FORECAST_SHARES: f64 = 10.0;

/// CSV column names, in the order [`ForecastRow`] serializes them.
pub const FORECAST_COLUMNS: [&str; 9] = [
    "Ticker",
    "Current Price",
    "Expected Change (%)",
    "Shares",
    "Predicted Price",
    "Current Value",
    "Predicted Value",
    "P&L ($)",
    "P&L (%)",
];

/// One forecast request: expected % price change and optional share count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastInput {
    pub ticker: String,
    /// Expected price change in percent (10.0 = +10%)
    pub change_pct: f64,
    pub shares: Option<f64>,
}

impl ForecastInput {
    pub fn new(ticker: &str, change_pct: f64, shares: Option<f64>) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            change_pct,
            shares,
        }
    }
}

/// Forecast result for one ticker. Field order is the CSV column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Current Price")]
    pub current_price: f64,
    #[serde(rename = "Expected Change (%)")]
    pub change_pct: f64,
    #[serde(rename = "Shares")]
    pub shares: f64,
    #[serde(rename = "Predicted Price")]
    pub predicted_price: f64,
    #[serde(rename = "Current Value")]
    pub current_value: f64,
    #[serde(rename = "Predicted Value")]
    pub predicted_value: f64,
    #[serde(rename = "P&L ($)")]
    pub pnl: f64,
    #[serde(rename = "P&L (%)")]
    pub pnl_pct: f64,
}

/// Aggregate figures across all forecast rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForecastTotals {
    pub current_value: f64,
    pub predicted_value: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
}

/// Forecast rows, their totals, and tickers that could not be priced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForecastTable {
    pub rows: Vec<ForecastRow>,
    pub totals: ForecastTotals,
    /// Tickers excluded because market data was unavailable
    pub failures: Vec<String>,
}

/// Apply expected price changes to current quotes.
///
/// Tickers whose quote is missing or unpriced are excluded and listed in
/// `failures`; they are never counted as zero.
pub fn forecast(inputs: &[ForecastInput], quotes: &[Quote], default_shares: f64) -> ForecastTable {
    let by_ticker: HashMap<&str, &Quote> = quotes.iter().map(|q| (q.ticker.as_str(), q)).collect();

    let mut rows = Vec::new();
    let mut failures = Vec::new();

    for input in inputs {
        let quote = match by_ticker.get(input.ticker.as_str()) {
            Some(q) if q.is_available() => *q,
            _ => {
                tracing::warn!("Market data unavailable for {}, excluded from forecast", input.ticker);
                failures.push(input.ticker.clone());
                continue;
            }
        };

        let shares = input.shares.unwrap_or(default_shares);
        let predicted_price = quote.price * (1.0 + input.change_pct / 100.0);
        let current_value = quote.price * shares;
        let predicted_value = predicted_price * shares;
        let pnl = predicted_value - current_value;

        rows.push(ForecastRow {
            ticker: input.ticker.clone(),
            current_price: quote.price,
            change_pct: input.change_pct,
            shares,
            predicted_price,
            current_value,
            predicted_value,
            pnl,
            pnl_pct: safe_div(pnl, current_value) * 100.0,
        });
    }

    let current_value: f64 = rows.iter().map(|r| r.current_value).sum();
    let predicted_value: f64 = rows.iter().map(|r| r.predicted_value).sum();
    let pnl = predicted_value - current_value;

    ForecastTable {
        rows,
        totals: ForecastTotals {
            current_value,
            predicted_value,
            pnl,
            pnl_pct: safe_div(pnl, current_value) * 100.0,
        },
        failures,
    }
}

impl ForecastTable {
    /// Write the rows as CSV with a header line. The header is written even
    /// when every ticker failed.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.rows.is_empty() {
            wtr.write_record(FORECAST_COLUMNS)?;
        }
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render the rows as a CSV document.
    pub fn to_csv(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_forecast_single_ticker() {
        let quotes = vec![Quote::new("AAPL", 100.0, "Technology")];
        let table = forecast(
            &[ForecastInput::new("AAPL", 10.0, Some(20.0))],
            &quotes,
            DEFAULT_FORECAST_SHARES,
        );

        let row = &table.rows[0];
        assert_abs_diff_eq!(row.predicted_price, 110.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.current_value, 2000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.predicted_value, 2200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.pnl, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.pnl_pct, 10.0, epsilon = 1e-9);
        assert!(table.failures.is_empty());
    }

    #[test]
    fn test_default_shares() {
        let quotes = vec![Quote::new("MSFT", 400.0, "Technology")];
        let table = forecast(&[ForecastInput::new("msft", -5.0, None)], &quotes, 10.0);

        let row = &table.rows[0];
        assert_eq!(row.ticker, "MSFT");
        assert_eq!(row.shares, 10.0);
        assert_abs_diff_eq!(row.pnl, -200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.pnl_pct, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_unavailable_data_is_excluded() {
        let quotes = vec![
            Quote::new("AAPL", 100.0, "Technology"),
            Quote::unavailable("DEAD"),
        ];
        let inputs = vec![
            ForecastInput::new("AAPL", 10.0, Some(1.0)),
            ForecastInput::new("DEAD", 10.0, Some(1.0)),
            ForecastInput::new("NONE", 10.0, Some(1.0)),
        ];
        let table = forecast(&inputs, &quotes, 10.0);

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.failures, vec!["DEAD", "NONE"]);
        assert_abs_diff_eq!(table.totals.current_value, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_totals() {
        let quotes = vec![
            Quote::new("AAPL", 100.0, "Technology"),
            Quote::new("XOM", 50.0, "Energy"),
        ];
        let inputs = vec![
            ForecastInput::new("AAPL", 10.0, Some(10.0)), // 1000 -> 1100
            ForecastInput::new("XOM", -20.0, Some(20.0)), // 1000 -> 800
        ];
        let table = forecast(&inputs, &quotes, 10.0);

        assert_abs_diff_eq!(table.totals.current_value, 2000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(table.totals.predicted_value, 1900.0, epsilon = 1e-9);
        assert_abs_diff_eq!(table.totals.pnl, -100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(table.totals.pnl_pct, -5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_shares_guarded() {
        let quotes = vec![Quote::new("AAPL", 100.0, "Technology")];
        let table = forecast(&[ForecastInput::new("AAPL", 10.0, Some(0.0))], &quotes, 10.0);

        assert_eq!(table.rows[0].pnl_pct, 0.0);
        assert_eq!(table.totals.pnl_pct, 0.0);
    }

    #[test]
    fn test_csv_column_order() {
        let quotes = vec![Quote::new("AAPL", 100.0, "Technology")];
        let table = forecast(&[ForecastInput::new("AAPL", 10.0, Some(20.0))], &quotes, 10.0);
        let csv = table.to_csv().unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Ticker,Current Price,Expected Change (%),Shares,Predicted Price,Current Value,Predicted Value,P&L ($),P&L (%)"
        );
        assert!(lines.next().unwrap().starts_with("AAPL,100.0,10.0,20.0,"));
    }

    #[test]
    fn test_csv_header_when_all_tickers_fail() {
        let table = forecast(
            &[ForecastInput::new("DEAD", 5.0, None)],
            &[Quote::unavailable("DEAD")],
            10.0,
        );
        assert!(table.rows.is_empty());

        let csv = table.to_csv().unwrap();
        assert_eq!(csv, format!("{}\n", FORECAST_COLUMNS.join(",")));
        assert!(csv.starts_with("Ticker,Current Price,"));
    }

    #[test]
    fn test_column_list_matches_row_serialization() {
        let quotes = vec![Quote::new("AAPL", 100.0, "Technology")];
        let table = forecast(&[ForecastInput::new("AAPL", 1.0, None)], &quotes, 10.0);
        let csv = table.to_csv().unwrap();
        assert_eq!(csv.lines().next().unwrap(), FORECAST_COLUMNS.join(","));
    }
}
