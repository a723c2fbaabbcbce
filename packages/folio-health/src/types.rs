//! Core data types for portfolio health analysis.

use crate::math::safe_div;
use serde::{Deserialize, Serialize};

/// Sector label used when market data does not report one.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// A holding as uploaded by the user: a ticker and a share count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    /// Ticker symbol (uppercase)
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// Number of shares held
    #[serde(rename = "Shares")]
    pub shares: f64,
}

impl Holding {
    /// Create a new holding, normalizing the ticker to uppercase.
    pub fn new(ticker: &str, shares: f64) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            shares,
        }
    }
}

/// Collapse holdings to one per ticker, summing shares of repeats.
///
/// Tickers are normalized as in [`Holding::new`]; first-seen order is kept.
pub fn merge_holdings<I>(holdings: I) -> Vec<Holding>
where
    I: IntoIterator<Item = Holding>,
{
    let mut merged: Vec<Holding> = Vec::new();
    for holding in holdings {
        let ticker = holding.ticker.trim().to_uppercase();
        match merged.iter_mut().find(|h| h.ticker == ticker) {
            Some(existing) => {
                tracing::warn!("Duplicate ticker {} merged", ticker);
                existing.shares += holding.shares;
            }
            None => merged.push(Holding {
                ticker,
                shares: holding.shares,
            }),
        }
    }
    merged
}

/// Current price and sector for a ticker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Sector")]
    pub sector: String,
}

impl Quote {
    /// Create a new quote.
    pub fn new(ticker: &str, price: f64, sector: &str) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            price,
            sector: sector.to_string(),
        }
    }

    /// Sentinel quote for a ticker whose market data could not be fetched.
    pub fn unavailable(ticker: &str) -> Self {
        Self::new(ticker, 0.0, UNKNOWN_SECTOR)
    }

    /// Whether this quote carries a usable price.
    pub fn is_available(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// A holding joined with its quote.
///
/// Price and sector stay `None` when the quote table had no row for the ticker,
/// and market value and allocation follow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Position {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Shares")]
    pub shares: f64,
    #[serde(rename = "Price")]
    pub price: Option<f64>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    /// shares * price
    #[serde(rename = "Market Value")]
    pub market_value: Option<f64>,
    /// 100 * market value / total portfolio value
    #[serde(rename = "Allocation %")]
    pub allocation_pct: Option<f64>,
}

impl Position {
    /// Join a holding with its quote (if any).
    pub fn from_holding(holding: &Holding, quote: Option<&Quote>) -> Self {
        let price = quote.map(|q| q.price);
        Self {
            ticker: holding.ticker.clone(),
            shares: holding.shares,
            price,
            sector: quote.map(|q| q.sector.clone()),
            market_value: price.map(|p| holding.shares * p),
            allocation_pct: None,
        }
    }

    /// Set the allocation percentage against the given portfolio total.
    ///
    /// A zero total yields 0% rather than a division error.
    pub fn with_allocation(mut self, total_value: f64) -> Self {
        self.allocation_pct = self
            .market_value
            .map(|mv| safe_div(100.0 * mv, total_value));
        self
    }
}

/// API response wrapper used for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holding_new_normalizes_ticker() {
        let holding = Holding::new(" aapl ", 10.0);
        assert_eq!(holding.ticker, "AAPL");
        assert_eq!(holding.shares, 10.0);
    }

    #[test]
    fn test_merge_holdings_sums_repeats() {
        let merged = merge_holdings(vec![
            Holding::new("AAPL", 5.0),
            Holding {
                ticker: "aapl ".to_string(),
                shares: 5.0,
            },
            Holding::new("XOM", 10.0),
        ]);

        assert_eq!(merged, vec![Holding::new("AAPL", 10.0), Holding::new("XOM", 10.0)]);
    }

    #[test]
    fn test_quote_unavailable() {
        let quote = Quote::unavailable("zzzz");
        assert_eq!(quote.ticker, "ZZZZ");
        assert_eq!(quote.price, 0.0);
        assert_eq!(quote.sector, UNKNOWN_SECTOR);
        assert!(!quote.is_available());
        assert!(Quote::new("AAPL", 190.0, "Technology").is_available());
    }

    #[test]
    fn test_position_from_holding() {
        let holding = Holding::new("AAPL", 10.0);
        let quote = Quote::new("AAPL", 150.0, "Technology");
        let pos = Position::from_holding(&holding, Some(&quote)).with_allocation(3000.0);

        assert_eq!(pos.price, Some(150.0));
        assert_eq!(pos.sector.as_deref(), Some("Technology"));
        assert_eq!(pos.market_value, Some(1500.0));
        assert_eq!(pos.allocation_pct, Some(50.0));
    }

    #[test]
    fn test_position_without_quote_keeps_nulls() {
        let holding = Holding::new("AAPL", 10.0);
        let pos = Position::from_holding(&holding, None).with_allocation(1000.0);

        assert!(pos.price.is_none());
        assert!(pos.sector.is_none());
        assert!(pos.market_value.is_none());
        assert!(pos.allocation_pct.is_none());
    }

    #[test]
    fn test_position_zero_total() {
        let holding = Holding::new("AAPL", 10.0);
        let quote = Quote::unavailable("AAPL");
        let pos = Position::from_holding(&holding, Some(&quote)).with_allocation(0.0);

        assert_eq!(pos.market_value, Some(0.0));
        assert_eq!(pos.allocation_pct, Some(0.0));
    }

    #[test]
    fn test_position_serializes_display_columns() {
        let pos = Position::from_holding(
            &Holding::new("AAPL", 1.0),
            Some(&Quote::new("AAPL", 10.0, "Technology")),
        );
        let json = serde_json::to_value(&pos).unwrap();
        assert_eq!(json["Market Value"], 10.0);
        assert!(json.get("Allocation %").is_some());
    }

    #[test]
    fn test_api_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test".to_string());
        assert!(response.ok);
        assert_eq!(response.data, Some("test".to_string()));

        let err_response: ApiResponse<String> = ApiResponse::err("error");
        assert!(!err_response.ok);
        assert_eq!(err_response.error, Some("error".to_string()));
        assert!(err_response.to_json().unwrap().contains("\"ok\": false"));
    }
}
