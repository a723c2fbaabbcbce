//! Folio Health - Portfolio health analytics library.
//!
//! This crate turns a list of holdings plus market data into:
//!
//! - **Portfolio metrics**: Market value and allocation per position and per sector
//! - **Risk metrics**: Annualized volatility, Sharpe ratio, correlation, volatility rank
//! - **Advice**: Missing-sector ETF suggestions and per-ticker risk flags
//! - **What-if**: Rebalancing actions toward target weights and price-change forecasts
//!
//! Market data is consumed through the [`MarketData`] trait; the crate ships a
//! CSV-file provider and an in-memory provider.
//!
//! # Example
//!
//! ```rust
//! use folio_health::{analyze, AnalysisRequest, Holding, InMemoryMarketData, Settings};
//!
//! let market = InMemoryMarketData::new()
//!     .with_quote("AAPL", 100.0, "Technology")
//!     .with_quote("XOM", 50.0, "Energy");
//!
//! let request = AnalysisRequest::new(vec![
//!     Holding::new("AAPL", 10.0),
//!     Holding::new("XOM", 20.0),
//! ]);
//!
//! let report = analyze(&market, &Settings::default(), &request);
//! assert_eq!(report.overview.total_value, 2000.0);
//! assert_eq!(report.suggestions.add.len(), 8);
//! ```

pub mod advisor;
pub mod analysis;
pub mod config;
pub mod input;
pub mod market;
pub mod math;
pub mod portfolio;
pub mod returns;
pub mod risk;
pub mod types;

// Re-export commonly used types
pub use types::{merge_holdings, ApiResponse, Holding, Position, Quote, UNKNOWN_SECTOR};

// Re-export main functionality
pub use advisor::{
    suggest_add_remove, AddSuggestion, AdvisorThresholds, FlagReason, RemoveSuggestion,
    SectorEtf, SectorEtfMap, Suggestions,
};
pub use analysis::{analyze, AnalysisReport, AnalysisRequest};
pub use config::Settings;
pub use input::{parse_forecast_spec, parse_holdings_csv, parse_target_allocation, read_holdings_file};
pub use market::{FileMarketData, InMemoryMarketData, MarketData, Period, PriceHistory};
pub use portfolio::{
    compute_portfolio_metrics, forecast, rebalance_portfolio, ForecastInput, ForecastRow,
    ForecastTable, ForecastTotals, PortfolioOverview, RebalanceRow, RebalanceTable,
    SectorAllocation,
};
pub use returns::ReturnSeries;
pub use risk::{CorrelationMatrix, RiskReport, RiskSignals, TickerRisk};

/// Error types for folio-health operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for folio-health operations.
pub type Result<T> = std::result::Result<T, Error>;
