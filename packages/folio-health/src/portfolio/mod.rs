//! Portfolio module.
//!
//! Provides position valuation, rebalancing actions, and price-change forecasts.

mod forecast;
mod metrics;
mod rebalance;

pub use forecast::{
    forecast, ForecastInput, ForecastRow, ForecastTable, ForecastTotals, DEFAULT_FORECAST_SHARES,
    FORECAST_COLUMNS,
};
pub use metrics::{compute_portfolio_metrics, PortfolioOverview, SectorAllocation};
pub use rebalance::{rebalance_portfolio, RebalanceRow, RebalanceTable};
