//! One full recomputation pass over a portfolio.
//!
//! Quotes and history are fetched once, then portfolio metrics and risk metrics
//! are computed independently and combined by the advisor. Rebalancing and the
//! forecast are what-if sections that run only when the request asks for a
//! simulation. Malformed section input becomes a warning on the report; the
//! rest of the pass continues.

use crate::advisor::{suggest_add_remove, Suggestions};
use crate::config::Settings;
use crate::input::{parse_forecast_spec, parse_target_allocation};
use crate::market::MarketData;
use crate::portfolio::{
    compute_portfolio_metrics, forecast, rebalance_portfolio, ForecastTable, PortfolioOverview,
    RebalanceTable, SectorAllocation,
};
use crate::returns::ReturnSeries;
use crate::risk::RiskReport;
use crate::types::{merge_holdings, Holding};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Input to an analysis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub holdings: Vec<Holding>,
    /// `TICKER:PERCENT` pairs
    pub target_allocation: Option<String>,
    /// `TICKER:PERCENT_CHANGE[:SHARES]` entries
    pub forecast: Option<String>,
    /// Run the what-if sections (rebalance and forecast)
    pub simulate: bool,
}

impl AnalysisRequest {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self {
            holdings,
            ..Default::default()
        }
    }

    /// Request a rebalance toward the given targets.
    pub fn with_targets(mut self, spec: impl Into<String>) -> Self {
        self.target_allocation = Some(spec.into());
        self
    }

    /// Request a forecast for the given entries.
    pub fn with_forecast(mut self, spec: impl Into<String>) -> Self {
        self.forecast = Some(spec.into());
        self
    }

    /// Turn the what-if simulation on or off.
    pub fn simulate(mut self, active: bool) -> Self {
        self.simulate = active;
        self
    }
}

/// Everything computed in one pass. Nothing here is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub overview: PortfolioOverview,
    pub sector_allocation: Vec<SectorAllocation>,
    pub risk: RiskReport,
    pub suggestions: Suggestions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebalance: Option<RebalanceTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<ForecastTable>,
    /// Validation and data-quality warnings
    pub warnings: Vec<String>,
    /// Whether the what-if sections ran
    pub simulation_active: bool,
}

/// Run a full analysis pass. Never fails: problems surface as warnings and
/// degraded (zero, empty or "Unknown") figures.
pub fn analyze<M: MarketData>(
    market: &M,
    settings: &Settings,
    request: &AnalysisRequest,
) -> AnalysisReport {
    let mut warnings = Vec::new();

    // one holding per ticker, or the ticker would correlate with itself
    let holdings = merge_holdings(request.holdings.iter().cloned());
    if holdings.len() < request.holdings.len() {
        warnings.push("Duplicate tickers merged by summing shares".to_string());
    }
    let tickers: Vec<String> = holdings.iter().map(|h| h.ticker.clone()).collect();
    tracing::info!("Analyzing portfolio of {} holdings", tickers.len());

    let quotes = market.fetch_quotes(&tickers);
    for quote in quotes.iter().filter(|q| !q.is_available()) {
        warnings.push(format!("Market data unavailable for {}", quote.ticker));
    }
    let overview = compute_portfolio_metrics(&holdings, &quotes);
    if overview.total_value <= 0.0 && !holdings.is_empty() {
        warnings.push("Portfolio total value is zero; allocations shown as 0%".to_string());
    }

    let history = market.fetch_history(&tickers, settings.risk.period);
    let returns = ReturnSeries::from_prices(&history);
    let risk = RiskReport::compute(&returns, settings.risk.risk_free_rate);
    if !risk.missing.is_empty() {
        warnings.push(format!(
            "No price history for {}; risk metrics omitted",
            risk.missing.join(", ")
        ));
    }

    let suggestions = suggest_add_remove(
        &overview.held_sectors(),
        &tickers,
        &risk.signals(),
        &settings.advisor.sector_map(),
        &settings.advisor.thresholds(),
    );
    tracing::debug!(
        "Advisor produced {} add and {} remove suggestions",
        suggestions.add.len(),
        suggestions.remove.len()
    );

    let mut rebalance = None;
    let mut forecast_table = None;
    if request.simulate {
        if let Some(spec) = &request.target_allocation {
            match parse_target_allocation(spec) {
                Ok(targets) => rebalance = Some(rebalance_portfolio(&overview, &targets)),
                Err(e) => {
                    tracing::warn!("Skipping rebalance: {}", e);
                    warnings.push(format!("Rebalance skipped: {}", e));
                }
            }
        }

        if let Some(spec) = &request.forecast {
            match parse_forecast_spec(spec) {
                Ok(inputs) => {
                    let forecast_tickers: Vec<String> =
                        inputs.iter().map(|i| i.ticker.clone()).collect();
                    let forecast_quotes = market.fetch_quotes(&forecast_tickers);
                    let table =
                        forecast(&inputs, &forecast_quotes, settings.forecast.default_shares);
                    if !table.failures.is_empty() {
                        warnings.push(format!(
                            "Forecast excluded tickers without market data: {}",
                            table.failures.join(", ")
                        ));
                    }
                    forecast_table = Some(table);
                }
                Err(e) => {
                    tracing::warn!("Skipping forecast: {}", e);
                    warnings.push(format!("Forecast skipped: {}", e));
                }
            }
        }
    } else if request.target_allocation.is_some() || request.forecast.is_some() {
        tracing::warn!("What-if input given without simulation");
        warnings.push("What-if sections ignored: simulation not active".to_string());
    }

    AnalysisReport {
        generated_at: Utc::now(),
        sector_allocation: overview.sector_allocation(),
        overview,
        risk,
        suggestions,
        rebalance,
        forecast: forecast_table,
        warnings,
        simulation_active: request.simulate,
    }
}
