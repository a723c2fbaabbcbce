//! Rebalancing toward target allocation percentages.

use super::metrics::PortfolioOverview;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of the rebalance table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RebalanceRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Shares")]
    pub shares: f64,
    #[serde(rename = "Price")]
    pub price: Option<f64>,
    #[serde(rename = "Market Value")]
    pub market_value: Option<f64>,
    #[serde(rename = "Allocation %")]
    pub allocation_pct: Option<f64>,
    #[serde(rename = "Target %")]
    pub target_pct: f64,
    #[serde(rename = "Target Value")]
    pub target_value: f64,
    /// Positive = buy, negative = sell
    #[serde(rename = "Rebalance Action ($)")]
    pub action: f64,
}

/// Rebalance actions for every held position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RebalanceTable {
    pub rows: Vec<RebalanceRow>,
    pub total_value: f64,
    /// Target tickers that are not held, sorted
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unmatched_targets: Vec<String>,
}

impl RebalanceTable {
    /// Find a row by ticker.
    pub fn row(&self, ticker: &str) -> Option<&RebalanceRow> {
        self.rows.iter().find(|r| r.ticker == ticker)
    }

    /// Net cash needed to execute all actions (positive = cash in).
    pub fn net_action(&self) -> f64 {
        self.rows.iter().map(|r| r.action).sum()
    }
}

/// Dollar amount to buy or sell per position to reach target percentages.
///
/// Targets need not sum to 100. Held tickers without a target get 0%.
/// A position with no market value is treated as holding 0.
pub fn rebalance_portfolio(
    overview: &PortfolioOverview,
    targets: &HashMap<String, f64>,
) -> RebalanceTable {
    let total_value = overview.total_value;

    let rows = overview
        .positions
        .iter()
        .map(|p| {
            let target_pct = targets.get(&p.ticker).copied().unwrap_or(0.0);
            let target_value = target_pct * total_value / 100.0;
            RebalanceRow {
                ticker: p.ticker.clone(),
                shares: p.shares,
                price: p.price,
                market_value: p.market_value,
                allocation_pct: p.allocation_pct,
                target_pct,
                target_value,
                action: target_value - p.market_value.unwrap_or(0.0),
            }
        })
        .collect();

    let mut unmatched_targets: Vec<String> = targets
        .keys()
        .filter(|t| overview.position(t).is_none())
        .cloned()
        .collect();
    unmatched_targets.sort();
    if !unmatched_targets.is_empty() {
        tracing::warn!("Targets for tickers not held: {}", unmatched_targets.join(", "));
    }

    RebalanceTable {
        rows,
        total_value,
        unmatched_targets,
    }
}
