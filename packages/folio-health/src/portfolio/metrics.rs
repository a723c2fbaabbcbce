//! Portfolio valuation: market value and allocation per position.

use crate::math::safe_div;
use crate::types::{Holding, Position, Quote, UNKNOWN_SECTOR};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Holdings joined with quotes, plus the portfolio total.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PortfolioOverview {
    pub positions: Vec<Position>,
    /// Sum of defined market values
    pub total_value: f64,
}

/// Market value held in one sector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorAllocation {
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Market Value")]
    pub market_value: f64,
    #[serde(rename = "Allocation %")]
    pub allocation_pct: f64,
}

/// Join holdings to quotes on ticker and compute market value and allocation.
///
/// This is a left join: a holding without a quote row stays in the output with
/// no price, sector, market value or allocation.
pub fn compute_portfolio_metrics(holdings: &[Holding], quotes: &[Quote]) -> PortfolioOverview {
    let by_ticker: HashMap<&str, &Quote> = quotes.iter().map(|q| (q.ticker.as_str(), q)).collect();

    let joined: Vec<Position> = holdings
        .iter()
        .map(|h| Position::from_holding(h, by_ticker.get(h.ticker.as_str()).copied()))
        .collect();

    let total_value: f64 = joined.iter().filter_map(|p| p.market_value).sum();
    if total_value <= 0.0 {
        tracing::warn!("Portfolio total value is zero; allocations reported as 0%");
    }

    PortfolioOverview {
        positions: joined
            .into_iter()
            .map(|p| p.with_allocation(total_value))
            .collect(),
        total_value,
    }
}

impl PortfolioOverview {
    /// Find a position by ticker.
    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.ticker == ticker)
    }

    /// Tickers in holding order.
    pub fn tickers(&self) -> Vec<String> {
        self.positions.iter().map(|p| p.ticker.clone()).collect()
    }

    /// Distinct sectors held, in first-seen order. Positions without a quote
    /// contribute no sector.
    pub fn held_sectors(&self) -> Vec<String> {
        let mut sectors: Vec<String> = Vec::new();
        for sector in self.positions.iter().filter_map(|p| p.sector.as_ref()) {
            if !sectors.contains(sector) {
                sectors.push(sector.clone());
            }
        }
        sectors
    }

    /// Market value and allocation aggregated by sector, largest first.
    pub fn sector_allocation(&self) -> Vec<SectorAllocation> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for p in &self.positions {
            let Some(mv) = p.market_value else {
                continue;
            };
            let sector = p.sector.as_deref().unwrap_or(UNKNOWN_SECTOR);
            match totals.iter_mut().find(|(s, _)| s == sector) {
                Some((_, total)) => *total += mv,
                None => totals.push((sector.to_string(), mv)),
            }
        }

        let mut allocation: Vec<SectorAllocation> = totals
            .into_iter()
            .map(|(sector, market_value)| SectorAllocation {
                sector,
                market_value,
                allocation_pct: safe_div(100.0 * market_value, self.total_value),
            })
            .collect();
        allocation.sort_by(|a, b| {
            b.market_value
                .partial_cmp(&a.market_value)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        allocation
    }
}
