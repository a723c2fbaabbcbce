//! Risk analytics over daily return series.
//!
//! Provides annualized volatility, Sharpe ratio, correlation matrix, average
//! correlation and cohort-relative volatility rank.

mod correlation;
mod metrics;

pub use correlation::CorrelationMatrix;
pub use metrics::{annualized_volatility, daily_risk_free_rate, sharpe_ratio};

use crate::math::percentile_ranks;
use crate::returns::ReturnSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default annual risk-free rate.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Risk figures for one ticker. `None` marks a figure that is undefined for
/// the available data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickerRisk {
    pub ticker: String,
    /// Annualized volatility as a fraction
    pub volatility: Option<f64>,
    /// Annualized Sharpe ratio
    pub sharpe_ratio: Option<f64>,
    /// Percentile of volatility within the held tickers, 0-1
    pub volatility_rank: Option<f64>,
    /// Mean correlation with the other held tickers
    pub avg_correlation: Option<f64>,
}

/// Risk metrics bundle for a set of tickers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskReport {
    /// Annual risk-free rate used for Sharpe
    pub risk_free_rate: f64,
    /// Number of aligned daily observations
    pub observations: usize,
    pub tickers: Vec<TickerRisk>,
    pub correlation: CorrelationMatrix,
    /// Tickers left out for lack of price data
    pub missing: Vec<String>,
}

impl RiskReport {
    /// Calculate all risk metrics from a return table.
    pub fn compute(returns: &ReturnSeries, risk_free_rate: f64) -> Self {
        let correlation = CorrelationMatrix::from_returns(returns);

        let mut tickers: Vec<TickerRisk> = returns
            .tickers
            .iter()
            .zip(&returns.columns)
            .map(|(ticker, column)| TickerRisk {
                ticker: ticker.clone(),
                volatility: annualized_volatility(column),
                sharpe_ratio: sharpe_ratio(column, risk_free_rate),
                volatility_rank: None,
                avg_correlation: correlation.average_correlation(ticker),
            })
            .collect();

        // Rank only over tickers with a defined volatility
        let ranked: Vec<(usize, f64)> = tickers
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.volatility.map(|v| (i, v)))
            .collect();
        let vols: Vec<f64> = ranked.iter().map(|(_, v)| *v).collect();
        for ((i, _), rank) in ranked.iter().zip(percentile_ranks(&vols)) {
            tickers[*i].volatility_rank = Some(rank);
        }

        tracing::debug!(
            "Computed risk for {} tickers over {} observations",
            tickers.len(),
            returns.len()
        );

        Self {
            risk_free_rate,
            observations: returns.len(),
            tickers,
            correlation,
            missing: returns.dropped.clone(),
        }
    }

    /// Risk figures for a ticker.
    pub fn ticker(&self, ticker: &str) -> Option<&TickerRisk> {
        self.tickers.iter().find(|t| t.ticker == ticker)
    }

    /// Lookups consumed by the advisor, holding only finite values.
    pub fn signals(&self) -> RiskSignals {
        let mut signals = RiskSignals::default();
        for t in &self.tickers {
            if let Some(rank) = t.volatility_rank.filter(|v| v.is_finite()) {
                signals.vol_rank.insert(t.ticker.clone(), rank);
            }
            if let Some(corr) = t.avg_correlation.filter(|v| v.is_finite()) {
                signals.avg_correlation.insert(t.ticker.clone(), corr);
            }
            if let Some(sharpe) = t.sharpe_ratio.filter(|v| v.is_finite()) {
                signals.sharpe.insert(t.ticker.clone(), sharpe);
            }
        }
        signals
    }
}

/// Per-ticker metric lookups for the advisor's remove rule.
///
/// A ticker absent from a map has no data for that metric.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskSignals {
    pub vol_rank: HashMap<String, f64>,
    pub avg_correlation: HashMap<String, f64>,
    pub sharpe: HashMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PriceHistory;
    use chrono::NaiveDate;

    fn history(columns: &[(&str, Vec<Option<f64>>)]) -> PriceHistory {
        let n = columns[0].1.len() as u32;
        let dates = (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2024, 2, 1 + i).unwrap())
            .collect();
        columns
            .iter()
            .fold(PriceHistory::new(dates), |h, (t, p)| h.with_column(t, p.clone()))
    }

    fn prices(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_compute_ranks_by_volatility() {
        let returns = ReturnSeries::from_prices(&history(&[
            ("CALM", prices(&[100.0, 100.5, 100.2, 100.8, 100.6, 101.0])),
            ("WILD", prices(&[100.0, 108.0, 95.0, 110.0, 92.0, 105.0])),
            ("MID", prices(&[100.0, 102.0, 99.0, 103.0, 100.0, 102.5])),
        ]));
        let report = RiskReport::compute(&returns, DEFAULT_RISK_FREE_RATE);

        assert_eq!(report.observations, 5);
        let calm = report.ticker("CALM").unwrap();
        let mid = report.ticker("MID").unwrap();
        let wild = report.ticker("WILD").unwrap();

        assert!(wild.volatility.unwrap() > mid.volatility.unwrap());
        assert!(mid.volatility.unwrap() > calm.volatility.unwrap());
        assert_eq!(wild.volatility_rank, Some(1.0));
        assert!((mid.volatility_rank.unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((calm.volatility_rank.unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!(calm.avg_correlation.is_some());
    }

    #[test]
    fn test_single_ticker_report() {
        let returns = ReturnSeries::from_prices(&history(&[(
            "SOLO",
            prices(&[10.0, 10.2, 10.1, 10.4]),
        )]));
        let report = RiskReport::compute(&returns, DEFAULT_RISK_FREE_RATE);
        let solo = report.ticker("SOLO").unwrap();

        assert!(solo.volatility.is_some());
        assert_eq!(solo.volatility_rank, Some(1.0));
        assert!(solo.avg_correlation.is_none());

        let signals = report.signals();
        assert!(signals.avg_correlation.is_empty());
        assert!(signals.vol_rank.contains_key("SOLO"));
    }

    #[test]
    fn test_missing_tickers_reported() {
        let returns = ReturnSeries::from_prices(&history(&[
            ("AAPL", prices(&[1.0, 1.1, 1.2])),
            ("GONE", vec![None, None, None]),
        ]));
        let report = RiskReport::compute(&returns, DEFAULT_RISK_FREE_RATE);

        assert_eq!(report.missing, vec!["GONE"]);
        assert!(report.ticker("GONE").is_none());
    }

    #[test]
    fn test_zero_variance_sharpe_left_out_of_signals() {
        // constant 1% daily growth -> zero variance of returns
        let flat: Vec<f64> = (0..6).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let returns = ReturnSeries::from_prices(&history(&[
            ("FLAT", prices(&flat)),
            ("MOVE", prices(&[100.0, 103.0, 99.0, 104.0, 98.0, 101.0])),
        ]));
        let report = RiskReport::compute(&returns, DEFAULT_RISK_FREE_RATE);

        assert!(report.ticker("FLAT").unwrap().sharpe_ratio.is_none());
        let signals = report.signals();
        assert!(!signals.sharpe.contains_key("FLAT"));
        assert!(signals.sharpe.contains_key("MOVE"));
    }

    #[test]
    fn test_empty_returns() {
        let report = RiskReport::compute(&ReturnSeries::default(), DEFAULT_RISK_FREE_RATE);
        assert!(report.tickers.is_empty());
        assert_eq!(report.observations, 0);
    }
}
