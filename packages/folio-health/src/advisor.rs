//! Rule-based add/remove suggestions.
//!
//! Two independent passes:
//!
//! - **Add**: every reference sector not held gets a suggestion to buy its ETF.
//! - **Remove**: every held ticker is checked against volatility rank, average
//!   correlation and Sharpe thresholds; all triggered reasons are combined into
//!   one flag per ticker.

use crate::risk::RiskSignals;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reference sector and the ETF that represents it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectorEtf {
    pub sector: String,
    pub etf: String,
}

impl SectorEtf {
    pub fn new(sector: &str, etf: &str) -> Self {
        Self {
            sector: sector.to_string(),
            etf: etf.to_string(),
        }
    }
}

/// Ordered sector -> ETF reference table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SectorEtfMap(Vec<SectorEtf>);

impl SectorEtfMap {
    pub fn new(entries: Vec<SectorEtf>) -> Self {
        Self(entries)
    }

    /// Entries in table order.
    pub fn entries(&self) -> &[SectorEtf] {
        &self.0
    }

    /// ETF for a sector.
    pub fn etf_for(&self, sector: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.sector == sector)
            .map(|e| e.etf.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SectorEtfMap {
    /// SPDR Select Sector ETFs for ten GICS-style sectors.
    fn default() -> Self {
        Self(vec![
            SectorEtf::new("Technology", "XLK"),
            SectorEtf::new("Healthcare", "XLV"),
            SectorEtf::new("Financial Services", "XLF"),
            SectorEtf::new("Consumer Defensive", "XLP"),
            SectorEtf::new("Industrials", "XLI"),
            SectorEtf::new("Energy", "XLE"),
            SectorEtf::new("Utilities", "XLU"),
            SectorEtf::new("Communication Services", "XLC"),
            SectorEtf::new("Materials", "XLB"),
            SectorEtf::new("Real Estate", "XLRE"),
        ])
    }
}

/// Thresholds for the remove rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdvisorThresholds {
    /// Flag when volatility rank >= this
    pub max_volatility_rank: f64,
    /// Flag when average correlation >= this
    pub max_avg_correlation: f64,
    /// Flag when Sharpe ratio < this
    pub min_sharpe_ratio: f64,
}

impl Default for AdvisorThresholds {
    fn default() -> Self {
        Self {
            max_volatility_rank: 0.80,
            max_avg_correlation: 0.9,
            min_sharpe_ratio: 0.2,
        }
    }
}

/// Why a ticker was flagged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    HighVolatility,
    StrongCorrelation,
    LowSharpe,
}

impl fmt::Display for FlagReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FlagReason::HighVolatility => "high volatility",
            FlagReason::StrongCorrelation => "strong correlation with other assets",
            FlagReason::LowSharpe => "low Sharpe ratio",
        };
        f.write_str(text)
    }
}

/// Suggestion to cover a missing sector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddSuggestion {
    pub sector: String,
    pub etf: String,
    pub message: String,
}

/// A held ticker flagged for review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveSuggestion {
    pub ticker: String,
    pub reasons: Vec<FlagReason>,
    pub message: String,
}

/// Add and remove suggestions from one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Suggestions {
    pub add: Vec<AddSuggestion>,
    pub remove: Vec<RemoveSuggestion>,
}

impl Suggestions {
    /// Whether any suggestion was produced.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Generate add/remove suggestions.
///
/// A ticker missing from a signal map never triggers that rule: a missing
/// volatility rank or average correlation counts as 0, a missing Sharpe ratio
/// as 1.
pub fn suggest_add_remove(
    held_sectors: &[String],
    tickers: &[String],
    signals: &RiskSignals,
    sectors: &SectorEtfMap,
    thresholds: &AdvisorThresholds,
) -> Suggestions {
    let add = sectors
        .entries()
        .iter()
        .filter(|entry| !held_sectors.contains(&entry.sector))
        .map(|entry| AddSuggestion {
            sector: entry.sector.clone(),
            etf: entry.etf.clone(),
            message: format!(
                "{} exposure missing. Suggest adding {}.",
                entry.sector, entry.etf
            ),
        })
        .collect();

    let mut remove = Vec::new();
    for ticker in tickers {
        let mut reasons = Vec::new();
        if signals.vol_rank.get(ticker).copied().unwrap_or(0.0) >= thresholds.max_volatility_rank {
            reasons.push(FlagReason::HighVolatility);
        }
        if signals.avg_correlation.get(ticker).copied().unwrap_or(0.0)
            >= thresholds.max_avg_correlation
        {
            reasons.push(FlagReason::StrongCorrelation);
        }
        if signals.sharpe.get(ticker).copied().unwrap_or(1.0) < thresholds.min_sharpe_ratio {
            reasons.push(FlagReason::LowSharpe);
        }

        if !reasons.is_empty() {
            let joined: Vec<String> = reasons.iter().map(|r| r.to_string()).collect();
            remove.push(RemoveSuggestion {
                ticker: ticker.clone(),
                message: format!(
                    "{} flagged for: {}. Consider reviewing this position.",
                    ticker,
                    joined.join(", ")
                ),
                reasons,
            });
        }
    }

    Suggestions { add, remove }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn signals(rows: &[(&str, f64, f64, f64)]) -> RiskSignals {
        let mut signals = RiskSignals::default();
        for (ticker, rank, corr, sharpe) in rows {
            signals.vol_rank.insert(ticker.to_string(), *rank);
            signals.avg_correlation.insert(ticker.to_string(), *corr);
            signals.sharpe.insert(ticker.to_string(), *sharpe);
        }
        signals
    }

    #[test]
    fn test_default_table() {
        let map = SectorEtfMap::default();
        assert_eq!(map.len(), 10);
        assert_eq!(map.etf_for("Real Estate"), Some("XLRE"));
        assert_eq!(map.etf_for("Crypto"), None);
    }

    #[test]
    fn test_add_missing_sectors_in_table_order() {
        let suggestions = suggest_add_remove(
            &strings(&["Technology", "Healthcare"]),
            &[],
            &RiskSignals::default(),
            &SectorEtfMap::default(),
            &AdvisorThresholds::default(),
        );

        assert_eq!(suggestions.add.len(), 8);
        assert_eq!(suggestions.add[0].sector, "Financial Services");
        assert_eq!(
            suggestions.add[0].message,
            "Financial Services exposure missing. Suggest adding XLF."
        );
        assert_eq!(suggestions.add[7].etf, "XLRE");
        assert!(suggestions
            .add
            .iter()
            .all(|s| s.sector != "Technology" && s.sector != "Healthcare"));
    }

    #[test]
    fn test_unknown_sector_does_not_count_as_coverage() {
        let suggestions = suggest_add_remove(
            &strings(&["Unknown"]),
            &[],
            &RiskSignals::default(),
            &SectorEtfMap::default(),
            &AdvisorThresholds::default(),
        );
        assert_eq!(suggestions.add.len(), 10);
    }

    #[test]
    fn test_high_volatility_only() {
        let suggestions = suggest_add_remove(
            &[],
            &strings(&["TSLA"]),
            &signals(&[("TSLA", 0.85, 0.5, 0.5)]),
            &SectorEtfMap::default(),
            &AdvisorThresholds::default(),
        );

        assert_eq!(suggestions.remove.len(), 1);
        assert_eq!(suggestions.remove[0].reasons, vec![FlagReason::HighVolatility]);
        assert_eq!(
            suggestions.remove[0].message,
            "TSLA flagged for: high volatility. Consider reviewing this position."
        );
    }

    #[test]
    fn test_all_reasons_combined() {
        let suggestions = suggest_add_remove(
            &[],
            &strings(&["BAD"]),
            &signals(&[("BAD", 0.80, 0.9, 0.1)]),
            &SectorEtfMap::default(),
            &AdvisorThresholds::default(),
        );

        let flag = &suggestions.remove[0];
        assert_eq!(
            flag.reasons,
            vec![
                FlagReason::HighVolatility,
                FlagReason::StrongCorrelation,
                FlagReason::LowSharpe
            ]
        );
        assert_eq!(
            flag.message,
            "BAD flagged for: high volatility, strong correlation with other assets, low Sharpe ratio. Consider reviewing this position."
        );
    }

    #[test]
    fn test_clean_ticker_not_flagged() {
        let suggestions = suggest_add_remove(
            &[],
            &strings(&["GOOD"]),
            &signals(&[("GOOD", 0.3, 0.4, 1.5)]),
            &SectorEtfMap::default(),
            &AdvisorThresholds::default(),
        );
        assert!(suggestions.remove.is_empty());
    }

    #[test]
    fn test_missing_metrics_do_not_flag() {
        let suggestions = suggest_add_remove(
            &[],
            &strings(&["NODATA"]),
            &RiskSignals::default(),
            &SectorEtfMap::default(),
            &AdvisorThresholds::default(),
        );
        assert!(suggestions.remove.is_empty());
    }

    #[test]
    fn test_thresholds_override() {
        let strict = AdvisorThresholds {
            max_volatility_rank: 0.5,
            max_avg_correlation: 0.3,
            min_sharpe_ratio: 1.0,
        };
        let suggestions = suggest_add_remove(
            &[],
            &strings(&["MID"]),
            &signals(&[("MID", 0.6, 0.4, 0.8)]),
            &SectorEtfMap::default(),
            &strict,
        );
        assert_eq!(suggestions.remove[0].reasons.len(), 3);
    }

    #[test]
    fn test_custom_sector_table() {
        let map = SectorEtfMap::new(vec![
            SectorEtf::new("Technology", "VGT"),
            SectorEtf::new("Gold", "GLD"),
        ]);
        let suggestions = suggest_add_remove(
            &strings(&["Technology"]),
            &[],
            &RiskSignals::default(),
            &map,
            &AdvisorThresholds::default(),
        );
        assert_eq!(suggestions.add.len(), 1);
        assert_eq!(suggestions.add[0].etf, "GLD");
    }
}
