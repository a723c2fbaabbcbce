//! Analysis settings loaded from TOML.
//!
//! ```toml
//! [risk]
//! risk_free_rate = 0.02
//! period = "6mo"
//!
//! [advisor]
//! max_volatility_rank = 0.80
//! max_avg_correlation = 0.9
//! min_sharpe_ratio = 0.2
//!
//! [[advisor.sectors]]
//! sector = "Technology"
//! etf = "VGT"
//!
//! [forecast]
//! default_shares = 10
//! ```

use crate::advisor::{AdvisorThresholds, SectorEtf, SectorEtfMap};
use crate::market::Period;
use crate::portfolio::DEFAULT_FORECAST_SHARES;
use crate::risk::DEFAULT_RISK_FREE_RATE;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// All tunable parameters of an analysis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub risk: RiskSettings,
    pub advisor: AdvisorSettings,
    pub forecast: ForecastSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskSettings {
    /// Annual risk-free rate for Sharpe
    pub risk_free_rate: f64,
    /// Price history lookback
    pub period: Period,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            period: Period::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdvisorSettings {
    pub max_volatility_rank: f64,
    pub max_avg_correlation: f64,
    pub min_sharpe_ratio: f64,
    /// Replaces the built-in sector table when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<SectorEtf>>,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        let thresholds = AdvisorThresholds::default();
        Self {
            max_volatility_rank: thresholds.max_volatility_rank,
            max_avg_correlation: thresholds.max_avg_correlation,
            min_sharpe_ratio: thresholds.min_sharpe_ratio,
            sectors: None,
        }
    }
}

impl AdvisorSettings {
    pub fn thresholds(&self) -> AdvisorThresholds {
        AdvisorThresholds {
            max_volatility_rank: self.max_volatility_rank,
            max_avg_correlation: self.max_avg_correlation,
            min_sharpe_ratio: self.min_sharpe_ratio,
        }
    }

    /// The sector table in effect.
    pub fn sector_map(&self) -> SectorEtfMap {
        match &self.sectors {
            Some(entries) => SectorEtfMap::new(entries.clone()),
            None => SectorEtfMap::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ForecastSettings {
    /// Shares assumed when a forecast entry omits them
    pub default_shares: f64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            default_shares: DEFAULT_FORECAST_SHARES,
        }
    }
}

impl Settings {
    /// Get the default settings file path.
    ///
    /// Default path: `~/.folio/config.toml`
    /// Can be overridden with `FOLIO_CONFIG_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FOLIO_CONFIG_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".folio/config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
