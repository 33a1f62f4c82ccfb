//! Asset universe and analytics configuration.

use crate::portfolio::{allocation, AllocationSlice};
use crate::types::AssetSeries;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the universe file location.
pub const UNIVERSE_FILE_ENV: &str = "GMP_UNIVERSE_FILE";

/// Parameters of one analytics run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Return periods per year (252 trading days)
    pub periods_per_year: u32,
    /// Rolling volatility window in periods
    pub window: usize,
    /// Span of the return history in years, used to annualize returns
    pub horizon_years: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            periods_per_year: 252,
            window: 90,
            horizon_years: 5.0,
        }
    }
}

impl AnalyticsConfig {
    /// Reject parameters no analytics run can use.
    pub fn validate(&self) -> Result<()> {
        if self.periods_per_year == 0 {
            return Err(Error::InvalidInput(
                "periods_per_year must be positive".to_string(),
            ));
        }
        if self.window < 2 {
            return Err(Error::InvalidInput(format!(
                "rolling window must span at least 2 periods, got {}",
                self.window
            )));
        }
        if !self.horizon_years.is_finite() || self.horizon_years <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "horizon must be a positive number of years, got {}",
                self.horizon_years
            )));
        }
        Ok(())
    }
}

/// An asset class tracked by the dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetClass {
    /// Display label, used as the asset id
    pub label: String,
    /// ETF ticker used as the price proxy
    pub ticker: String,
    /// Target (market-cap based) weight
    pub weight: f64,
}

impl AssetClass {
    pub fn new(label: &str, ticker: &str, weight: f64) -> Self {
        Self {
            label: label.to_string(),
            ticker: ticker.to_uppercase(),
            weight,
        }
    }
}

/// The tracked asset classes plus analytics parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Universe {
    /// Asset classes in display order
    pub assets: Vec<AssetClass>,
    /// Analytics parameters
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl Default for Universe {
    /// The global market portfolio: six asset classes weighted by market cap.
    fn default() -> Self {
        Self {
            assets: vec![
                AssetClass::new("Global Equities", "VT", 0.55),
                AssetClass::new("Global Bonds", "AGG", 0.25),
                AssetClass::new("Global Real Estate", "VNQ", 0.10),
                AssetClass::new("Commodities", "DBC", 0.05),
                AssetClass::new("Gold", "GLD", 0.03),
                AssetClass::new("Cash", "BIL", 0.02),
            ],
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl Universe {
    /// Get the default universe file path.
    ///
    /// Default path: `~/.gmp/universe.json`
    /// Can be overridden with the `GMP_UNIVERSE_FILE` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(UNIVERSE_FILE_ENV) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".gmp/universe.json"))
            .unwrap_or_else(|| PathBuf::from("universe.json"))
    }

    /// Load the universe from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load the universe from a specific path.
    ///
    /// A missing file yields the built-in universe.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(
                "No universe file at {}, using built-in universe",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let universe: Self = serde_json::from_str(&content)?;
        universe.analytics.validate()?;
        Ok(universe)
    }

    /// Find an asset class by label.
    pub fn find(&self, label: &str) -> Option<&AssetClass> {
        self.assets.iter().find(|asset| asset.label == label)
    }

    /// Target weights keyed by label.
    pub fn weights(&self) -> HashMap<String, f64> {
        self.assets
            .iter()
            .map(|asset| (asset.label.clone(), asset.weight))
            .collect()
    }

    /// Allocation pie of the universe.
    pub fn allocation(&self) -> Result<Vec<AllocationSlice>> {
        allocation(
            self.assets
                .iter()
                .map(|asset| (asset.label.as_str(), Some(asset.ticker.as_str()), asset.weight)),
        )
    }

    /// Overwrite weights and tickers of price series with the universe's.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a series has no matching asset class.
    pub fn apply_to(&self, series: &mut [AssetSeries]) -> Result<()> {
        for asset in series.iter_mut() {
            let class = self.find(&asset.id).ok_or_else(|| {
                Error::InvalidInput(format!("'{}' is not part of the universe", asset.id))
            })?;
            asset.weight = class.weight;
            asset.ticker = Some(class.ticker.clone());
        }
        Ok(())
    }
}

/// Span between two dates in years (`days / 365.25`).
///
/// Lets collaborators derive a horizon from a price history; the analytics
/// themselves take the horizon as a parameter.
pub fn horizon_years_between(start: NaiveDate, end: NaiveDate) -> f64 {
    (end - start).num_days() as f64 / 365.25
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    #[test]
    fn test_default_universe() {
        let universe = Universe::default();

        assert_eq!(universe.assets.len(), 6);
        assert_eq!(universe.find("Gold").unwrap().ticker, "GLD");
        let total: f64 = universe.assets.iter().map(|a| a.weight).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert_eq!(universe.analytics, AnalyticsConfig::default());
    }

    #[test]
    fn test_default_analytics_config() {
        let config = AnalyticsConfig::default();

        assert_eq!(config.periods_per_year, 252);
        assert_eq!(config.window, 90);
        assert_eq!(config.horizon_years, 5.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_analytics_config_validation() {
        let bad = [
            AnalyticsConfig {
                periods_per_year: 0,
                ..Default::default()
            },
            AnalyticsConfig {
                window: 1,
                ..Default::default()
            },
            AnalyticsConfig {
                horizon_years: 0.0,
                ..Default::default()
            },
            AnalyticsConfig {
                horizon_years: f64::INFINITY,
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn test_load_missing_file_uses_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universe.json");

        let universe = Universe::load_from_path(&path).unwrap();
        assert_eq!(universe, Universe::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universe.json");
        fs::write(
            &path,
            r#"{
                "assets": [
                    {"label": "Equities", "ticker": "VT", "weight": 0.7},
                    {"label": "Bonds", "ticker": "AGG", "weight": 0.3}
                ],
                "analytics": {"window": 30}
            }"#,
        )
        .unwrap();

        let universe = Universe::load_from_path(&path).unwrap();
        assert_eq!(universe.assets.len(), 2);
        assert_eq!(universe.analytics.window, 30);
        // Unspecified parameters keep their defaults
        assert_eq!(universe.analytics.periods_per_year, 252);
        assert_eq!(universe.weights()["Bonds"], 0.3);
    }

    #[test]
    fn test_load_rejects_invalid_parameters() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universe.json");
        fs::write(&path, r#"{"assets": [], "analytics": {"window": 1}}"#).unwrap();

        let result = Universe::load_from_path(&path);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("universe.json");
        fs::write(&path, "not json").unwrap();

        let result = Universe::load_from_path(&path);
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_universe_allocation() {
        let slices = Universe::default().allocation().unwrap();

        assert_eq!(slices.len(), 6);
        assert_eq!(slices[0].id, "Global Equities");
        assert_eq!(slices[0].ticker.as_deref(), Some("VT"));
        assert_abs_diff_eq!(slices[0].share, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn test_apply_to_series() {
        let universe = Universe::default();
        let mut series = vec![AssetSeries::new("Gold", 0.0), AssetSeries::new("Cash", 0.0)];

        universe.apply_to(&mut series).unwrap();
        assert_eq!(series[0].weight, 0.03);
        assert_eq!(series[1].ticker.as_deref(), Some("BIL"));

        let mut unknown = vec![AssetSeries::new("Crypto", 0.1)];
        assert!(matches!(
            universe.apply_to(&mut unknown),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_horizon_years_between() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        // 1827 days including two leap days
        assert_abs_diff_eq!(horizon_years_between(start, end), 1827.0 / 365.25, epsilon = 1e-12);
        assert_eq!(horizon_years_between(start, start), 0.0);
    }
}
