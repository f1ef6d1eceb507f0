//! Dashboard configuration.
//!
//! Every field has a default, so an empty TOML document yields the stock
//! dashboard. Model orders are not configurable; see
//! [`SARIMASpec::DASHBOARD`](crate::models::arima::SARIMASpec::DASHBOARD).

use crate::data::DataSources;
use crate::engine::{EvaluationConfig, SplitConfig, DEFAULT_MAX_HORIZON_YEARS};
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of the source CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub emissions: PathBuf,
    pub temperature: PathBuf,
    pub gdp: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            emissions: PathBuf::from("data/co2_emissions_kt_by_country.csv"),
            temperature: PathBuf::from("data/global_temperature.csv"),
            gdp: PathBuf::from("data/gdp_data.csv"),
        }
    }
}

impl DataPaths {
    /// Resolve relative paths against `base`.
    pub fn relative_to(&self, base: &Path) -> DataPaths {
        let resolve = |p: &PathBuf| if p.is_absolute() { p.clone() } else { base.join(p) };
        DataPaths {
            emissions: resolve(&self.emissions),
            temperature: resolve(&self.temperature),
            gdp: resolve(&self.gdp),
        }
    }

    pub fn sources(&self) -> DataSources<'_> {
        DataSources {
            emissions: &self.emissions,
            temperature: &self.temperature,
            gdp: &self.gdp,
        }
    }
}

/// Top-level dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Entity shown when the selector is empty.
    pub default_entity: String,
    /// CO₂ forecast target when none is entered.
    pub default_target_year: i32,
    /// Two-sided interval confidence, in (0, 1).
    pub confidence: f64,
    /// Temperature forecast default target, in years past the last observation.
    pub temperature_horizon_years: i32,
    /// Targets further than this past the last observed year are rejected.
    pub max_horizon_years: i32,
    pub data: DataPaths,
    pub regression: SplitConfig,
    pub evaluation: EvaluationConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_entity: "USA".to_string(),
            default_target_year: 2033,
            confidence: 0.90,
            temperature_horizon_years: 10,
            max_horizon_years: DEFAULT_MAX_HORIZON_YEARS,
            data: DataPaths::default(),
            regression: SplitConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: DashboardConfig =
            toml::from_str(source).map_err(|e| ForecastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file. Relative data paths are
    /// resolved against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ForecastError::Config(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&source)?;
        if let Some(dir) = path.parent() {
            config.data = config.data.relative_to(dir);
        }
        Ok(config)
    }

    /// Serialise to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ForecastError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_entity.trim().is_empty() {
            return Err(ForecastError::Config("default_entity must not be empty".into()));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ForecastError::Config(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        let fraction = self.regression.test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(ForecastError::Config(format!(
                "regression.test_fraction must be in (0, 1), got {}",
                fraction
            )));
        }
        if self.evaluation.splits < 2 {
            return Err(ForecastError::Config(format!(
                "evaluation.splits must be at least 2, got {}",
                self.evaluation.splits
            )));
        }
        if self.temperature_horizon_years < 1 {
            return Err(ForecastError::Config(
                "temperature_horizon_years must be positive".into(),
            ));
        }
        if self.max_horizon_years < self.temperature_horizon_years {
            return Err(ForecastError::Config(format!(
                "max_horizon_years ({}) must cover temperature_horizon_years ({})",
                self.max_horizon_years, self.temperature_horizon_years
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.default_entity, "USA");
        assert_eq!(config.default_target_year, 2033);
        assert_eq!(config.regression.seed, 42);
        assert_eq!(config.evaluation.splits, 5);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            default_entity = "DEU"

            [regression]
            seed = 7

            [data]
            gdp = "other/gdp.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.default_entity, "DEU");
        assert_eq!(config.regression.seed, 7);
        assert_eq!(config.regression.test_fraction, 0.2);
        assert_eq!(config.data.gdp, PathBuf::from("other/gdp.csv"));
        assert_eq!(config.data.temperature, DataPaths::default().temperature);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            DashboardConfig::from_toml_str("confidence = 1.5"),
            Err(ForecastError::Config(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml_str("[evaluation]\nsplits = 1"),
            Err(ForecastError::Config(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml_str("max_horizon_years = 5"),
            Err(ForecastError::Config(_))
        ));
        assert!(matches!(
            DashboardConfig::from_toml_str("confidence = \"high\""),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn toml_round_trip() {
        let config = DashboardConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(DashboardConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let paths = DataPaths::default().relative_to(Path::new("/srv/dashboard"));
        assert_eq!(paths.gdp, PathBuf::from("/srv/dashboard/data/gdp_data.csv"));
    }
}
