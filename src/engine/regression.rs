//! GDP versus CO₂ emissions linear regression on a seeded split.

use crate::data::MetricTable;
use crate::error::{ForecastError, Result};
use crate::utils::metrics::mse;
use crate::utils::ols::ols_fit;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Train/test split parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Share of rows held out for testing, in (0, 1).
    pub test_fraction: f64,
    /// Seed of the shuffle.
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    /// Number of held-out rows for `n` samples: `ceil(n * test_fraction)`.
    pub fn test_size(&self, n: usize) -> usize {
        (n as f64 * self.test_fraction).ceil() as usize
    }

    /// Shuffle `0..n` deterministically and split into (train, test).
    pub fn split_indices(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);
        let test = indices.split_off(n - self.test_size(n).min(n));
        (indices, test)
    }
}

/// One (entity, year) row present in both tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRow {
    pub entity: String,
    pub name: String,
    pub year: i32,
    pub gdp: f64,
    pub emissions: f64,
}

/// A held-out row with the model's prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestPoint {
    pub name: String,
    pub gdp: f64,
    pub actual: f64,
    pub predicted: f64,
}

/// Fitted regression and its test-set evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub intercept: f64,
    /// Mean squared error on the held-out rows.
    pub mse: f64,
    pub train_size: usize,
    pub test_points: Vec<TestPoint>,
    /// Two points of the fitted line spanning the test GDP range.
    pub fitted_line: [(f64, f64); 2],
}

/// Per-(entity, year) means of a table.
fn annual_means(table: &MetricTable) -> BTreeMap<(String, i32), f64> {
    let mut sums: BTreeMap<(String, i32), (f64, usize)> = BTreeMap::new();
    for obs in table.observations() {
        if !obs.value.is_finite() {
            continue;
        }
        let entry = sums
            .entry((obs.entity.clone(), obs.period.calendar_year()))
            .or_insert((0.0, 0));
        entry.0 += obs.value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Inner join of emissions and GDP on (entity code, year), sorted by key.
pub fn join_on_entity_year(emissions: &MetricTable, gdp: &MetricTable) -> Vec<JoinedRow> {
    let gdp_means = annual_means(gdp);
    annual_means(emissions)
        .into_iter()
        .filter_map(|((entity, year), co2)| {
            let gdp_value = *gdp_means.get(&(entity.clone(), year))?;
            let name = emissions
                .entity_name(&entity)
                .or_else(|| gdp.entity_name(&entity))
                .unwrap_or(&entity)
                .to_string();
            Some(JoinedRow {
                entity,
                name,
                year,
                gdp: gdp_value,
                emissions: co2,
            })
        })
        .collect()
}

/// Fit `emissions = intercept + slope * gdp` on a seeded split of the
/// joined rows and evaluate it on the held-out rows.
///
/// # Errors
/// * `InsufficientData` with fewer than 3 joined rows (or fewer than 2
///   training rows after the split)
/// * `ModelFit` if the training GDP values are all equal
pub fn gdp_co2_regression(
    emissions: &MetricTable,
    gdp: &MetricTable,
    split: &SplitConfig,
) -> Result<RegressionResult> {
    let rows = join_on_entity_year(emissions, gdp);
    if rows.len() < 3 {
        return Err(ForecastError::InsufficientData {
            needed: 3,
            got: rows.len(),
        });
    }

    let (train, test) = split.split_indices(rows.len());
    if train.len() < 2 || test.is_empty() {
        return Err(ForecastError::InsufficientData {
            needed: 2,
            got: train.len(),
        });
    }

    let y: Vec<f64> = train.iter().map(|&i| rows[i].emissions).collect();
    let x: Vec<f64> = train.iter().map(|&i| rows[i].gdp).collect();
    let fit = ols_fit(&y, &[("gdp".to_string(), x)])?;
    let slope = fit.coefficients[0];

    let test_points: Vec<TestPoint> = test
        .iter()
        .map(|&i| TestPoint {
            name: rows[i].name.clone(),
            gdp: rows[i].gdp,
            actual: rows[i].emissions,
            predicted: fit.intercept + slope * rows[i].gdp,
        })
        .collect();

    let actual: Vec<f64> = test_points.iter().map(|p| p.actual).collect();
    let predicted: Vec<f64> = test_points.iter().map(|p| p.predicted).collect();
    let mse = mse(&actual, &predicted);
    if !mse.is_finite() {
        return Err(ForecastError::ModelFit("test error is not finite".to_string()));
    }

    let min_gdp = test_points.iter().map(|p| p.gdp).fold(f64::INFINITY, f64::min);
    let max_gdp = test_points.iter().map(|p| p.gdp).fold(f64::NEG_INFINITY, f64::max);
    let line_at = |g: f64| (g, fit.intercept + slope * g);

    debug!(
        rows = rows.len(),
        train = train.len(),
        test = test_points.len(),
        mse,
        "GDP/CO2 regression fitted"
    );

    Ok(RegressionResult {
        slope,
        intercept: fit.intercept,
        mse,
        train_size: train.len(),
        test_points,
        fitted_line: [line_at(min_gdp), line_at(max_gdp)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Period;
    use approx::assert_relative_eq;

    fn tables(n: usize) -> (MetricTable, MetricTable) {
        let mut emissions = MetricTable::new("co2");
        let mut gdp = MetricTable::new("gdp");
        for i in 0..n {
            let year = 1990 + i as i32;
            let g = 1.0e11 * (1.0 + i as f64);
            gdp.push("USA", "United States", Period::year(year), g);
            emissions.push("USA", "United States", Period::year(year), 10.0 + 3e-10 * g);
        }
        // Only in one table: dropped by the join.
        gdp.push("FRA", "France", Period::year(1990), 1.0e11);
        (emissions, gdp)
    }

    #[test]
    fn split_sizes_follow_ceiling() {
        let split = SplitConfig::default();
        assert_eq!(split.test_size(10), 2);
        assert_eq!(split.test_size(11), 3);
        let (train, test) = split.split_indices(11);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 3);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_seeded() {
        let split = SplitConfig::default();
        assert_eq!(split.split_indices(50), split.split_indices(50));
        let other = SplitConfig { seed: 7, ..split };
        assert_ne!(split.split_indices(50), other.split_indices(50));
    }

    #[test]
    fn join_keeps_shared_keys_only() {
        let (emissions, gdp) = tables(5);
        let rows = join_on_entity_year(&emissions, &gdp);
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.entity == "USA"));
        assert_eq!(rows[0].name, "United States");
    }

    #[test]
    fn exact_linear_relation_is_recovered() {
        let (emissions, gdp) = tables(20);
        let result = gdp_co2_regression(&emissions, &gdp, &SplitConfig::default()).unwrap();

        assert_relative_eq!(result.slope, 3e-10, max_relative = 1e-6);
        assert_relative_eq!(result.intercept, 10.0, epsilon = 1e-4);
        assert!(result.mse >= 0.0 && result.mse < 1e-6);
        assert_eq!(result.test_points.len(), 4);
        assert_eq!(result.train_size, 16);
        assert!(result.fitted_line[0].0 <= result.fitted_line[1].0);
    }

    #[test]
    fn too_few_rows() {
        let (emissions, gdp) = tables(2);
        assert_eq!(
            gdp_co2_regression(&emissions, &gdp, &SplitConfig::default()),
            Err(ForecastError::InsufficientData { needed: 3, got: 2 })
        );
    }

    #[test]
    fn regression_is_deterministic() {
        let (emissions, gdp) = tables(30);
        let a = gdp_co2_regression(&emissions, &gdp, &SplitConfig::default()).unwrap();
        let b = gdp_co2_regression(&emissions, &gdp, &SplitConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
