//! Cross-validated evaluation of the temperature anomaly regression.
//!
//! Predicts the annual anomaly from the monthly and smoothed (five, ten
//! and twenty year) anomalies with a linear model, scored on expanding
//! time-series folds.

use crate::core::impute_mean;
use crate::data::{TemperatureRecord, TemperatureTable};
use crate::error::{ForecastError, Result};
use crate::transform::standardize_columns;
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};
use crate::utils::ols::ols_fit;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Feature columns in model order.
pub const FEATURES: [&str; 4] = [
    "Monthly Anomaly",
    "Five-Year Anomaly",
    "Ten-Year Anomaly",
    "Twenty-Year Anomaly",
];

/// Cross-validation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of expanding-window folds.
    pub splits: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { splits: 5 }
    }
}

/// Train/test index ranges of one fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: std::ops::Range<usize>,
    pub test: std::ops::Range<usize>,
}

/// Expanding-window folds over `n` chronologically ordered samples.
///
/// Each test block has `n / (splits + 1)` samples; fold `i` trains on
/// everything before its test block. Blocks end at the last sample.
pub fn time_series_folds(n: usize, splits: usize) -> Result<Vec<Fold>> {
    if splits < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "need at least 2 splits, got {}",
            splits
        )));
    }
    let test_size = n / (splits + 1);
    if test_size == 0 {
        return Err(ForecastError::InsufficientData {
            needed: splits + 1,
            got: n,
        });
    }
    let first_test = n - splits * test_size;
    Ok((0..splits)
        .map(|i| {
            let start = first_test + i * test_size;
            Fold {
                train: 0..start,
                test: start..start + test_size,
            }
        })
        .collect())
}

/// Cross-validation summary and the final model's coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub mean_mse: f64,
    pub mean_r_squared: f64,
    pub mean_mae: f64,
    pub folds: Vec<AccuracyMetrics>,
    /// `(feature, coefficient)` of a model fitted on all standardised data.
    pub coefficients: Vec<(String, f64)>,
    pub samples: usize,
}

/// Column-major feature matrix and target after mean imputation.
struct Dataset {
    features: Vec<Vec<f64>>,
    target: Vec<f64>,
}

fn column(
    records: &[&TemperatureRecord],
    pick: fn(&TemperatureRecord) -> Option<f64>,
) -> Result<Vec<f64>> {
    let mut values: Vec<f64> = records
        .iter()
        .map(|r| pick(r).unwrap_or(f64::NAN))
        .collect();
    impute_mean(&mut values)?;
    Ok(values)
}

fn prepare(table: &TemperatureTable) -> Result<Dataset> {
    let mut records: Vec<&TemperatureRecord> = table.records().iter().collect();
    records.sort_by_key(|r| (r.year, r.month));

    let pickers: [fn(&TemperatureRecord) -> Option<f64>; 4] = [
        |r| r.monthly,
        |r| r.five_year,
        |r| r.ten_year,
        |r| r.twenty_year,
    ];
    let features = pickers
        .iter()
        .map(|&pick| column(&records, pick))
        .collect::<Result<Vec<_>>>()?;
    let target = column(&records, |r| r.annual)?;
    Ok(Dataset { features, target })
}

fn select(columns: &[Vec<f64>], range: std::ops::Range<usize>) -> Vec<Vec<f64>> {
    columns.iter().map(|c| c[range.clone()].to_vec()).collect()
}

fn named(columns: Vec<Vec<f64>>) -> Vec<(String, Vec<f64>)> {
    FEATURES
        .iter()
        .map(|name| name.to_string())
        .zip(columns)
        .collect()
}

/// Evaluate the anomaly regression with time-series cross-validation.
///
/// Missing values are imputed with their column mean, features are
/// standardised on each training fold, and the reported coefficients come
/// from a final fit on the whole standardised dataset.
pub fn evaluate_temperature_model(
    table: &TemperatureTable,
    config: &EvaluationConfig,
) -> Result<EvaluationReport> {
    if table.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    let data = prepare(table)?;
    let n = data.target.len();
    let folds = time_series_folds(n, config.splits)?;

    let mut scores = Vec::with_capacity(folds.len());
    for fold in &folds {
        let (train_x, test_x, _) = standardize_columns(
            &select(&data.features, fold.train.clone()),
            &select(&data.features, fold.test.clone()),
        );
        let model = ols_fit(&data.target[fold.train.clone()], &named(train_x))?;
        let predicted = model.predict(&test_x)?;
        let metrics = calculate_metrics(&data.target[fold.test.clone()], &predicted)?;
        debug!(
            train = fold.train.len(),
            test = fold.test.len(),
            mse = metrics.mse,
            "evaluated fold"
        );
        scores.push(metrics);
    }

    let (all_x, _, _) = standardize_columns(&data.features, &[]);
    let final_model = ols_fit(&data.target, &named(all_x))?;

    let k = scores.len() as f64;
    Ok(EvaluationReport {
        mean_mse: scores.iter().map(|m| m.mse).sum::<f64>() / k,
        mean_r_squared: scores.iter().map(|m| m.r_squared).sum::<f64>() / k,
        mean_mae: scores.iter().map(|m| m.mae).sum::<f64>() / k,
        folds: scores,
        coefficients: final_model
            .regressor_names
            .into_iter()
            .zip(final_model.coefficients)
            .collect(),
        samples: n,
    })
}
