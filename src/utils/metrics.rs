//! Goodness-of-fit scores for held-out predictions.

use crate::error::{ForecastError, Result};
use serde::Serialize;

/// Scores of predictions against observed targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
}

/// Score `predicted` against `actual`.
///
/// R² of a constant target is 1 for an exact match and 0 otherwise.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    check_pair(actual, predicted)?;

    let n = actual.len() as f64;
    let (abs_sum, sq_sum) = actual
        .iter()
        .zip(predicted)
        .fold((0.0, 0.0), |(abs_sum, sq_sum), (a, p)| {
            let err = a - p;
            (abs_sum + err.abs(), sq_sum + err * err)
        });
    let mse = sq_sum / n;

    let centre = actual.iter().sum::<f64>() / n;
    let spread: f64 = actual.iter().map(|a| (a - centre) * (a - centre)).sum();
    let r_squared = match (spread == 0.0, sq_sum == 0.0) {
        (true, true) => 1.0,
        (true, false) => 0.0,
        _ => 1.0 - sq_sum / spread,
    };

    Ok(AccuracyMetrics {
        mae: abs_sum / n,
        mse,
        rmse: mse.sqrt(),
        r_squared,
    })
}

/// Mean absolute error; NaN for empty or mismatched input.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    calculate_metrics(actual, predicted).map_or(f64::NAN, |m| m.mae)
}

/// Mean squared error; NaN for empty or mismatched input.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    calculate_metrics(actual, predicted).map_or(f64::NAN, |m| m.mse)
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    Ok(())
}
