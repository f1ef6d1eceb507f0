//! Small statistics helpers for model estimation and intervals.

use crate::error::{ForecastError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal critical value for a confidence level.
///
/// `confidence = 0.90` means `alpha = 0.10`, so this returns the
/// `1 - alpha / 2` quantile (about 1.645).
///
/// # Example
/// ```
/// use climate_forecast::utils::stats::two_sided_z;
///
/// let z = two_sided_z(0.95).unwrap();
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn two_sided_z(confidence: f64) -> Result<f64> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "confidence must be in (0, 1), got {}",
            confidence
        )));
    }
    let alpha = 1.0 - confidence;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - alpha / 2.0))
}

/// Arithmetic mean; NaN when empty.
pub fn mean(values: &[f64]) -> f64 {
    match values.len() {
        0 => f64::NAN,
        n => values.iter().sum::<f64>() / n as f64,
    }
}

/// Unbiased (n - 1) variance; NaN below two values.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let centre = mean(values);
    let ss = values.iter().fold(0.0, |acc, x| acc + (x - centre) * (x - centre));
    ss / (values.len() - 1) as f64
}
