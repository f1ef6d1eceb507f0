//! Feature standardisation.
//!
//! Scaling parameters are learned on one slice (a training fold) and then
//! applied to others, so test folds never leak into the fitted centre.

/// Learned z-score parameters of one feature column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleResult {
    /// Center value used (mean)
    pub center: f64,
    /// Scale value used (population standard deviation, 1 when degenerate)
    pub scale: f64,
}

impl ScaleResult {
    /// Transform data using the learned parameters.
    pub fn transform(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .map(|&x| (x - self.center) / self.scale)
            .collect()
    }

    /// Inverse transform to recover the original scale.
    pub fn inverse(&self, data: &[f64]) -> Vec<f64> {
        data.iter().map(|&x| x * self.scale + self.center).collect()
    }
}

/// Learn zero-mean, unit-variance parameters for a column.
///
/// Uses the population standard deviation; a constant (or empty) column
/// gets scale 1 so it maps to zeros instead of dividing by zero.
pub fn standardize(series: &[f64]) -> ScaleResult {
    if series.is_empty() {
        return ScaleResult {
            center: 0.0,
            scale: 1.0,
        };
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let std = (series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();

    ScaleResult {
        center: mean,
        scale: if std < 1e-10 { 1.0 } else { std },
    }
}

/// Standardise each column on `train` and apply the same parameters to
/// `train` and `test`. Returns `(train, test, params)` column-major.
pub fn standardize_columns(
    train: &[Vec<f64>],
    test: &[Vec<f64>],
) -> (Vec<Vec<f64>>, Vec<Vec<f64>>, Vec<ScaleResult>) {
    let params: Vec<ScaleResult> = train.iter().map(|c| standardize(c)).collect();
    let train_scaled = train
        .iter()
        .zip(&params)
        .map(|(c, p)| p.transform(c))
        .collect();
    let test_scaled = test
        .iter()
        .zip(&params)
        .map(|(c, p)| p.transform(c))
        .collect();
    (train_scaled, test_scaled, params)
}
