//! Ordinary Least Squares (OLS) regression.
//!
//! Used by the GDP/emissions correlation (one regressor) and the anomaly
//! model evaluation (several named features). Columns are centred before
//! solving the normal equations, which keeps large-magnitude regressors
//! such as GDP in current US dollars well conditioned.

use crate::error::{ForecastError, Result};

/// Fitted linear model `y = intercept + sum(coefficients[i] * x_i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OLSResult {
    /// Regression coefficients, one per regressor in input order.
    pub coefficients: Vec<f64>,
    /// Intercept term.
    pub intercept: f64,
    /// Names of regressors in input order.
    pub regressor_names: Vec<String>,
}

impl OLSResult {
    /// Predict a single observation given its regressor values in order.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: row.len(),
            });
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    /// Predict every observation of column-major regressor data.
    pub fn predict(&self, columns: &[Vec<f64>]) -> Result<Vec<f64>> {
        let n = validate_columns(columns, self.coefficients.len())?;
        let mut predictions = vec![self.intercept; n];
        for (coef, column) in self.coefficients.iter().zip(columns) {
            for (pred, x) in predictions.iter_mut().zip(column) {
                *pred += coef * x;
            }
        }
        Ok(predictions)
    }

    /// Coefficient of a named regressor.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.regressor_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.coefficients[i])
    }

    /// Get the number of regressors.
    pub fn num_regressors(&self) -> usize {
        self.coefficients.len()
    }
}

/// Check that all columns share one length and return it.
fn validate_columns(columns: &[Vec<f64>], expected_count: usize) -> Result<usize> {
    if columns.len() != expected_count {
        return Err(ForecastError::DimensionMismatch {
            expected: expected_count,
            got: columns.len(),
        });
    }
    let n = columns.first().map_or(0, Vec::len);
    for column in columns {
        if column.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: column.len(),
            });
        }
    }
    Ok(n)
}

/// Fit OLS regression: `y = intercept + X @ coefficients`.
///
/// `regressors` holds `(name, values)` pairs; the output keeps their order.
/// The normal equations of the centred problem are solved by Cholesky
/// decomposition.
///
/// # Errors
/// * `InsufficientData` when there are fewer observations than parameters
/// * `DimensionMismatch` when a regressor's length differs from `y`
/// * `ModelFit` when the regressors are collinear or constant
pub fn ols_fit(y: &[f64], regressors: &[(String, Vec<f64>)]) -> Result<OLSResult> {
    let n = y.len();
    let k = regressors.len();

    if n < k + 1 || n == 0 {
        return Err(ForecastError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }

    for (_, values) in regressors {
        if values.len() != n {
            return Err(ForecastError::DimensionMismatch {
                expected: n,
                got: values.len(),
            });
        }
    }

    let y_mean = y.iter().sum::<f64>() / n as f64;
    let regressor_names: Vec<String> = regressors.iter().map(|(name, _)| name.clone()).collect();

    if k == 0 {
        return Ok(OLSResult {
            coefficients: vec![],
            intercept: y_mean,
            regressor_names,
        });
    }

    let x_means: Vec<f64> = regressors
        .iter()
        .map(|(_, values)| values.iter().sum::<f64>() / n as f64)
        .collect();

    // Centred cross products: X'X and X'y without an intercept column.
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for obs in 0..n {
        let dy = y[obs] - y_mean;
        for i in 0..k {
            let xi = regressors[i].1[obs] - x_means[i];
            xty[i] += xi * dy;
            for j in 0..=i {
                let xj = regressors[j].1[obs] - x_means[j];
                xtx[i][j] += xi * xj;
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }

    let coefficients = solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ForecastError::ModelFit("regressors are constant or collinear".to_string())
    })?;

    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_means)
            .map(|(c, m)| c * m)
            .sum::<f64>();

    if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
        return Err(ForecastError::ModelFit(
            "least squares solution is not finite".to_string(),
        ));
    }

    Ok(OLSResult {
        coefficients,
        intercept,
        regressor_names,
    })
}

/// Solve symmetric positive definite system using Cholesky decomposition.
///
/// Solves A @ x = b. Returns `None` when A is not positive definite
/// relative to its own scale.
fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let max_diag = (0..n).map(|i| a[i][i].abs()).fold(0.0_f64, f64::max);
    let threshold = max_diag * 1e-12;

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= threshold {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // L @ y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // L' @ x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn named(name: &str, values: Vec<f64>) -> (String, Vec<f64>) {
        (name.to_string(), values)
    }

    #[test]
    fn ols_fit_simple_linear() {
        // y = 2 + 3*x
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let result = ols_fit(&y, &[named("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])]).unwrap();

        assert_relative_eq!(result.intercept, 2.0, epsilon = 1e-9);
        assert_eq!(result.num_regressors(), 1);
        assert_relative_eq!(result.coefficients[0], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn ols_fit_multiple_regressors_keeps_order() {
        // y = 1 + 2*x1 + 3*x2
        let x1 = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let x2 = vec![0.5, 2.5, 1.0, 3.0, 1.5, 3.5, 2.0, 4.0];
        let y: Vec<f64> = x1
            .iter()
            .zip(x2.iter())
            .map(|(a, b)| 1.0 + 2.0 * a + 3.0 * b)
            .collect();

        let result = ols_fit(&y, &[named("zeta", x1), named("alpha", x2)]).unwrap();

        assert_eq!(result.regressor_names, vec!["zeta", "alpha"]);
        assert_relative_eq!(result.intercept, 1.0, epsilon = 1e-8);
        assert_relative_eq!(result.coefficient("zeta").unwrap(), 2.0, epsilon = 1e-8);
        assert_relative_eq!(result.coefficient("alpha").unwrap(), 3.0, epsilon = 1e-8);
        assert!(result.coefficient("missing").is_none());
    }

    #[test]
    fn ols_handles_large_magnitude_regressor() {
        // GDP-like magnitudes: y = 0.5 + 2e-9 * gdp
        let gdp: Vec<f64> = (1..=20).map(|i| 1.0e12 + i as f64 * 3.7e10).collect();
        let y: Vec<f64> = gdp.iter().map(|g| 0.5 + 2e-9 * g).collect();

        let result = ols_fit(&y, &[named("gdp", gdp)]).unwrap();
        assert_relative_eq!(result.coefficients[0], 2e-9, max_relative = 1e-6);
        assert_relative_eq!(result.intercept, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn ols_fit_no_regressors() {
        let y = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let result = ols_fit(&y, &[]).unwrap();

        assert_relative_eq!(result.intercept, 6.0, epsilon = 1e-10);
        assert!(result.coefficients.is_empty());
    }

    #[test]
    fn ols_predict() {
        let y = vec![5.0, 8.0, 11.0, 14.0, 17.0];
        let result = ols_fit(&y, &[named("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])]).unwrap();

        let predictions = result.predict(&[vec![6.0, 7.0, 8.0]]).unwrap();
        assert_eq!(predictions.len(), 3);
        assert_relative_eq!(predictions[0], 20.0, epsilon = 1e-8);
        assert_relative_eq!(predictions[2], 26.0, epsilon = 1e-8);
        assert_relative_eq!(result.predict_row(&[7.0]).unwrap(), 23.0, epsilon = 1e-8);
    }

    #[test]
    fn ols_predict_wrong_shape() {
        let y = vec![5.0, 8.0, 11.0];
        let result = ols_fit(&y, &[named("x", vec![1.0, 2.0, 3.0])]).unwrap();

        assert!(result.predict(&[vec![1.0], vec![2.0]]).is_err());
        assert!(result.predict_row(&[]).is_err());
    }

    #[test]
    fn ols_fit_dimension_mismatch() {
        let y = vec![1.0, 2.0, 3.0];
        let err = ols_fit(&y, &[named("x", vec![1.0, 2.0])]).unwrap_err();
        assert_eq!(err, ForecastError::DimensionMismatch { expected: 3, got: 2 });
    }

    #[test]
    fn ols_fit_constant_regressor_fails() {
        let y = vec![1.0, 2.0, 3.0, 4.0];
        let err = ols_fit(&y, &[named("x", vec![5.0; 4])]).unwrap_err();
        assert!(matches!(err, ForecastError::ModelFit(_)));
    }

    #[test]
    fn ols_fit_too_few_rows() {
        let err = ols_fit(&[1.0], &[named("x", vec![1.0])]).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 2, got: 1 });
    }

    #[test]
    fn ols_with_noise() {
        let n = 100;
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, &xi)| 2.5 + 1.7 * xi + (i as f64 * 0.13).sin() * 0.1)
            .collect();

        let result = ols_fit(&y, &[named("x", x)]).unwrap();
        assert_relative_eq!(result.intercept, 2.5, epsilon = 0.1);
        assert_relative_eq!(result.coefficients[0], 1.7, epsilon = 0.1);
    }
}
