//! Differencing utilities for seasonal ARIMA models.

/// Difference `series` at `lag`, `times` times over.
///
/// Each pass drops the first `lag` values; an empty vector comes back once the
/// series runs out.
fn lag_difference(series: &[f64], lag: usize, times: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..times {
        if out.len() <= lag {
            return Vec::new();
        }
        out = out[lag..].iter().zip(&out).map(|(now, then)| now - then).collect();
    }
    out
}

/// `(1 - B)^d` applied to `series`.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }
    lag_difference(series, 1, d)
}

/// `(1 - B^period)^d` applied to `series`. A zero period leaves it unchanged.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }
    lag_difference(series, period, d)
}

/// Multiply two lag polynomials given by their coefficient vectors.
pub(crate) fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &ai) in a.iter().enumerate() {
        if ai == 0.0 {
            continue;
        }
        for (j, &bj) in b.iter().enumerate() {
            out[i + j] += ai * bj;
        }
    }
    out
}

/// Coefficients of the combined operator `(1 - B)^d (1 - B^s)^D`.
///
/// Index `k` holds the coefficient of `B^k`; index 0 is always 1.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = poly_mul(&poly, &seasonal);
        }
    }
    poly
}

/// Integrate (reverse differencing) forecasts made on the differenced scale.
///
/// Uses `y_t = w_t - sum_{k>=1} delta_k * y_{t-k}` where `delta` is the
/// combined differencing polynomial, continuing from the tail of `original`.
///
/// # Arguments
/// * `differenced` - Forecasts of the differenced series
/// * `original` - The original series (needed for initial values)
/// * `d` - Non-seasonal differencing order used
/// * `seasonal_d` - Seasonal differencing order used
/// * `period` - Seasonal period
///
/// # Returns
/// The forecasts on the original scale.
pub fn integrate(
    differenced: &[f64],
    original: &[f64],
    d: usize,
    seasonal_d: usize,
    period: usize,
) -> Vec<f64> {
    let delta = differencing_polynomial(d, seasonal_d, period);
    if delta.len() == 1 || differenced.is_empty() {
        return differenced.to_vec();
    }

    let mut extended = original.to_vec();
    for &w in differenced {
        let t = extended.len();
        let mut value = w;
        for (k, &coef) in delta.iter().enumerate().skip(1) {
            if t >= k {
                value -= coef * extended[t - k];
            }
        }
        extended.push(value);
    }

    extended[original.len()..].to_vec()
}
