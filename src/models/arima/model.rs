//! SARIMA (Seasonal Autoregressive Integrated Moving Average) model.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{
    difference, differencing_polynomial, integrate, poly_mul, seasonal_difference,
};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, two_sided_z, variance};
use tracing::{debug, warn};

/// Coefficient bound keeping AR terms stationary and MA terms invertible.
const COEFFICIENT_BOUND: f64 = 0.99;

/// SARIMA model specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub cap_p: usize,
    /// Seasonal differencing order (D)
    pub cap_d: usize,
    /// Seasonal MA order (Q)
    pub cap_q: usize,
    /// Seasonal period (s)
    pub s: usize,
}

impl SARIMASpec {
    /// The fixed order used by the dashboard forecasts:
    /// (1, 1, 1)(1, 1, 1)\[12\].
    pub const DASHBOARD: SARIMASpec = SARIMASpec {
        p: 1,
        d: 1,
        q: 1,
        cap_p: 1,
        cap_d: 1,
        cap_q: 1,
        s: 12,
    };

    /// Create a new SARIMA specification.
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            cap_p,
            cap_d,
            cap_q,
            s,
        }
    }

    /// A non-seasonal ARIMA(p, d, q) specification.
    pub fn non_seasonal(p: usize, d: usize, q: usize) -> Self {
        Self::new(p, d, q, 0, 0, 0, 0)
    }

    /// Whether the specification has any seasonal component.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Observations consumed by differencing.
    pub fn differencing_loss(&self) -> usize {
        self.d + if self.is_seasonal() { self.cap_d * self.s } else { 0 }
    }

    /// Whether a mean term is estimated (only without any differencing).
    pub fn includes_mean(&self) -> bool {
        self.differencing_loss() == 0
    }

    /// Number of estimated coefficients (excluding the innovation variance).
    pub fn num_params(&self) -> usize {
        let seasonal = if self.is_seasonal() {
            self.cap_p + self.cap_q
        } else {
            0
        };
        self.p + self.q + seasonal + usize::from(self.includes_mean())
    }

    /// Minimum series length: one full seasonal cycle on top of what
    /// differencing consumes.
    ///
    /// Series shorter than two seasonal cycles but longer than one fall
    /// below this bound too, so they surface as `InsufficientData` before
    /// any fit is attempted rather than as `ModelFit`.
    pub fn min_observations(&self) -> usize {
        let cycle = if self.is_seasonal() {
            self.s
        } else {
            self.p.max(self.q) + 2
        };
        cycle + self.differencing_loss()
    }
}

impl Default for SARIMASpec {
    fn default() -> Self {
        Self::DASHBOARD
    }
}

/// Expanded lag polynomials of a parameter vector.
#[derive(Debug, Clone, PartialEq)]
struct LagPolynomials {
    /// `ar[k]` multiplies `x_{t-k}` (index 0 unused).
    ar: Vec<f64>,
    /// `ma[k]` multiplies `e_{t-k}` (index 0 unused).
    ma: Vec<f64>,
}

impl LagPolynomials {
    fn from_coefficients(
        spec: &SARIMASpec,
        ar: &[f64],
        ma: &[f64],
        sar: &[f64],
        sma: &[f64],
    ) -> Self {
        let s = spec.s;

        // (1 - phi_1 B - ...)(1 - Phi_1 B^s - ...)
        let mut ar_poly = vec![1.0];
        ar_poly.extend(ar.iter().map(|c| -c));
        let mut sar_poly = vec![0.0; sar.len() * s + 1];
        sar_poly[0] = 1.0;
        for (j, c) in sar.iter().enumerate() {
            sar_poly[(j + 1) * s] = -c;
        }
        let ar_full = poly_mul(&ar_poly, &sar_poly);

        // (1 + theta_1 B + ...)(1 + Theta_1 B^s + ...)
        let mut ma_poly = vec![1.0];
        ma_poly.extend_from_slice(ma);
        let mut sma_poly = vec![0.0; sma.len() * s + 1];
        sma_poly[0] = 1.0;
        for (j, c) in sma.iter().enumerate() {
            sma_poly[(j + 1) * s] = *c;
        }
        let ma_full = poly_mul(&ma_poly, &sma_poly);

        Self {
            ar: ar_full.iter().map(|c| -c).collect(),
            ma: ma_full,
        }
    }

    /// One-step prediction of `x_t` from past values and innovations.
    fn predict_at(&self, x: &[f64], e: &[f64], t: usize) -> f64 {
        let mut pred = 0.0;
        for (k, &c) in self.ar.iter().enumerate().skip(1) {
            if k <= t && c != 0.0 {
                pred += c * x[t - k];
            }
        }
        for (k, &c) in self.ma.iter().enumerate().skip(1) {
            if k <= t && c != 0.0 {
                pred += c * e[t - k];
            }
        }
        pred
    }

    /// Innovations of a centred series, with zero pre-sample values.
    fn innovations(&self, x: &[f64]) -> Vec<f64> {
        let mut e = vec![0.0; x.len()];
        for t in 0..x.len() {
            e[t] = x[t] - self.predict_at(x, &e, t);
        }
        e
    }
}

/// Seasonal ARIMA forecasting model.
///
/// SARIMA(p, d, q)(P, D, Q)\[s\] combines:
/// - AR(p) and seasonal AR(P) at lag multiples of s
/// - d regular and D seasonal differences
/// - MA(q) and seasonal MA(Q) at lag multiples of s
///
/// Coefficients are estimated by minimising the conditional sum of
/// squares with the Nelder-Mead simplex, which makes the fit fully
/// deterministic for a given input.
#[derive(Debug, Clone)]
pub struct SARIMA {
    spec: SARIMASpec,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    seasonal_ar_coefficients: Vec<f64>,
    seasonal_ma_coefficients: Vec<f64>,
    /// Mean of the (undifferenced) series, when estimated.
    mean: f64,
    polynomials: Option<LagPolynomials>,
    original: Option<Vec<f64>>,
    /// Differenced series, centred on `mean`.
    centred: Option<Vec<f64>>,
    /// In-sample one-step predictions on the original scale.
    fitted: Option<Vec<f64>>,
    /// Innovations on the differenced scale.
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
    converged: bool,
}

impl SARIMA {
    /// Create a new SARIMA model.
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self::from_spec(SARIMASpec::new(p, d, q, cap_p, cap_d, cap_q, s))
    }

    /// Create a model from an existing specification.
    pub fn from_spec(spec: SARIMASpec) -> Self {
        Self {
            spec,
            ar_coefficients: vec![],
            ma_coefficients: vec![],
            seasonal_ar_coefficients: vec![],
            seasonal_ma_coefficients: vec![],
            mean: 0.0,
            polynomials: None,
            original: None,
            centred: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            aic: None,
            bic: None,
            converged: false,
        }
    }

    /// The model used by the dashboard forecasts.
    pub fn dashboard() -> Self {
        Self::from_spec(SARIMASpec::DASHBOARD)
    }

    /// Get the model specification.
    pub fn spec(&self) -> SARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar_coefficients
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma_coefficients
    }

    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    /// Get AIC.
    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    /// Get BIC.
    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// Whether the optimiser met its tolerance before the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    fn seasonal_orders(&self) -> (usize, usize) {
        if self.spec.is_seasonal() {
            (self.spec.cap_p, self.spec.cap_q)
        } else {
            (0, 0)
        }
    }

    /// Split a flat parameter vector into (ar, ma, sar, sma, mean).
    #[allow(clippy::type_complexity)]
    fn unpack<'a>(
        &self,
        params: &'a [f64],
    ) -> (&'a [f64], &'a [f64], &'a [f64], &'a [f64], f64) {
        let (p, q) = (self.spec.p, self.spec.q);
        let (cap_p, cap_q) = self.seasonal_orders();
        let (ar, rest) = params.split_at(p);
        let (ma, rest) = rest.split_at(q);
        let (sar, rest) = rest.split_at(cap_p);
        let (sma, rest) = rest.split_at(cap_q);
        let mu = rest.first().copied().unwrap_or(0.0);
        (ar, ma, sar, sma, mu)
    }

    /// Conditional sum of squares for a flat parameter vector.
    fn conditional_sum_of_squares(&self, w: &[f64], params: &[f64]) -> f64 {
        let (ar, ma, sar, sma, mu) = self.unpack(params);
        let polys = LagPolynomials::from_coefficients(&self.spec, ar, ma, sar, sma);
        let centred: Vec<f64> = w.iter().map(|v| v - mu).collect();
        let css: f64 = polys.innovations(&centred).iter().map(|e| e * e).sum();
        if css.is_finite() {
            css
        } else {
            f64::MAX
        }
    }

    fn estimate_parameters(&mut self, w: &[f64]) -> Result<()> {
        let n_params = self.spec.num_params();
        let mut initial = vec![0.0; n_params];
        let mut bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); n_params];
        if self.spec.includes_mean() {
            initial[n_params - 1] = mean(w);
            bounds[n_params - 1] = (f64::NEG_INFINITY, f64::INFINITY);
        }

        let (params, converged) = if n_params == 0 {
            (vec![], true)
        } else {
            let config = NelderMeadConfig {
                max_iter: 2000,
                tolerance: 1e-10,
                initial_step: 0.1,
                ..Default::default()
            };
            let result = nelder_mead(
                |params| self.conditional_sum_of_squares(w, params),
                &initial,
                Some(&bounds),
                config,
            );
            if !result.optimal_value.is_finite() || result.optimal_value == f64::MAX {
                return Err(ForecastError::ModelFit(
                    "conditional sum of squares is not finite".to_string(),
                ));
            }
            debug!(
                iterations = result.iterations,
                css = result.optimal_value,
                converged = result.converged,
                "SARIMA parameters estimated"
            );
            (result.optimal_point, result.converged)
        };

        let (ar, ma, sar, sma, mu) = self.unpack(&params);
        self.ar_coefficients = ar.to_vec();
        self.ma_coefficients = ma.to_vec();
        self.seasonal_ar_coefficients = sar.to_vec();
        self.seasonal_ma_coefficients = sma.to_vec();
        self.mean = mu;
        self.converged = converged;
        if !converged {
            warn!(spec = ?self.spec, "SARIMA optimiser hit its iteration cap");
        }
        Ok(())
    }

    /// MA(infinity) weights of the full model, differencing included.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let polys = match &self.polynomials {
            Some(p) => p,
            None => return vec![1.0; horizon.min(1)],
        };

        let (cap_d, s) = if self.spec.is_seasonal() {
            (self.spec.cap_d, self.spec.s)
        } else {
            (0, 0)
        };
        // phi*(B) = phi(B) Phi(B^s) (1 - B)^d (1 - B^s)^D
        let ar_operator: Vec<f64> = std::iter::once(1.0)
            .chain(polys.ar.iter().skip(1).map(|c| -c))
            .collect();
        let full_ar = poly_mul(&ar_operator, &differencing_polynomial(self.spec.d, cap_d, s));

        let mut psi = Vec::with_capacity(horizon);
        for j in 0..horizon {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = polys.ma.get(j).copied().unwrap_or(0.0);
            for k in 1..=j.min(full_ar.len() - 1) {
                value -= full_ar[k] * psi[j - k];
            }
            psi.push(value);
        }
        psi
    }
}

impl Default for SARIMA {
    fn default() -> Self {
        Self::dashboard()
    }
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let min_len = self.min_observations();
        if values.len() < min_len {
            return Err(ForecastError::InsufficientData {
                needed: min_len,
                got: values.len(),
            });
        }

        let (cap_d, s) = if self.spec.is_seasonal() {
            (self.spec.cap_d, self.spec.s)
        } else {
            (0, 0)
        };
        let w = difference(&seasonal_difference(values, cap_d, s), self.spec.d);
        if w.len() < 2 {
            return Err(ForecastError::ModelFit(format!(
                "only {} observations left after differencing",
                w.len()
            )));
        }
        let spread = variance(&w);
        let scale = w.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);
        if !spread.is_finite() || spread <= 1e-12 * scale * scale {
            return Err(ForecastError::ModelFit(
                "series has no variation after differencing".to_string(),
            ));
        }

        self.estimate_parameters(&w)?;

        let polys = LagPolynomials::from_coefficients(
            &self.spec,
            &self.ar_coefficients,
            &self.ma_coefficients,
            &self.seasonal_ar_coefficients,
            &self.seasonal_ma_coefficients,
        );
        let centred: Vec<f64> = w.iter().map(|v| v - self.mean).collect();
        let residuals = polys.innovations(&centred);

        let n_eff = residuals.len() as f64;
        let sigma2 = residuals.iter().map(|e| e * e).sum::<f64>() / n_eff;
        if !sigma2.is_finite() {
            return Err(ForecastError::ModelFit(
                "residual variance is not finite".to_string(),
            ));
        }

        let k = self.spec.num_params() as f64 + 1.0;
        let log_sigma2 = sigma2.max(f64::MIN_POSITIVE).ln();
        let ll = -0.5 * n_eff * (1.0 + log_sigma2 + (2.0 * std::f64::consts::PI).ln());
        self.aic = Some(-2.0 * ll + 2.0 * k);
        self.bic = Some(-2.0 * ll + k * n_eff.ln());

        let offset = values.len() - w.len();
        let fitted = values[offset..]
            .iter()
            .zip(&residuals)
            .map(|(y, e)| y - e)
            .collect();

        self.residual_variance = Some(sigma2);
        self.original = Some(values.to_vec());
        self.centred = Some(centred);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        self.polynomials = Some(polys);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let original = self.original.as_ref().ok_or(ForecastError::FitRequired)?;
        let centred = self.centred.as_ref().ok_or(ForecastError::FitRequired)?;
        let residuals = self.residuals.as_ref().ok_or(ForecastError::FitRequired)?;
        let polys = self.polynomials.as_ref().ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let mut x = centred.clone();
        let mut e = residuals.clone();
        for _ in 0..horizon {
            let t = x.len();
            // Future innovations are zero.
            e.push(0.0);
            x.push(0.0);
            x[t] = polys.predict_at(&x, &e, t);
        }

        let forecast_diff: Vec<f64> = x[centred.len()..].iter().map(|v| v + self.mean).collect();
        let (cap_d, s) = if self.spec.is_seasonal() {
            (self.spec.cap_d, self.spec.s)
        } else {
            (0, 0)
        };
        let predictions = integrate(&forecast_diff, original, self.spec.d, cap_d, s);

        if predictions.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(
                "forecast diverged to non-finite values".to_string(),
            ));
        }

        Ok(Forecast::points(predictions))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let z = two_sided_z(level)?;
        let forecast = self.predict(horizon)?;
        let sigma2 = self.residual_variance.ok_or(ForecastError::FitRequired)?;

        if horizon == 0 {
            return Ok(forecast);
        }

        let psi = self.psi_weights(horizon);
        let preds = forecast.point();

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut cumulative = 0.0;
        for h in 0..horizon {
            cumulative += psi[h] * psi[h];
            let se = (sigma2 * cumulative).sqrt();
            let half_width = if se.is_finite() { z * se } else { f64::INFINITY };
            lower.push(preds[h] - half_width);
            upper.push(preds[h] + half_width);
        }

        Forecast::with_bounds(preds.to_vec(), lower, upper)
    }

    fn min_observations(&self) -> usize {
        self.spec.min_observations()
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        if self.spec.is_seasonal() {
            "SARIMA"
        } else {
            "ARIMA"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seasonal_series(n: usize) -> TimeSeries {
        let values: Vec<f64> = (0..n)
            .map(|i| {
                let trend = 50.0 + 0.4 * i as f64;
                let season = 6.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin();
                let noise = ((i * 17 + 7) % 13) as f64 * 0.15 - 0.9;
                trend + season + noise
            })
            .collect();
        TimeSeries::annual(1950, values).unwrap()
    }

    #[test]
    fn spec_dashboard_orders_are_fixed() {
        let spec = SARIMASpec::default();
        assert_eq!((spec.p, spec.d, spec.q), (1, 1, 1));
        assert_eq!((spec.cap_p, spec.cap_d, spec.cap_q, spec.s), (1, 1, 1, 12));
        assert!(spec.is_seasonal());
        assert_eq!(spec.differencing_loss(), 13);
        assert_eq!(spec.min_observations(), 25);
        assert_eq!(spec.num_params(), 4);
        assert!(!spec.includes_mean());
    }

    #[test]
    fn non_seasonal_spec_estimates_mean_without_differencing() {
        let spec = SARIMASpec::non_seasonal(1, 0, 1);
        assert!(!spec.is_seasonal());
        assert!(spec.includes_mean());
        assert_eq!(spec.num_params(), 3);
        assert_eq!(spec.min_observations(), 3);
    }

    #[test]
    fn lag_polynomials_expand_multiplicatively() {
        let spec = SARIMASpec::new(1, 0, 1, 1, 0, 1, 4);
        let polys = LagPolynomials::from_coefficients(&spec, &[0.5], &[0.3], &[0.2], &[0.4]);

        // (1 - 0.5B)(1 - 0.2B^4) = 1 - 0.5B - 0.2B^4 + 0.1B^5
        assert_relative_eq!(polys.ar[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(polys.ar[4], 0.2, epsilon = 1e-12);
        assert_relative_eq!(polys.ar[5], -0.1, epsilon = 1e-12);

        // (1 + 0.3B)(1 + 0.4B^4) = 1 + 0.3B + 0.4B^4 + 0.12B^5
        assert_relative_eq!(polys.ma[1], 0.3, epsilon = 1e-12);
        assert_relative_eq!(polys.ma[4], 0.4, epsilon = 1e-12);
        assert_relative_eq!(polys.ma[5], 0.12, epsilon = 1e-12);
    }

    #[test]
    fn sarima_basic_fit() {
        let ts = seasonal_series(72);
        let mut model = SARIMA::dashboard();
        model.fit(&ts).unwrap();

        assert_eq!(model.ar_coefficients().len(), 1);
        assert_eq!(model.ma_coefficients().len(), 1);
        assert_eq!(model.seasonal_ar_coefficients().len(), 1);
        assert_eq!(model.seasonal_ma_coefficients().len(), 1);
        for c in model
            .ar_coefficients()
            .iter()
            .chain(model.seasonal_ma_coefficients())
        {
            assert!(c.abs() <= COEFFICIENT_BOUND);
        }
        assert!(model.aic().unwrap().is_finite());
        assert!(model.bic().unwrap().is_finite());

        let forecast = model.predict(6).unwrap();
        assert_eq!(forecast.horizon(), 6);
    }

    const PATTERN: [f64; 12] = [3.0, -1.0, 4.0, 1.0, -5.0, 9.0, 2.0, -6.0, 5.0, 3.0, -5.0, 8.0];

    fn trend_plus_pattern(i: usize) -> f64 {
        10.0 + 0.5 * i as f64 + PATTERN[i % 12]
    }

    #[test]
    fn sarima_follows_seasonal_pattern() {
        // Trend and pattern vanish under (1 - B)(1 - B^12); only the jitter is left.
        let values: Vec<f64> = (0..60)
            .map(|i| trend_plus_pattern(i) + ((i * 7) % 5) as f64 * 0.01)
            .collect();
        let ts = TimeSeries::annual(1900, values).unwrap();
        let mut model = SARIMA::dashboard();
        model.fit(&ts).unwrap();

        let preds = model.predict(12).unwrap();
        for (h, pred) in preds.point().iter().enumerate() {
            let expected = trend_plus_pattern(60 + h);
            assert!(
                (pred - expected).abs() < 1.0,
                "h={} pred={} expected={}",
                h,
                pred,
                expected
            );
        }
    }

    #[test]
    fn sarima_intervals_widen_and_contain_point() {
        let ts = seasonal_series(60);
        let mut model = SARIMA::dashboard();
        model.fit(&ts).unwrap();

        let forecast = model.predict_with_intervals(8, 0.90).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        let point = forecast.point();

        for h in 0..8 {
            assert!(lower[h] <= point[h] && point[h] <= upper[h]);
        }
        let first = upper[0] - lower[0];
        let last = upper[7] - lower[7];
        assert!(last >= first);
    }

    #[test]
    fn wider_confidence_gives_wider_band() {
        let ts = seasonal_series(60);
        let mut model = SARIMA::dashboard();
        model.fit(&ts).unwrap();

        let narrow = model.predict_with_intervals(3, 0.80).unwrap();
        let wide = model.predict_with_intervals(3, 0.99).unwrap();
        let width = |f: &Forecast| f.upper().unwrap()[2] - f.lower().unwrap()[2];
        assert!(width(&wide) > width(&narrow));
    }

    #[test]
    fn sarima_is_deterministic() {
        let ts = seasonal_series(50);
        let mut a = SARIMA::dashboard();
        let mut b = SARIMA::dashboard();
        a.fit(&ts).unwrap();
        b.fit(&ts).unwrap();
        assert_eq!(
            a.predict_with_intervals(5, 0.9).unwrap(),
            b.predict_with_intervals(5, 0.9).unwrap()
        );
    }

    #[test]
    fn sarima_insufficient_data() {
        let mut model = SARIMA::dashboard();
        assert_eq!(model.min_observations(), 25);
        // One to two seasonal cycles is still too short to fit.
        for n in 13..=24 {
            assert_eq!(
                model.fit(&seasonal_series(n)),
                Err(ForecastError::InsufficientData { needed: 25, got: n })
            );
        }
        assert!(!model.is_fitted());
    }

    #[test]
    fn sarima_constant_series_fails_to_fit() {
        let ts = TimeSeries::annual(1950, vec![4.2; 40]).unwrap();
        let mut model = SARIMA::dashboard();
        assert!(matches!(model.fit(&ts), Err(ForecastError::ModelFit(_))));
    }

    #[test]
    fn sarima_rejects_missing_values() {
        let mut values: Vec<f64> = (0..40).map(|i| i as f64).collect();
        values[10] = f64::NAN;
        let ts = TimeSeries::annual(1950, values).unwrap();
        let mut model = SARIMA::dashboard();
        assert_eq!(model.fit(&ts), Err(ForecastError::MissingValues));
    }

    #[test]
    fn sarima_requires_fit() {
        let model = SARIMA::dashboard();
        assert!(matches!(model.predict(5), Err(ForecastError::FitRequired)));
        assert!(!model.is_fitted());
    }

    #[test]
    fn sarima_rejects_invalid_level() {
        let ts = seasonal_series(40);
        let mut model = SARIMA::dashboard();
        model.fit(&ts).unwrap();
        assert!(matches!(
            model.predict_with_intervals(3, 1.5),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn sarima_zero_horizon() {
        let ts = seasonal_series(40);
        let mut model = SARIMA::dashboard();
        model.fit(&ts).unwrap();
        assert_eq!(model.predict(0).unwrap().horizon(), 0);
    }

    #[test]
    fn non_seasonal_arima_with_mean() {
        let mut values = vec![10.0];
        for i in 1..80 {
            values.push(5.0 + 0.5 * (values[i - 1] - 5.0) + ((i * 11) % 7) as f64 * 0.2 - 0.6);
        }
        let ts = TimeSeries::annual(1900, values).unwrap();
        let mut model = SARIMA::from_spec(SARIMASpec::non_seasonal(1, 0, 0));
        model.fit(&ts).unwrap();

        assert_eq!(model.name(), "ARIMA");
        assert!(model.ar_coefficients()[0].abs() < 1.0);
        // Long horizon reverts towards the mean.
        let preds = model.predict(50).unwrap();
        assert!((preds.point()[49] - 5.0).abs() < 1.0);
    }

    #[test]
    fn fitted_and_residuals_align_with_differenced_length() {
        let ts = seasonal_series(48);
        let mut model = SARIMA::dashboard();
        model.fit(&ts).unwrap();

        let loss = model.spec().differencing_loss();
        assert_eq!(model.residuals().unwrap().len(), 48 - loss);
        assert_eq!(model.fitted_values().unwrap().len(), 48 - loss);
        assert_eq!(model.name(), "SARIMA");
    }

    #[test]
    fn psi_weights_of_random_walk_are_one() {
        let mut model = SARIMA::from_spec(SARIMASpec::non_seasonal(0, 1, 0));
        let values: Vec<f64> = (0..30).map(|i| (i as f64 * 0.7).sin() * 3.0 + i as f64).collect();
        model.fit(&TimeSeries::annual(1990, values).unwrap()).unwrap();
        let psi = model.psi_weights(5);
        for w in psi {
            assert_relative_eq!(w, 1.0, epsilon = 1e-12);
        }
    }
}
