//! The fit/predict contract shared by the forecasting models.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// A model that learns from one regular series and extrapolates it.
///
/// Implementations are deterministic: fitting the same series twice yields
/// identical forecasts.
pub trait Forecaster {
    /// Estimate the model from `series`.
    ///
    /// Returns `InsufficientData` when the series is shorter than
    /// [`Forecaster::min_observations`] and `ModelFit` when estimation fails.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Point forecasts for the next `horizon` steps.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Point forecasts with symmetric bounds at confidence `level`.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast>;

    /// Shortest series the model accepts.
    fn min_observations(&self) -> usize;

    /// In-sample one-step predictions, once fitted.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Actual minus fitted, once fitted.
    fn residuals(&self) -> Option<&[f64]>;

    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}
