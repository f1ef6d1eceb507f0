//! Seasonal ARIMA forecasts over a historical series.

use crate::core::{Period, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::{SARIMASpec, SARIMA};
use crate::models::Forecaster;
use serde::Serialize;
use tracing::debug;

/// A point estimate at one forecast period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub period: Period,
    pub value: f64,
}

/// Interval bounds at one forecast period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalPoint {
    pub period: Period,
    pub lower: f64,
    pub upper: f64,
}

/// A request as collected from the UI; missing fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastRequest {
    pub entity: Option<String>,
    pub target_year: Option<i32>,
}

impl ForecastRequest {
    pub fn new(entity: impl Into<String>, target_year: i32) -> Self {
        Self {
            entity: Some(entity.into()),
            target_year: Some(target_year),
        }
    }

    /// Entity, or `default` when unset or blank.
    pub fn entity_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.entity.as_deref() {
            Some(entity) if !entity.trim().is_empty() => entity.trim(),
            _ => default,
        }
    }

    pub fn target_year_or(&self, default: i32) -> i32 {
        self.target_year.unwrap_or(default)
    }
}

/// Historical series plus forecast and interval over the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub historical: TimeSeries,
    /// Forecasts for `last historical ..= effective_target`.
    pub forecast: Vec<ForecastPoint>,
    pub interval: Vec<IntervalPoint>,
    pub requested_target: i32,
    pub effective_target: Period,
    pub confidence: f64,
}

impl ForecastResult {
    /// Whether the requested target was moved past the history.
    pub fn was_clamped(&self) -> bool {
        Period::end_of_year(self.effective_target.granularity(), self.requested_target)
            != self.effective_target
    }

    pub fn forecast_periods(&self) -> Vec<Period> {
        self.forecast.iter().map(|p| p.period).collect()
    }
}

/// The period a target year resolves to, given the last observed period.
///
/// A target at or before `last` is moved to `last.next()`.
pub fn effective_target(last: Period, target_year: i32) -> Period {
    let target = Period::end_of_year(last.granularity(), target_year);
    if target <= last {
        last.next()
    } else {
        target
    }
}

/// Fits the fixed-order seasonal model per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastEngine {
    spec: SARIMASpec,
    max_horizon_years: i32,
}

/// Furthest a target may lie past the last observed year.
pub const DEFAULT_MAX_HORIZON_YEARS: i32 = 100;

impl Default for ForecastEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastEngine {
    /// Engine using the dashboard's `(1,1,1)(1,1,1)[12]` order.
    pub fn new() -> Self {
        Self::with_spec(SARIMASpec::DASHBOARD)
    }

    pub fn with_spec(spec: SARIMASpec) -> Self {
        Self {
            spec,
            max_horizon_years: DEFAULT_MAX_HORIZON_YEARS,
        }
    }

    /// Reject targets more than `years` calendar years past the history.
    pub fn with_max_horizon_years(mut self, years: i32) -> Self {
        self.max_horizon_years = years;
        self
    }

    pub fn spec(&self) -> SARIMASpec {
        self.spec
    }

    pub fn max_horizon_years(&self) -> i32 {
        self.max_horizon_years
    }

    /// Forecast `series` through `target_year` with a two-sided interval.
    ///
    /// The first forecast period is the last historical period, so the
    /// forecast line joins the history without a gap.
    ///
    /// # Errors
    /// * `InvalidParameter` if `confidence` is outside (0, 1) or the target
    ///   lies more than [`max_horizon_years`](Self::max_horizon_years) past
    ///   the last observation
    /// * `InsufficientData` if the series is shorter than the model needs
    /// * `ModelFit` if estimation fails (constant or degenerate series)
    pub fn forecast(
        &self,
        series: &TimeSeries,
        target_year: i32,
        confidence: f64,
    ) -> Result<ForecastResult> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence must be in (0, 1), got {}",
                confidence
            )));
        }

        let needed = self.spec.min_observations();
        let last = match series.last_period() {
            Some(last) if series.len() >= needed => last,
            _ => {
                return Err(ForecastError::InsufficientData {
                    needed,
                    got: series.len(),
                })
            }
        };

        let ahead = i64::from(target_year) - i64::from(last.calendar_year());
        if ahead > i64::from(self.max_horizon_years) {
            return Err(ForecastError::InvalidParameter(format!(
                "target year {} is more than {} years past {}",
                target_year,
                self.max_horizon_years,
                last.calendar_year()
            )));
        }

        let effective = effective_target(last, target_year);
        let steps = last
            .steps_until(&effective)
            .map(|s| s + 1)
            .ok_or_else(|| ForecastError::TimestampError("target precedes history".to_string()))?;

        let mut model = SARIMA::from_spec(self.spec);
        model.fit(series)?;
        let prediction = model.predict_with_intervals(steps, confidence)?;

        let periods: Vec<Period> = std::iter::successors(Some(last), |p| Some(p.next()))
            .take(steps)
            .collect();
        let (lower, upper) = match (prediction.lower(), prediction.upper()) {
            (Some(lower), Some(upper)) => (lower, upper),
            _ => return Err(ForecastError::ModelFit("missing forecast interval".to_string())),
        };

        let forecast = periods
            .iter()
            .zip(prediction.point())
            .map(|(&period, &value)| ForecastPoint { period, value })
            .collect();
        let interval = periods
            .iter()
            .zip(lower.iter().zip(upper))
            .map(|(&period, (&lower, &upper))| IntervalPoint {
                period,
                lower,
                upper,
            })
            .collect();

        debug!(
            series = series.label().unwrap_or("unnamed"),
            last = %last,
            target = %effective,
            steps,
            aic = model.aic(),
            "forecast computed"
        );

        Ok(ForecastResult {
            historical: series.clone(),
            forecast,
            interval,
            requested_target: target_year,
            effective_target: effective,
            confidence,
        })
    }
}
