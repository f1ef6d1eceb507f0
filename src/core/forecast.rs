//! Model output on the step axis.

use crate::error::{ForecastError, Result};

/// Step-indexed predictions of a fitted model, optionally with bounds.
///
/// Step `0` is the last observed period; calendar labels are attached by the
/// engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    bounds: Option<(Vec<f64>, Vec<f64>)>,
}

impl Forecast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point predictions only.
    pub fn points(point: Vec<f64>) -> Self {
        Self {
            point,
            bounds: None,
        }
    }

    /// Point predictions with lower and upper bounds of the same length.
    pub fn with_bounds(point: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        for bound in [&lower, &upper] {
            if bound.len() != point.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: point.len(),
                    got: bound.len(),
                });
            }
        }
        Ok(Self {
            point,
            bounds: Some((lower, upper)),
        })
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn point(&self) -> &[f64] {
        &self.point
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.bounds.as_ref().map(|(lower, _)| lower.as_slice())
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.bounds.as_ref().map(|(_, upper)| upper.as_slice())
    }

    /// `(lower, upper)` at `step`, if bounds were computed.
    pub fn bounds_at(&self, step: usize) -> Option<(f64, f64)> {
        let (lower, upper) = self.bounds.as_ref()?;
        Some((*lower.get(step)?, *upper.get(step)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_forecast() {
        let forecast = Forecast::new();
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
        assert!(!forecast.has_bounds());
        assert_eq!(forecast.bounds_at(0), None);
    }

    #[test]
    fn points_without_bounds() {
        let forecast = Forecast::points(vec![36.1, 36.4, 36.9]);
        assert_eq!(forecast.horizon(), 3);
        assert_eq!(forecast.point(), &[36.1, 36.4, 36.9]);
        assert!(forecast.lower().is_none());
        assert_eq!(forecast.bounds_at(1), None);
    }

    #[test]
    fn bounds_are_step_aligned() {
        let forecast =
            Forecast::with_bounds(vec![2.0, 3.0], vec![1.5, 2.0], vec![2.5, 4.0]).unwrap();

        assert!(forecast.has_bounds());
        assert_eq!(forecast.lower().unwrap(), &[1.5, 2.0]);
        assert_eq!(forecast.upper().unwrap(), &[2.5, 4.0]);
        assert_eq!(forecast.bounds_at(1), Some((2.0, 4.0)));
        assert_eq!(forecast.bounds_at(2), None);
    }

    #[test]
    fn mismatched_bounds_rejected() {
        let err = Forecast::with_bounds(vec![1.0, 2.0], vec![0.0], vec![3.0, 4.0]);
        assert!(matches!(
            err,
            Err(ForecastError::DimensionMismatch { expected: 2, got: 1 })
        ));
        let err = Forecast::with_bounds(vec![1.0], vec![0.0], vec![]);
        assert!(matches!(
            err,
            Err(ForecastError::DimensionMismatch { expected: 1, got: 0 })
        ));
    }
}
