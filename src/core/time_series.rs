//! TimeSeries data structure for period-indexed climate data.

use crate::core::period::{Granularity, Period, PeriodRange};
use crate::error::{ForecastError, Result};
use std::collections::BTreeMap;

fn is_missing(v: f64) -> bool {
    !v.is_finite()
}

/// Replace non-finite entries of a feature column with the column mean.
///
/// Returns the mean used. A column with no finite entry is `MissingValues`.
pub fn impute_mean(values: &mut [f64]) -> Result<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| !is_missing(**v))
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return Err(ForecastError::MissingValues);
    }
    let mean = sum / count as f64;
    values
        .iter_mut()
        .filter(|v| is_missing(**v))
        .for_each(|v| *v = mean);
    Ok(mean)
}

/// A univariate series of values indexed by strictly increasing periods.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    periods: Vec<Period>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a series, validating ordering and granularity.
    pub fn new(periods: Vec<Period>, values: Vec<f64>) -> Result<Self> {
        if periods.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: periods.len(),
                got: values.len(),
            });
        }

        if let Some(first) = periods.first() {
            let granularity = first.granularity();
            if periods.iter().any(|p| p.granularity() != granularity) {
                return Err(ForecastError::TimestampError(
                    "periods must share one granularity".to_string(),
                ));
            }
        }

        for w in periods.windows(2) {
            if w[1] <= w[0] {
                return Err(ForecastError::TimestampError(
                    "periods must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self {
            periods,
            values,
            label: None,
        })
    }

    /// Build an annual series from consecutive years starting at `start`.
    pub fn annual(start: i32, values: Vec<f64>) -> Result<Self> {
        let periods = (0..values.len())
            .map(|i| Period::Year(start + i as i32))
            .collect();
        Self::new(periods, values)
    }

    /// Build a series from unordered raw observations.
    ///
    /// Observations sharing a period are folded by arithmetic mean; the
    /// result is sorted by period.
    pub fn from_observations<I>(observations: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Period, f64)>,
    {
        let mut buckets: BTreeMap<Period, (f64, usize)> = BTreeMap::new();
        for (period, value) in observations {
            let entry = buckets.entry(period).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }

        let (periods, values) = buckets
            .into_iter()
            .map(|(period, (sum, count))| (period, sum / count as f64))
            .unzip();
        Self::new(periods, values)
    }

    /// Attach a display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Granularity of the series, `None` when empty.
    pub fn granularity(&self) -> Option<Granularity> {
        self.periods.first().map(Period::granularity)
    }

    pub fn first_period(&self) -> Option<Period> {
        self.periods.first().copied()
    }

    pub fn last_period(&self) -> Option<Period> {
        self.periods.last().copied()
    }

    /// Iterate over `(period, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.periods.iter().copied().zip(self.values.iter().copied())
    }

    /// Keep only observations whose calendar year lies in `range`.
    pub fn within(&self, range: PeriodRange) -> TimeSeries {
        let (periods, values) = self.iter().filter(|(p, _)| range.contains(p)).unzip();
        TimeSeries {
            periods,
            values,
            label: self.label.clone(),
        }
    }

    /// Fold a monthly series into calendar-year means.
    ///
    /// Annual series are returned unchanged.
    pub fn to_annual(&self) -> Result<TimeSeries> {
        if self.granularity() != Some(Granularity::Monthly) {
            return Ok(self.clone());
        }
        let mut annual =
            Self::from_observations(self.iter().map(|(p, v)| (Period::Year(p.calendar_year()), v)))?;
        annual.label = self.label.clone();
        Ok(annual)
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|&v| is_missing(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn months(year: i32, n: u32) -> Vec<Period> {
        (1..=n).map(|m| Period::month(year, m).unwrap()).collect()
    }

    #[test]
    fn new_validates_ordering() {
        let err = TimeSeries::new(
            vec![Period::year(2001), Period::year(2000)],
            vec![1.0, 2.0],
        );
        assert!(matches!(err, Err(ForecastError::TimestampError(_))));

        let dup = TimeSeries::new(
            vec![Period::year(2000), Period::year(2000)],
            vec![1.0, 2.0],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn new_validates_lengths_and_granularity() {
        assert!(matches!(
            TimeSeries::new(vec![Period::year(2000)], vec![1.0, 2.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));

        let mixed = TimeSeries::new(
            vec![Period::year(2000), Period::month(2001, 1).unwrap()],
            vec![1.0, 2.0],
        );
        assert!(matches!(mixed, Err(ForecastError::TimestampError(_))));
    }

    #[test]
    fn annual_constructor_is_contiguous() {
        let ts = TimeSeries::annual(1990, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ts.first_period(), Some(Period::year(1990)));
        assert_eq!(ts.last_period(), Some(Period::year(1992)));
        assert_eq!(ts.granularity(), Some(Granularity::Annual));
    }

    #[test]
    fn observations_fold_by_mean() {
        let ts = TimeSeries::from_observations(vec![
            (Period::year(2001), 4.0),
            (Period::year(2000), 1.0),
            (Period::year(2001), 6.0),
        ])
        .unwrap();

        assert_eq!(ts.periods(), &[Period::year(2000), Period::year(2001)]);
        assert_relative_eq!(ts.values()[1], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn monthly_series_folds_to_annual_means() {
        let mut periods = months(2000, 12);
        periods.extend(months(2001, 6));
        let values: Vec<f64> = (0..18).map(|i| if i < 12 { 1.0 } else { i as f64 }).collect();
        let ts = TimeSeries::new(periods, values).unwrap().with_label("World");

        let annual = ts.to_annual().unwrap();
        assert_eq!(annual.len(), 2);
        assert_relative_eq!(annual.values()[0], 1.0, epsilon = 1e-12);
        // mean of 12..=17
        assert_relative_eq!(annual.values()[1], 14.5, epsilon = 1e-12);
        assert_eq!(annual.label(), Some("World"));
    }

    #[test]
    fn within_filters_by_year() {
        let ts = TimeSeries::annual(2000, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let sub = ts.within(PeriodRange::new(2001, 2002).unwrap());
        assert_eq!(sub.values(), &[2.0, 3.0]);
    }

    #[test]
    fn missing_values_detected() {
        let ts = TimeSeries::annual(2000, vec![1.0, f64::NAN, 3.0]).unwrap();
        assert!(ts.has_missing_values());
        assert!(!TimeSeries::annual(2000, vec![1.0, 2.0]).unwrap().has_missing_values());
    }

    #[test]
    fn impute_mean_fills_gaps() {
        let mut column = vec![0.2, f64::NAN, 0.4, f64::INFINITY];
        let mean = impute_mean(&mut column).unwrap();
        assert_relative_eq!(mean, 0.3, epsilon = 1e-12);
        assert_relative_eq!(column[1], 0.3, epsilon = 1e-12);
        assert_relative_eq!(column[3], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn impute_mean_rejects_empty_column() {
        let mut column = vec![f64::NAN, f64::NAN];
        assert!(matches!(
            impute_mean(&mut column),
            Err(ForecastError::MissingValues)
        ));
    }
}
