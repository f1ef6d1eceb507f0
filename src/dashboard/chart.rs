//! Chart-ready payloads. The crate shapes data; rendering is the UI's job.

use crate::core::{Period, TimeSeries};
use crate::engine::{ForecastResult, RegressionResult, TestPoint};
use chrono::NaiveDate;
use serde::Serialize;

/// A named line of `(x, y)` points.
///
/// `x` holds period labels (`2020`, `2020-03`); `dates` holds the first
/// calendar day of each period, `None` outside chrono's supported range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub name: String,
    pub x: Vec<String>,
    pub dates: Vec<Option<NaiveDate>>,
    pub y: Vec<f64>,
}

impl LineSeries {
    pub fn from_points<I>(name: impl Into<String>, points: I) -> Self
    where
        I: IntoIterator<Item = (Period, f64)>,
    {
        let (periods, y): (Vec<Period>, Vec<f64>) = points.into_iter().unzip();
        Self {
            name: name.into(),
            x: periods.iter().map(Period::to_string).collect(),
            dates: periods.iter().map(Period::start_date).collect(),
            y,
        }
    }

    pub fn from_series(name: impl Into<String>, series: &TimeSeries) -> Self {
        Self::from_points(name, series.iter())
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Historical line, forecast line and confidence band in one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub historical: LineSeries,
    pub forecast: LineSeries,
    /// Lower bounds aligned with `forecast.x`.
    pub lower: Vec<f64>,
    /// Upper bounds aligned with `forecast.x`.
    pub upper: Vec<f64>,
    pub confidence: f64,
}

impl ForecastChart {
    pub fn new(result: &ForecastResult, title: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "Year".to_string(),
            y_label: y_label.into(),
            historical: LineSeries::from_series("Historical Data", &result.historical),
            forecast: LineSeries::from_points(
                "Forecast",
                result.forecast.iter().map(|p| (p.period, p.value)),
            ),
            lower: result.interval.iter().map(|b| b.lower).collect(),
            upper: result.interval.iter().map(|b| b.upper).collect(),
            confidence: result.confidence,
        }
    }
}

/// Held-out points with the fitted regression line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<TestPoint>,
    pub line: [(f64, f64); 2],
    pub slope: f64,
    pub intercept: f64,
    pub mse: f64,
}

impl From<RegressionResult> for RegressionChart {
    fn from(result: RegressionResult) -> Self {
        Self {
            title: "GDP vs CO2 Emissions".to_string(),
            x_label: "GDP".to_string(),
            y_label: "CO2 Emissions (kt)".to_string(),
            points: result.test_points,
            line: result.fitted_line,
            slope: result.slope,
            intercept: result.intercept,
            mse: result.mse,
        }
    }
}
