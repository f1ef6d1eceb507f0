//! Computations run on demand by the dashboard panels.
//!
//! - [`ForecastEngine`]: seasonal ARIMA forecast with a clamped horizon
//! - [`gdp_co2_regression`]: GDP/emissions OLS on a seeded split
//! - [`evaluate_temperature_model`]: cross-validated anomaly regression

mod evaluation;
mod forecast;
mod regression;

pub use evaluation::{
    evaluate_temperature_model, time_series_folds, EvaluationConfig, EvaluationReport, Fold,
    FEATURES,
};
pub use forecast::{
    effective_target, ForecastEngine, ForecastPoint, ForecastRequest, ForecastResult,
    IntervalPoint, DEFAULT_MAX_HORIZON_YEARS,
};
pub use regression::{
    gdp_co2_regression, join_on_entity_year, JoinedRow, RegressionResult, SplitConfig, TestPoint,
};
