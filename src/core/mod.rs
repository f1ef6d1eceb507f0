//! Core data structures for period-indexed series and forecasts.

mod forecast;
mod period;
mod time_series;

pub use forecast::Forecast;
pub use period::{Granularity, Period, PeriodRange};
pub use time_series::{impute_mean, TimeSeries};
