//! # climate-forecast
//!
//! Backend of a climate dashboard: loads emissions, temperature and GDP
//! tables once, serves per-entity historical series, and computes on
//! demand
//!
//! - a seasonal ARIMA `(1,1,1)(1,1,1)[12]` forecast with a confidence band,
//! - a GDP/CO₂ linear regression on a seeded train/test split,
//! - a cross-validated regression of annual temperature anomalies.
//!
//! Results are chart-ready payloads; the UI renders them.
//!
//! ```no_run
//! use std::sync::Arc;
//! use climate_forecast::prelude::*;
//!
//! let config = DashboardConfig::from_file("dashboard.toml")?;
//! let data = Arc::new(ClimateData::load(config.data.sources())?);
//! let state = DashboardState::new(data, config);
//! let registry = HandlerRegistry::with_dashboard_handlers();
//!
//! let request = PanelRequest::Forecast(ForecastRequest::new("USA", 2030));
//! let response = registry.dispatch(&state, "co2-forecast", &request);
//! println!("{}", response.to_json().unwrap_or_default());
//! # Ok::<(), climate_forecast::ForecastError>(())
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod dashboard;
pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod telemetry;
pub mod transform;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::DashboardConfig;
    pub use crate::core::{Forecast, Period, PeriodRange, TimeSeries};
    pub use crate::dashboard::{DashboardState, HandlerRegistry, PanelRequest, PanelResponse};
    pub use crate::data::{ClimateData, SeriesProvider};
    pub use crate::engine::{ForecastEngine, ForecastRequest, ForecastResult};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::Forecaster;
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
