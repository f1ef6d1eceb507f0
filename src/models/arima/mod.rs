//! Seasonal ARIMA (Autoregressive Integrated Moving Average) models.
//!
//! This module provides:
//! - SARIMA(p, d, q)(P, D, Q)\[s\] estimation by conditional sum of squares
//! - Differencing and integration helpers for the combined operator

mod diff;
mod model;

pub use diff::{difference, differencing_polynomial, integrate, seasonal_difference};
pub use model::{SARIMASpec, SARIMA};
