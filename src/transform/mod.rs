//! Data transformations applied to model features.
//!
//! # Example
//!
//! ```
//! use climate_forecast::transform::standardize;
//!
//! let params = standardize(&[1.0, 2.0, 3.0]);
//! let scaled = params.transform(&[2.0]);
//! assert_eq!(scaled, vec![0.0]);
//! ```

pub mod scale;

pub use scale::{standardize, standardize_columns, ScaleResult};
