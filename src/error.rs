//! Error types for the climate-forecast library.

use thiserror::Error;

/// Result type alias for data access and forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while loading data or computing forecasts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// The requested entity has no rows in the source table.
    #[error("no data for entity '{entity}'")]
    NotFound { entity: String },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Numerical model fitting failed.
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Period ordering or granularity error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Reading a source file failed.
    #[error("io error: {0}")]
    Io(String),

    /// A source file could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ForecastError {
    /// Whether the error means "nothing to show" rather than a defect.
    ///
    /// These are the failures a dashboard turns into a "no data available"
    /// placeholder.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            ForecastError::NotFound { .. }
                | ForecastError::InsufficientData { .. }
                | ForecastError::ModelFit(_)
                | ForecastError::EmptyData
        )
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Io(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        match err.kind() {
            csv::ErrorKind::Io(_) => ForecastError::Io(err.to_string()),
            _ => ForecastError::Parse {
                line,
                message: err.to_string(),
            },
        }
    }
}
