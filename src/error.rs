//! Error types for the demand forecasting pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while repairing, preprocessing, training or evaluating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Frequency tag is not one of the supported values.
    #[error("unsupported frequency: {0}")]
    UnsupportedFrequency(String),

    /// A named column does not exist in the frame.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Actual values passed to a demand-weighted metric contain negatives.
    #[error("negative values in actuals are not allowed")]
    NegativeActuals,

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Filesystem failure in a persistence collaborator.
    #[error("io error: {0}")]
    Io(String),

    /// Data frame or CSV failure reported by polars.
    #[error("polars error: {0}")]
    Polars(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Io(err.to_string())
    }
}

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ForecastError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ForecastError::InsufficientData { needed: 10, got: 5 };
        assert_eq!(
            err.to_string(),
            "insufficient data: need at least 10, got 5"
        );

        let err = ForecastError::MissingColumn("demand".to_string());
        assert_eq!(err.to_string(), "missing column: demand");

        let err = ForecastError::UnsupportedFrequency("annual".to_string());
        assert_eq!(err.to_string(), "unsupported frequency: annual");

        let err = ForecastError::NegativeActuals;
        assert_eq!(err.to_string(), "negative values in actuals are not allowed");

        let err = ForecastError::FitRequired;
        assert_eq!(err.to_string(), "model must be fitted before prediction");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ForecastError = io.into();
        assert!(matches!(err, ForecastError::Io(ref msg) if msg.contains("gone")));
    }

    #[test]
    fn polars_errors_convert() {
        let err: ForecastError =
            polars::prelude::PolarsError::ColumnNotFound("demand".into()).into();
        assert!(matches!(err, ForecastError::Polars(ref msg) if msg.contains("demand")));
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = ForecastError::NegativeActuals;
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
