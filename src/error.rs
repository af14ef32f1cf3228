use thiserror::Error;

/// Kalman filter error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KalmanError {
    #[error("Filter is not initialized")]
    NotInitialized,

    #[error("{what} is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    DimensionMismatch {
        what: &'static str,
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("State and observation dimensions must be non-zero")]
    EmptyModel,

    #[error("Innovation covariance is singular")]
    SingularInnovation,
}

/// Result type for filter operations
pub type KalmanResult<T> = Result<T, KalmanError>;

/// Errors raised while loading a filter model file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Matrix `{name}` is ragged at row {row}")]
    RaggedMatrix { name: &'static str, row: usize },

    #[error("Invalid filter model: {0}")]
    Filter(#[from] KalmanError),
}
