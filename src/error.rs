//! Error types for the price predictor

use thiserror::Error;

/// Result type alias for predictor operations
pub type Result<T> = std::result::Result<T, PredictorError>;

/// Main error type shared by artifact loading, preprocessing and inference
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Model artifacts are not loaded")]
    ArtifactsNotLoaded,

    #[error("Missing value for feature '{0}'")]
    MissingFeature(String),

    #[error("Could not convert '{value}' to a number for feature '{feature}'")]
    CoercionError { feature: String, value: String },

    #[error("Column mismatch: missing columns [{}]", .0.join(", "))]
    ColumnMismatch(Vec<String>),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for PredictorError {
    fn from(err: polars::error::PolarsError) -> Self {
        PredictorError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PredictorError {
    fn from(err: serde_json::Error) -> Self {
        PredictorError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PredictorError {
    fn from(err: ndarray::ShapeError) -> Self {
        PredictorError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
