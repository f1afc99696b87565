//! Laptop Price Predictor - prediction service for a fitted price model
//!
//! This crate loads a fitted preprocessor, a regression model and a feature
//! schema at startup, then serves single-record and batch predictions of
//! `Price_INR`.
//!
//! # Modules
//!
//! ## Core ML Modules
//! - [`preprocessing`] - Imputation, scaling and one-hot encoding
//! - [`models`] - Regression model artifacts (linear, gradient boosting)
//! - [`inference`] - Record coercion and single/batch prediction
//!
//! ## Artifacts
//! - [`schema`] - Feature schema and form metadata
//! - [`artifacts`] - Artifact discovery and startup loading
//!
//! ## Services
//! - [`server`] - HTTP server with HTML form and CSV upload
//! - [`cli`] - Command-line interface
//!
//! ## Utilities
//! - [`utils`] - CSV loading and saving

// Core error handling
pub mod error;

// Core ML modules
pub mod preprocessing;
pub mod models;
pub mod inference;

// Artifacts
pub mod schema;
pub mod artifacts;

// Utilities
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{PredictorError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PredictorError, Result};

    // Preprocessing
    pub use crate::preprocessing::{DataPreprocessor, PreprocessingConfig, ScalerType, ImputeStrategy};

    // Models
    pub use crate::models::{RegressionModel, Regressor, LinearRegression, GradientBoostingRegressor};

    // Inference
    pub use crate::inference::{InferenceEngine, InputRecord, FeatureValue, SinglePrediction};

    // Schema and artifacts
    pub use crate::schema::{FeatureSchema, NumericKind, UiMetadata, TARGET_COLUMN, PREDICTION_COLUMN};
    pub use crate::artifacts::{ArtifactPaths, LoadedArtifacts, load_artifacts};
}
