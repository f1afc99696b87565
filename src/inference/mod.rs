//! Price inference
//!
//! Provides:
//! - Coercion of raw form fields into a typed input record
//! - Single-record prediction, rounded for display
//! - Whole-table batch prediction over CSV

mod engine;
mod record;

pub use engine::InferenceEngine;
pub use record::{FeatureValue, InputRecord};

use serde::Serialize;

/// Result of a single-record prediction
#[derive(Debug, Clone, Serialize)]
pub struct SinglePrediction {
    /// Predicted price rounded to two decimals
    pub prediction: f64,
    /// The coerced input the prediction was made from
    pub input_data: InputRecord,
}
