//! Fitted feature preprocessing
//!
//! Turns a raw table of named features into the dense numeric matrix the
//! regression model consumes:
//! - Missing value imputation
//! - Numeric scaling (Standard, MinMax, Robust, MaxAbs)
//! - One-hot encoding of categorical columns
//!
//! The fitted [`DataPreprocessor`] is the preprocessor artifact; it is saved
//! and loaded as JSON.

mod config;
mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use config::PreprocessingConfig;
pub use encoder::OneHotEncoder;
pub use imputer::{ImputeStrategy, Imputer};
pub use pipeline::DataPreprocessor;
pub use scaler::{Scaler, ScalerType};

use crate::error::{PredictorError, Result};
use polars::prelude::*;

/// Check whether a polars dtype holds numbers
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

/// Check whether a polars dtype holds integers
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    dtype.is_integer()
}

/// Read a column as optional floats, failing if any non-null value is not numeric
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PredictorError::FeatureNotFound(name.to_string()))?;
    let series = column
        .as_materialized_series()
        .strict_cast(&DataType::Float64)
        .map_err(|e| {
            PredictorError::DataError(format!("column '{}' is not numeric: {}", name, e))
        })?;
    let ca = series.f64()?;
    Ok(ca.into_iter().collect())
}

/// Read a column as optional strings
pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PredictorError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let ca = series.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}
