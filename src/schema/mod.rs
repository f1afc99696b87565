//! Feature schema
//!
//! The ordered, typed set of inputs the preprocessor was fitted on: numeric
//! columns first, categorical columns after. Each numeric feature carries
//! the integer/float decision taken from the training sample at load time,
//! so requests never go back to disk to coerce a value.

mod metadata;

pub use metadata::{rank_by_frequency, NumericDefault, UiMetadata};

use crate::error::{PredictorError, Result};
use crate::preprocessing::{is_integer_dtype, is_numeric_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Target column of the training sample
pub const TARGET_COLUMN: &str = "Price_INR";

/// Column appended to batch results
pub const PREDICTION_COLUMN: &str = "Predicted_Price_INR";

/// How a numeric feature's raw text is coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericKind {
    Integer,
    Float,
}

/// On-disk schema descriptor
#[derive(Debug, Deserialize)]
struct FeatureListFile {
    #[serde(default)]
    num_cols: Vec<String>,
    #[serde(default)]
    cat_cols: Vec<String>,
}

/// Ordered feature schema partitioned into numeric and categorical columns
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeatureSchema {
    num_cols: Vec<String>,
    cat_cols: Vec<String>,
    numeric_kinds: HashMap<String, NumericKind>,
}

impl FeatureSchema {
    /// Build a schema, checking that every feature appears exactly once.
    /// All numeric features start out as [`NumericKind::Float`].
    pub fn new(num_cols: Vec<String>, cat_cols: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in num_cols.iter().chain(cat_cols.iter()) {
            if !seen.insert(name.as_str()) {
                return Err(PredictorError::ConfigError(format!(
                    "feature '{}' is declared more than once",
                    name
                )));
            }
        }

        let numeric_kinds = num_cols
            .iter()
            .map(|name| (name.clone(), NumericKind::Float))
            .collect();

        Ok(Self {
            num_cols,
            cat_cols,
            numeric_kinds,
        })
    }

    /// Read the JSON descriptor `{"num_cols": [...], "cat_cols": [...]}`
    pub fn from_descriptor(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let descriptor: FeatureListFile = serde_json::from_str(&json).map_err(|e| {
            PredictorError::ConfigError(format!("invalid feature list {}: {}", path.display(), e))
        })?;
        Self::new(descriptor.num_cols, descriptor.cat_cols)
    }

    /// Infer the schema from the training sample: every column except the
    /// target, numeric by dtype, categorical otherwise
    pub fn infer(sample: &DataFrame) -> Result<Self> {
        let mut num_cols = Vec::new();
        let mut cat_cols = Vec::new();

        for column in sample.get_columns() {
            let name = column.name().to_string();
            if name == TARGET_COLUMN {
                continue;
            }
            if is_numeric_dtype(column.dtype()) {
                num_cols.push(name);
            } else {
                cat_cols.push(name);
            }
        }

        Self::new(num_cols, cat_cols)
    }

    /// Resolve the schema from the descriptor if it exists, falling back to
    /// the training sample; then fix numeric kinds from the sample.
    pub fn resolve(descriptor: &Path, sample: Option<&DataFrame>) -> Result<Self> {
        let schema = if descriptor.exists() {
            info!(path = %descriptor.display(), "Loading feature schema from descriptor");
            Self::from_descriptor(descriptor)?
        } else if let Some(sample) = sample {
            warn!(
                path = %descriptor.display(),
                "Feature descriptor not found, inferring schema from training sample"
            );
            Self::infer(sample)?
        } else {
            return Err(PredictorError::ConfigError(format!(
                "no feature schema available: neither {} nor a training sample exists",
                descriptor.display()
            )));
        };

        if schema.is_empty() {
            return Err(PredictorError::ConfigError(
                "feature schema declares no features".to_string(),
            ));
        }

        Ok(match sample {
            Some(sample) => schema.with_numeric_kinds_from(sample),
            None => schema,
        })
    }

    /// Mark numeric features stored with an integer dtype in `sample` as
    /// [`NumericKind::Integer`]
    pub fn with_numeric_kinds_from(mut self, sample: &DataFrame) -> Self {
        for name in &self.num_cols {
            let kind = match sample.column(name) {
                Ok(column) if is_integer_dtype(column.dtype()) => NumericKind::Integer,
                _ => NumericKind::Float,
            };
            self.numeric_kinds.insert(name.clone(), kind);
        }
        self
    }

    /// All features, numeric first
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.num_cols
            .iter()
            .chain(self.cat_cols.iter())
            .map(String::as_str)
    }

    pub fn num_cols(&self) -> &[String] {
        &self.num_cols
    }

    pub fn cat_cols(&self) -> &[String] {
        &self.cat_cols
    }

    pub fn len(&self) -> usize {
        self.num_cols.len() + self.cat_cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric kind of a feature, `None` for categorical or unknown names
    pub fn numeric_kind(&self, name: &str) -> Option<NumericKind> {
        self.numeric_kinds.get(name).copied()
    }

    /// Schema features absent from `df`
    pub fn missing_columns(&self, df: &DataFrame) -> Vec<String> {
        self.features()
            .filter(|name| df.column(name).is_err())
            .map(str::to_string)
            .collect()
    }
}
