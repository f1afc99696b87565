//! Categorical encoding

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One-hot encoder over fitted category sets.
///
/// Categories are kept sorted so the indicator columns always come out in
/// the same order. Values never seen during fit encode as all zeros.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: BTreeMap<String, Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit one column from its (imputed) values
    pub fn fit_column(&mut self, name: &str, values: &[String]) -> Result<&mut Self> {
        let unique: BTreeSet<&str> = values.iter().map(String::as_str).collect();
        if unique.is_empty() {
            return Err(PredictorError::PreprocessingError(format!(
                "cannot fit encoder on empty column '{}'",
                name
            )));
        }
        self.categories.insert(
            name.to_string(),
            unique.into_iter().map(str::to_string).collect(),
        );
        self.is_fitted = true;
        Ok(self)
    }

    /// Fitted categories of a column
    pub fn categories(&self, name: &str) -> Result<&[String]> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        self.categories
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| PredictorError::FeatureNotFound(name.to_string()))
    }

    /// Position of the indicator column for `value`, `None` for unseen values
    pub fn index_of(&self, name: &str, value: &str) -> Result<Option<usize>> {
        let categories = self.categories(name)?;
        Ok(categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok())
    }
}
