//! Missing value imputation strategies

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Strategy for imputing missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with mean (numeric only)
    Mean,
    /// Replace with median (numeric only)
    Median,
    /// Replace with mode / most frequent value
    MostFrequent,
    /// Replace with a constant value (numeric only)
    Constant(f64),
    /// Replace with a constant string (categorical only)
    ConstantString(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum ImputeValue {
    Numeric(f64),
    Text(String),
}

/// Imputer for handling missing values, fitted per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: BTreeMap<String, ImputeValue>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Learn the fill value of a numeric column
    pub fn fit_numeric(&mut self, name: &str, values: &[Option<f64>]) -> Result<&mut Self> {
        let observed: Vec<f64> = values.iter().flatten().copied().collect();

        let fill = match &self.strategy {
            ImputeStrategy::Constant(v) => *v,
            ImputeStrategy::ConstantString(_) => {
                return Err(PredictorError::ConfigError(format!(
                    "constant string imputation cannot be used for numeric column '{}'",
                    name
                )));
            }
            _ if observed.is_empty() => {
                return Err(PredictorError::PreprocessingError(format!(
                    "cannot impute column '{}': no observed values",
                    name
                )));
            }
            ImputeStrategy::Mean => observed.iter().sum::<f64>() / observed.len() as f64,
            ImputeStrategy::Median => median(&observed),
            ImputeStrategy::MostFrequent => mode_numeric(&observed),
        };

        self.fill_values.insert(name.to_string(), ImputeValue::Numeric(fill));
        self.is_fitted = true;
        Ok(self)
    }

    /// Learn the fill value of a categorical column
    pub fn fit_categorical(&mut self, name: &str, values: &[Option<String>]) -> Result<&mut Self> {
        let fill = match &self.strategy {
            ImputeStrategy::ConstantString(s) => s.clone(),
            ImputeStrategy::MostFrequent => {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for v in values.iter().flatten() {
                    *counts.entry(v.as_str()).or_insert(0) += 1;
                }
                // Ties resolve to the lexicographically smallest category
                counts
                    .into_iter()
                    .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
                    .map(|(v, _)| v.to_string())
                    .ok_or_else(|| {
                        PredictorError::PreprocessingError(format!(
                            "cannot impute column '{}': no observed values",
                            name
                        ))
                    })?
            }
            other => {
                return Err(PredictorError::ConfigError(format!(
                    "{:?} imputation cannot be used for categorical column '{}'",
                    other, name
                )));
            }
        };

        self.fill_values.insert(name.to_string(), ImputeValue::Text(fill));
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace missing numeric values with the fitted fill value
    pub fn fill_numeric(&self, name: &str, values: Vec<Option<f64>>) -> Result<Vec<f64>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        match self.fill_values.get(name) {
            Some(ImputeValue::Numeric(fill)) => {
                Ok(values.into_iter().map(|v| v.unwrap_or(*fill)).collect())
            }
            _ => Err(PredictorError::FeatureNotFound(name.to_string())),
        }
    }

    /// Replace missing categorical values with the fitted fill value
    pub fn fill_categorical(&self, name: &str, values: Vec<Option<String>>) -> Result<Vec<String>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        match self.fill_values.get(name) {
            Some(ImputeValue::Text(fill)) => Ok(values
                .into_iter()
                .map(|v| v.unwrap_or_else(|| fill.clone()))
                .collect()),
            _ => Err(PredictorError::FeatureNotFound(name.to_string())),
        }
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn mode_numeric(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    // Walk runs of equal values; strict `>` keeps the smallest value on ties
    let mut best = sorted[0];
    let mut best_count = 0usize;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        if j - i > best_count {
            best_count = j - i;
            best = sorted[i];
        }
        i = j;
    }
    best
}
