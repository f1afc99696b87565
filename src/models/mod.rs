//! Regression model artifacts
//!
//! Models arrive pre-trained; this module only knows how to load them and
//! map a preprocessed matrix to one prediction per row:
//! - Linear models (coefficients + intercept)
//! - Gradient boosted regression trees

pub mod decision_tree;
pub mod gradient_boosting;
pub mod linear_models;

pub use decision_tree::{DecisionTree, TreeNode};
pub use gradient_boosting::GradientBoostingRegressor;
pub use linear_models::LinearRegression;

use crate::error::{PredictorError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Common interface for loaded regression models
pub trait Regressor: Send + Sync {
    /// Make predictions, one per row of `x`
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Number of input columns the model expects
    fn n_features(&self) -> usize;

    /// Fail with a shape error unless `x` has the expected width
    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features() {
            return Err(PredictorError::ShapeError {
                expected: format!("{} features", self.n_features()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }
}

/// The model artifact, tagged by model family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear(LinearRegression),
    GradientBoosting(GradientBoostingRegressor),
}

impl RegressionModel {
    /// Human-readable model family
    pub fn name(&self) -> &'static str {
        match self {
            RegressionModel::Linear(_) => "linear",
            RegressionModel::GradientBoosting(_) => "gradient_boosting",
        }
    }

    /// Save the model to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a model from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        match self {
            RegressionModel::Linear(_) => Ok(()),
            RegressionModel::GradientBoosting(m) => m.validate(),
        }
    }
}

impl Regressor for RegressionModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            RegressionModel::Linear(m) => m.predict(x),
            RegressionModel::GradientBoosting(m) => m.predict(x),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            RegressionModel::Linear(m) => m.n_features(),
            RegressionModel::GradientBoosting(m) => m.n_features(),
        }
    }
}
