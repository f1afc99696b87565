//! Gradient boosted regression trees artifact

use crate::error::{PredictorError, Result};
use super::{DecisionTree, Regressor};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Rows above which prediction fans out over the rayon pool
const PARALLEL_ROW_THRESHOLD: usize = 1024;

/// Fitted gradient boosting regressor:
/// `y = initial_prediction + learning_rate * Σ tree(x)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    n_features: usize,
    initial_prediction: f64,
    learning_rate: f64,
    trees: Vec<DecisionTree>,
}

impl GradientBoostingRegressor {
    pub fn new(
        n_features: usize,
        initial_prediction: f64,
        learning_rate: f64,
        trees: Vec<DecisionTree>,
    ) -> Self {
        Self {
            n_features,
            initial_prediction,
            learning_rate,
            trees,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Check that every tree fits the declared feature count
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() {
            return Err(PredictorError::ArtifactError(
                "learning rate must be finite".to_string(),
            ));
        }
        self.trees.iter().try_for_each(|t| t.validate(self.n_features))
    }

    fn predict_row(&self, sample: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|t| t.predict_row(sample)).sum();
        self.initial_prediction + self.learning_rate * boost
    }
}

impl Regressor for GradientBoostingRegressor {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_width(x)?;

        let rows: Vec<Vec<f64>> = x.outer_iter().map(|r| r.to_vec()).collect();
        let predictions: Vec<f64> = if rows.len() > PARALLEL_ROW_THRESHOLD {
            rows.par_iter().map(|r| self.predict_row(r)).collect()
        } else {
            rows.iter().map(|r| self.predict_row(r)).collect()
        };

        Ok(Array1::from_vec(predictions))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TreeNode;
    use ndarray::array;

    fn split(feature_idx: usize, threshold: f64, left: f64, right: f64) -> DecisionTree {
        DecisionTree::new(TreeNode::Split {
            feature_idx,
            threshold,
            left: Box::new(TreeNode::Leaf { value: left }),
            right: Box::new(TreeNode::Leaf { value: right }),
        })
    }

    #[test]
    fn test_predict_sums_trees() {
        let model = GradientBoostingRegressor::new(
            2,
            100.0,
            0.5,
            vec![split(0, 1.0, -10.0, 10.0), split(1, 0.0, 4.0, 8.0)],
        );
        let x = array![[0.0, -1.0], [2.0, 1.0]];
        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.to_vec(), vec![100.0 + 0.5 * (-10.0 + 4.0), 100.0 + 0.5 * 18.0]);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let model = GradientBoostingRegressor::new(1, 0.0, 1.0, vec![split(0, 0.5, 1.0, 2.0)]);
        let n = PARALLEL_ROW_THRESHOLD + 10;
        let x = Array2::from_shape_fn((n, 1), |(i, _)| (i % 2) as f64);
        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), n);
        assert_eq!(preds[0], 1.0);
        assert_eq!(preds[1], 2.0);
    }

    #[test]
    fn test_validate_rejects_out_of_range_split() {
        let model = GradientBoostingRegressor::new(1, 0.0, 0.1, vec![split(3, 0.0, 0.0, 1.0)]);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_no_trees_predicts_initial() {
        let model = GradientBoostingRegressor::new(2, 42.0, 0.1, Vec::new());
        assert_eq!(model.n_trees(), 0);
        assert_eq!(model.predict(&array![[1.0, 2.0]]).unwrap().to_vec(), vec![42.0]);
    }
}
