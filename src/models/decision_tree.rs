//! Regression tree artifact

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64 },
    /// Internal node; samples with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Fitted regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
}

impl DecisionTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    /// Predict a single preprocessed row
    pub fn predict_row(&self, sample: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split { feature_idx, threshold, left, right } => {
                    // NaN compares false and follows the right branch
                    node = if sample[*feature_idx] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Largest feature index referenced by any split
    pub fn max_feature_idx(&self) -> Option<usize> {
        fn walk(node: &TreeNode) -> Option<usize> {
            match node {
                TreeNode::Leaf { .. } => None,
                TreeNode::Split { feature_idx, left, right, .. } => {
                    [Some(*feature_idx), walk(left), walk(right)]
                        .into_iter()
                        .flatten()
                        .max()
                }
            }
        }
        walk(&self.root)
    }

    /// Check that every split addresses a column below `n_features`
    pub fn validate(&self, n_features: usize) -> Result<()> {
        match self.max_feature_idx() {
            Some(idx) if idx >= n_features => Err(PredictorError::ArtifactError(format!(
                "tree splits on feature {} but the model declares {} features",
                idx, n_features
            ))),
            _ => Ok(()),
        }
    }
}
