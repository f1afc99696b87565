//! Linear regression artifact

use crate::error::Result;
use super::Regressor;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Fitted linear regression: `y = x · coefficients + intercept`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted coefficients (weights), one per preprocessed column
    pub coefficients: Vec<f64>,
    /// Fitted intercept (bias)
    #[serde(default)]
    pub intercept: f64,
}

impl LinearRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Regressor for LinearRegression {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_width(x)?;
        let coefficients = ArrayView1::from(&self.coefficients[..]);
        Ok(x.dot(&coefficients) + self.intercept)
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictorError;
    use ndarray::array;

    #[test]
    fn test_predict() {
        let model = LinearRegression::new(vec![1.0, -2.0], 10.0);
        let x = array![[1.0, 1.0], [3.0, 0.5]];
        assert_eq!(model.predict(&x).unwrap().to_vec(), vec![9.0, 12.0]);
    }

    #[test]
    fn test_width_mismatch() {
        let model = LinearRegression::new(vec![1.0, 2.0, 3.0], 0.0);
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict(&x),
            Err(PredictorError::ShapeError { .. })
        ));
    }

    #[test]
    fn test_intercept_defaults_to_zero() {
        let model: LinearRegression =
            serde_json::from_str(r#"{"coefficients": [0.5]}"#).unwrap();
        assert_eq!(model.intercept, 0.0);
    }
}
