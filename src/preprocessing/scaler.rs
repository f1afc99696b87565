//! Feature scaling implementations

use crate::error::{PredictorError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Type of scaler to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// Robust scaling using median and IQR
    Robust,
    /// Max absolute scaling: x / max(|x|)
    MaxAbs,
    /// No scaling
    None,
}

/// Parameters for a fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: f64,
    pub scale: f64,
}

/// Feature scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: BTreeMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to one column of already-imputed values
    pub fn fit_column(&mut self, name: &str, values: &[f64]) -> Result<&mut Self> {
        let params = self.compute_params(name, values)?;
        self.params.insert(name.to_string(), params);
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale one value of a fitted column
    pub fn scale(&self, name: &str, value: f64) -> Result<f64> {
        let params = self.params_for(name)?;
        Ok((value - params.center) / params.scale)
    }

    fn params_for(&self, name: &str) -> Result<&ScalerParams> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }
        self.params
            .get(name)
            .ok_or_else(|| PredictorError::FeatureNotFound(name.to_string()))
    }

    fn compute_params(&self, name: &str, values: &[f64]) -> Result<ScalerParams> {
        if values.is_empty() && self.scaler_type != ScalerType::None {
            return Err(PredictorError::PreprocessingError(format!(
                "cannot fit scaler on empty column '{}'",
                name
            )));
        }

        let ca = Float64Chunked::from_vec(name.into(), values.to_vec());

        let params = match self.scaler_type {
            ScalerType::Standard => {
                let mean = ca.mean().unwrap_or(0.0);
                // Population std, as fitted scalers conventionally use
                let std = ca.std(0).unwrap_or(1.0);
                ScalerParams {
                    center: mean,
                    scale: non_zero(std),
                }
            }
            ScalerType::MinMax => {
                let min = ca.min().unwrap_or(0.0);
                let max = ca.max().unwrap_or(1.0);
                ScalerParams {
                    center: min,
                    scale: non_zero(max - min),
                }
            }
            ScalerType::Robust => {
                let median = ca.median().unwrap_or(0.0);
                let q1 = ca.quantile(0.25, QuantileMethod::Linear)?.unwrap_or(0.0);
                let q3 = ca.quantile(0.75, QuantileMethod::Linear)?.unwrap_or(1.0);
                ScalerParams {
                    center: median,
                    scale: non_zero(q3 - q1),
                }
            }
            ScalerType::MaxAbs => {
                let max_abs = values.iter().map(|x| x.abs()).fold(0.0f64, f64::max);
                ScalerParams {
                    center: 0.0,
                    scale: non_zero(max_abs),
                }
            }
            ScalerType::None => ScalerParams {
                center: 0.0,
                scale: 1.0,
            },
        };

        Ok(params)
    }
}

fn non_zero(scale: f64) -> f64 {
    if scale == 0.0 || !scale.is_finite() {
        1.0
    } else {
        scale
    }
}
