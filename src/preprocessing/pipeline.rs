//! Data preprocessing pipeline

use crate::error::{PredictorError, Result};
use super::{
    config::PreprocessingConfig,
    encoder::OneHotEncoder,
    imputer::Imputer,
    numeric_values,
    scaler::Scaler,
    string_values,
};
use ndarray::Array2;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Fitted preprocessing pipeline: impute, scale numeric columns, one-hot
/// encode categorical columns.
///
/// Output columns are the numeric columns in declared order followed by the
/// indicator columns of each categorical column in declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPreprocessor {
    config: PreprocessingConfig,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: Option<Imputer>,
    categorical_imputer: Option<Imputer>,
    scaler: Option<Scaler>,
    encoder: Option<OneHotEncoder>,
    is_fitted: bool,
}

/// Transformed block of one input column
enum ColumnBlock {
    Numeric(Vec<f64>),
    Indicators { width: usize, hot: Vec<Option<usize>> },
}

impl DataPreprocessor {
    /// Create a new preprocessor with default configuration
    pub fn new() -> Self {
        Self::with_config(PreprocessingConfig::default())
    }

    /// Create a new preprocessor with custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self {
            config,
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            numeric_imputer: None,
            categorical_imputer: None,
            scaler: None,
            encoder: None,
            is_fitted: false,
        }
    }

    /// Fit the preprocessor on the given numeric and categorical columns of `df`
    pub fn fit(
        &mut self,
        df: &DataFrame,
        numeric_columns: &[String],
        categorical_columns: &[String],
    ) -> Result<&mut Self> {
        let start = Instant::now();

        let mut numeric_imputer = Imputer::new(self.config.numeric_impute_strategy.clone());
        let mut scaler = Scaler::new(self.config.scaler_type.clone());
        for name in numeric_columns {
            let values = numeric_values(df, name)?;
            numeric_imputer.fit_numeric(name, &values)?;
            let imputed = numeric_imputer.fill_numeric(name, values)?;
            scaler.fit_column(name, &imputed)?;
        }

        let mut categorical_imputer =
            Imputer::new(self.config.categorical_impute_strategy.clone());
        let mut encoder = OneHotEncoder::new();
        for name in categorical_columns {
            let values = string_values(df, name)?;
            categorical_imputer.fit_categorical(name, &values)?;
            let imputed = categorical_imputer.fill_categorical(name, values)?;
            encoder.fit_column(name, &imputed)?;
        }

        self.numeric_columns = numeric_columns.to_vec();
        self.categorical_columns = categorical_columns.to_vec();
        self.numeric_imputer = (!numeric_columns.is_empty()).then_some(numeric_imputer);
        self.scaler = (!numeric_columns.is_empty()).then_some(scaler);
        self.categorical_imputer = (!categorical_columns.is_empty()).then_some(categorical_imputer);
        self.encoder = (!categorical_columns.is_empty()).then_some(encoder);
        self.is_fitted = true;

        debug!(
            rows = df.height(),
            numeric = self.numeric_columns.len(),
            categorical = self.categorical_columns.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Preprocessor fitted"
        );
        Ok(self)
    }

    /// Transform the feature columns of `df` into the model's numeric matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PredictorError::ModelNotFitted);
        }

        let missing: Vec<String> = self
            .feature_names_in()
            .filter(|name| df.column(name).is_err())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(PredictorError::ColumnMismatch(missing));
        }

        let numeric_blocks = self
            .numeric_columns
            .par_iter()
            .map(|name| self.transform_numeric(df, name))
            .collect::<Result<Vec<_>>>()?;
        let categorical_blocks = self
            .categorical_columns
            .par_iter()
            .map(|name| self.transform_categorical(df, name))
            .collect::<Result<Vec<_>>>()?;

        let n_rows = df.height();
        let mut out = Array2::<f64>::zeros((n_rows, self.n_output_features()?));
        let mut offset = 0;
        for block in numeric_blocks.into_iter().chain(categorical_blocks) {
            match block {
                ColumnBlock::Numeric(values) => {
                    for (i, v) in values.into_iter().enumerate() {
                        out[[i, offset]] = v;
                    }
                    offset += 1;
                }
                ColumnBlock::Indicators { width, hot } => {
                    for (i, idx) in hot.into_iter().enumerate() {
                        if let Some(j) = idx {
                            out[[i, offset + j]] = 1.0;
                        }
                    }
                    offset += width;
                }
            }
        }

        Ok(out)
    }

    fn transform_numeric(&self, df: &DataFrame, name: &str) -> Result<ColumnBlock> {
        let imputer = self.numeric_imputer.as_ref().ok_or(PredictorError::ModelNotFitted)?;
        let scaler = self.scaler.as_ref().ok_or(PredictorError::ModelNotFitted)?;

        let imputed = imputer.fill_numeric(name, numeric_values(df, name)?)?;
        let scaled = imputed
            .into_iter()
            .map(|v| scaler.scale(name, v))
            .collect::<Result<Vec<_>>>()?;
        Ok(ColumnBlock::Numeric(scaled))
    }

    fn transform_categorical(&self, df: &DataFrame, name: &str) -> Result<ColumnBlock> {
        let imputer = self
            .categorical_imputer
            .as_ref()
            .ok_or(PredictorError::ModelNotFitted)?;
        let encoder = self.encoder.as_ref().ok_or(PredictorError::ModelNotFitted)?;

        let imputed = imputer.fill_categorical(name, string_values(df, name)?)?;
        let hot = imputed
            .iter()
            .map(|v| encoder.index_of(name, v))
            .collect::<Result<Vec<_>>>()?;
        Ok(ColumnBlock::Indicators {
            width: encoder.categories(name)?.len(),
            hot,
        })
    }

    /// Input columns the preprocessor was fitted on, numeric first
    pub fn feature_names_in(&self) -> impl Iterator<Item = &str> {
        self.numeric_columns
            .iter()
            .chain(self.categorical_columns.iter())
            .map(String::as_str)
    }

    /// Width of the transformed matrix
    pub fn n_output_features(&self) -> Result<usize> {
        let mut width = self.numeric_columns.len();
        if let Some(ref encoder) = self.encoder {
            for name in &self.categorical_columns {
                width += encoder.categories(name)?.len();
            }
        }
        Ok(width)
    }

    /// Save the preprocessor to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a preprocessor from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let preprocessor: Self = serde_json::from_str(&json)?;
        if !preprocessor.is_fitted {
            return Err(PredictorError::ArtifactError(
                "preprocessor artifact is not fitted".to_string(),
            ));
        }
        Ok(preprocessor)
    }
}

impl Default for DataPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
