//! Inference engine implementation
//!
//! Ties the feature schema, the fitted preprocessor and the regression model
//! together. Built once at startup and shared read-only across requests.

use super::{InputRecord, SinglePrediction};
use crate::artifacts::LoadedArtifacts;
use crate::error::{PredictorError, Result};
use crate::models::{RegressionModel, Regressor};
use crate::preprocessing::DataPreprocessor;
use crate::schema::{FeatureSchema, PREDICTION_COLUMN, TARGET_COLUMN};
use crate::utils::{round2, DataLoader, DataSaver};
use ndarray::Array1;
use polars::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Price inference engine
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    schema: FeatureSchema,
    preprocessor: Option<Arc<DataPreprocessor>>,
    model: Option<Arc<RegressionModel>>,
}

impl InferenceEngine {
    /// Create an engine with no artifacts loaded
    pub fn new(schema: FeatureSchema) -> Self {
        Self {
            schema,
            preprocessor: None,
            model: None,
        }
    }

    /// Attach a fitted preprocessor
    pub fn with_preprocessor(mut self, preprocessor: DataPreprocessor) -> Self {
        self.preprocessor = Some(Arc::new(preprocessor));
        self
    }

    /// Attach a regression model
    pub fn with_model(mut self, model: RegressionModel) -> Self {
        self.model = Some(Arc::new(model));
        self
    }

    /// Build from startup artifacts
    pub fn from_artifacts(artifacts: &LoadedArtifacts) -> Self {
        let engine = Self::new(artifacts.schema.clone());
        match &artifacts.pipeline {
            Some((preprocessor, model)) => engine
                .with_preprocessor(preprocessor.clone())
                .with_model(model.clone()),
            None => engine,
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn preprocessor_loaded(&self) -> bool {
        self.preprocessor.is_some()
    }

    pub fn features_count(&self) -> usize {
        self.schema.len()
    }

    /// Model family name, if a model is loaded
    pub fn model_name(&self) -> Option<&'static str> {
        self.model.as_deref().map(RegressionModel::name)
    }

    fn pipeline(&self) -> Result<(&DataPreprocessor, &RegressionModel)> {
        match (&self.preprocessor, &self.model) {
            (Some(preprocessor), Some(model)) => Ok((&**preprocessor, &**model)),
            _ => Err(PredictorError::ArtifactsNotLoaded),
        }
    }

    fn run(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let (preprocessor, model) = self.pipeline()?;
        let x = preprocessor.transform(df)?;
        model.predict(&x)
    }

    /// Predict a single record given as raw form fields
    pub fn predict_record(&self, raw: &HashMap<String, String>) -> Result<SinglePrediction> {
        let start = Instant::now();

        let record = InputRecord::coerce(&self.schema, raw)?;
        let predictions = self.run(&record.to_frame()?)?;
        let prediction = predictions
            .first()
            .copied()
            .filter(|p| p.is_finite())
            .ok_or_else(|| {
                PredictorError::InferenceError("model returned no finite prediction".to_string())
            })?;

        info!(
            prediction,
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Single prediction"
        );

        Ok(SinglePrediction {
            prediction: round2(prediction),
            input_data: record,
        })
    }

    /// Predict every row of `df`, returning the frame without the target and
    /// with the prediction column appended last
    pub fn predict_frame(&self, mut df: DataFrame) -> Result<DataFrame> {
        let start = Instant::now();
        // Fail before touching the data when nothing can be predicted
        self.pipeline()?;

        if df.column(TARGET_COLUMN).is_ok() {
            df = df.drop(TARGET_COLUMN)?;
        }

        let missing = self.schema.missing_columns(&df);
        if !missing.is_empty() {
            return Err(PredictorError::ColumnMismatch(missing));
        }
        if df.height() == 0 {
            return Err(PredictorError::DataError("input has no rows".to_string()));
        }

        let features = self.typed_features(&df)?;
        let predictions = self.run(&features)?;
        debug!(rows = predictions.len(), "Batch transformed and predicted");

        df.with_column(Column::new(PREDICTION_COLUMN.into(), predictions.to_vec()))?;

        info!(
            rows = df.height(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Batch prediction"
        );
        Ok(df)
    }

    /// CSV loader for prediction input: dtypes inferred from every row,
    /// categorical features always read as strings
    pub fn csv_loader(&self) -> DataLoader {
        DataLoader::new()
            .with_full_schema_scan()
            .with_text_columns(self.schema.cat_cols().iter().cloned())
    }

    /// Parse uploaded CSV bytes, predict and serialize the result as CSV
    pub fn predict_csv(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let df = self.csv_loader().parse_csv(bytes)?;
        let mut out = self.predict_frame(df)?;
        DataSaver::to_csv_bytes(&mut out)
    }

    /// Schema columns of `df` with numeric features cast to f64 and
    /// categorical features to strings
    fn typed_features(&self, df: &DataFrame) -> Result<DataFrame> {
        let numeric = self.schema.num_cols().iter().map(|name| -> Result<Column> {
            let series = df.column(name)?.as_materialized_series();
            series
                .strict_cast(&DataType::Float64)
                .map(Column::from)
                .map_err(|e| {
                    PredictorError::DataError(format!("column '{}' is not numeric: {}", name, e))
                })
        });
        let categorical = self.schema.cat_cols().iter().map(|name| -> Result<Column> {
            let series = df.column(name)?.as_materialized_series();
            Ok(Column::from(series.cast(&DataType::String)?))
        });

        let columns = numeric.chain(categorical).collect::<Result<Vec<_>>>()?;
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearRegression;
    use crate::preprocessing::{PreprocessingConfig, ScalerType};

    fn training() -> DataFrame {
        df!(
            "RAM_GB" => &[8i64, 16, 8, 32],
            "Brand" => &["HP", "Dell", "HP", "Asus"],
            "Price_INR" => &[50000i64, 80000, 52000, 150000]
        )
        .unwrap()
    }

    fn engine() -> InferenceEngine {
        let sample = training();
        let schema = FeatureSchema::infer(&sample)
            .unwrap()
            .with_numeric_kinds_from(&sample);

        let mut preprocessor =
            DataPreprocessor::with_config(PreprocessingConfig::new().with_scaler(ScalerType::None));
        preprocessor
            .fit(&sample, schema.num_cols(), schema.cat_cols())
            .unwrap();

        // RAM, Brand_Asus, Brand_Dell, Brand_HP
        let model = RegressionModel::Linear(LinearRegression::new(
            vec![1000.0, 30000.0, 20000.0, 10000.0],
            0.125,
        ));

        InferenceEngine::new(schema)
            .with_preprocessor(preprocessor)
            .with_model(model)
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_predict_record() {
        let result = engine()
            .predict_record(&form(&[("RAM_GB", "16"), ("Brand", "Dell")]))
            .unwrap();
        // 16 * 1000 + 20000 + 0.125, rounded
        assert_eq!(result.prediction, 36000.13);
        assert_eq!(result.input_data.len(), 2);
    }

    #[test]
    fn test_predict_record_without_artifacts() {
        let engine = InferenceEngine::new(engine().schema().clone());
        assert!(!engine.model_loaded());
        let err = engine
            .predict_record(&form(&[("RAM_GB", "16"), ("Brand", "Dell")]))
            .unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactsNotLoaded));
    }

    #[test]
    fn test_predict_frame_drops_target_and_appends_prediction() {
        let out = engine().predict_frame(training()).unwrap();
        let names: Vec<&str> = out.get_column_names().into_iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["RAM_GB", "Brand", PREDICTION_COLUMN]);

        let preds: Vec<f64> = out
            .column(PREDICTION_COLUMN)
            .unwrap()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(preds, vec![18000.125, 36000.125, 18000.125, 62000.125]);
    }

    #[test]
    fn test_predict_frame_missing_columns() {
        let df = df!("RAM_GB" => &[8i64]).unwrap();
        match engine().predict_frame(df) {
            Err(PredictorError::ColumnMismatch(missing)) => assert_eq!(missing, vec!["Brand"]),
            other => panic!("expected column mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_predict_frame_rejects_text_in_numeric_column() {
        let df = df!("RAM_GB" => &["eight"], "Brand" => &["HP"]).unwrap();
        assert!(matches!(
            engine().predict_frame(df),
            Err(PredictorError::DataError(_))
        ));
    }

    #[test]
    fn test_predict_csv() {
        let csv = b"Brand,RAM_GB,Price_INR\nHP,8,1\nDell,16,2\n";
        let out = String::from_utf8(engine().predict_csv(csv).unwrap()).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Brand,RAM_GB,Predicted_Price_INR"));
        assert_eq!(lines.next(), Some("HP,8,18000.125"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_predict_csv_types_columns_from_every_row() {
        // Numeric-looking brands and integer RAM for the first rows only
        let mut csv = String::from("Brand,RAM_GB\n");
        for _ in 0..1200 {
            csv.push_str("7,8\n");
        }
        csv.push_str("Dell,16.5\n");

        let out = engine().predict_csv(csv.as_bytes()).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 1202);
        assert!(lines[1].starts_with("7,8"));
        assert!(lines[1].ends_with(",8000.125"));
        assert_eq!(lines[1201], "Dell,16.5,36500.125");
    }

    #[test]
    fn test_predict_csv_header_only() {
        let err = engine().predict_csv(b"RAM_GB,Brand\n").unwrap_err();
        assert!(matches!(err, PredictorError::DataError(_)));
    }
}
