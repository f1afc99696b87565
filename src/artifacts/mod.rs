//! Artifact discovery and loading
//!
//! Startup reads four files: the fitted preprocessor, the regression model,
//! the feature descriptor and the training sample. Only the feature schema is
//! mandatory; a missing or broken preprocessor/model pair is logged and the
//! service starts without it.

use crate::error::{PredictorError, Result};
use crate::models::{RegressionModel, Regressor};
use crate::preprocessing::DataPreprocessor;
use crate::schema::{FeatureSchema, UiMetadata};
use crate::utils::DataLoader;
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

const DEFAULT_PREPROCESSOR_PATH: &str = "artifacts/transformed/preprocessor.json";
const DEFAULT_MODEL_PATH: &str = "prediction/models/models/current_model.json";
const DEFAULT_FEATURE_LIST_PATH: &str = "artifacts/transformed/feature_list.json";
const DEFAULT_TRAIN_CSV_PATH: &str = "artifacts/transformed/train.csv";

/// Locations of the artifacts read at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub preprocessor: PathBuf,
    pub model: PathBuf,
    pub feature_list: PathBuf,
    pub train_csv: PathBuf,
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            preprocessor: env_path("PREPROCESSOR_PATH", DEFAULT_PREPROCESSOR_PATH),
            model: env_path("MODEL_PATH", DEFAULT_MODEL_PATH),
            feature_list: env_path("FEATURE_LIST_PATH", DEFAULT_FEATURE_LIST_PATH),
            train_csv: env_path("TRAIN_CSV_PATH", DEFAULT_TRAIN_CSV_PATH),
        }
    }
}

impl ArtifactPaths {
    /// Default layout below `root`, ignoring the environment
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            preprocessor: root.join(DEFAULT_PREPROCESSOR_PATH),
            model: root.join(DEFAULT_MODEL_PATH),
            feature_list: root.join(DEFAULT_FEATURE_LIST_PATH),
            train_csv: root.join(DEFAULT_TRAIN_CSV_PATH),
        }
    }
}

/// Everything startup produced
#[derive(Debug)]
pub struct LoadedArtifacts {
    pub schema: FeatureSchema,
    pub metadata: UiMetadata,
    /// Preprocessor and model, installed together or not at all
    pub pipeline: Option<(DataPreprocessor, RegressionModel)>,
}

/// Load all artifacts. Fails only when no feature schema can be resolved.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<LoadedArtifacts> {
    let start = Instant::now();

    let sample = load_training_sample(&paths.train_csv);
    let schema = FeatureSchema::resolve(&paths.feature_list, sample.as_ref())?;
    let metadata = UiMetadata::from_sample(sample.as_ref(), &schema);

    let pipeline = match load_pipeline(paths, &schema) {
        Ok(pipeline) => Some(pipeline),
        Err(e) => {
            error!(
                preprocessor = %paths.preprocessor.display(),
                model = %paths.model.display(),
                error = %e,
                "Failed to load model artifacts, predictions are disabled"
            );
            None
        }
    };

    info!(
        features = schema.len(),
        numeric = schema.num_cols().len(),
        categorical = schema.cat_cols().len(),
        dropdowns = metadata.dropdowns.len(),
        model_loaded = pipeline.is_some(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Artifacts loaded"
    );

    Ok(LoadedArtifacts {
        schema,
        metadata,
        pipeline,
    })
}

fn load_training_sample(path: &Path) -> Option<DataFrame> {
    if !path.exists() {
        warn!(path = %path.display(), "Training sample not found, form metadata will be empty");
        return None;
    }

    match DataLoader::new().with_full_schema_scan().load_csv(path) {
        Ok(df) => {
            info!(path = %path.display(), rows = df.height(), columns = df.width(), "Training sample loaded");
            Some(df)
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read training sample");
            None
        }
    }
}

fn load_pipeline(
    paths: &ArtifactPaths,
    schema: &FeatureSchema,
) -> Result<(DataPreprocessor, RegressionModel)> {
    let preprocessor = DataPreprocessor::load(&paths.preprocessor).map_err(|e| {
        PredictorError::ArtifactError(format!(
            "cannot load preprocessor {}: {}",
            paths.preprocessor.display(),
            e
        ))
    })?;
    let model = RegressionModel::load(&paths.model).map_err(|e| {
        PredictorError::ArtifactError(format!("cannot load model {}: {}", paths.model.display(), e))
    })?;

    let width = preprocessor.n_output_features()?;
    if width != model.n_features() {
        return Err(PredictorError::ArtifactError(format!(
            "preprocessor produces {} features but the {} model expects {}",
            width,
            model.name(),
            model.n_features()
        )));
    }

    let unknown: Vec<&str> = preprocessor
        .feature_names_in()
        .filter(|name| !schema.features().any(|f| f == *name))
        .collect();
    if !unknown.is_empty() {
        warn!(
            columns = ?unknown,
            "Preprocessor expects columns outside the feature schema, single predictions will fail"
        );
    }

    Ok((preprocessor, model))
}
