//! Shared fixtures: a complete artifact directory in a tempdir

#![allow(dead_code)]

use price_predictor::artifacts::ArtifactPaths;
use price_predictor::models::{LinearRegression, RegressionModel};
use price_predictor::preprocessing::DataPreprocessor;
use price_predictor::utils::DataLoader;
use tempfile::TempDir;

pub const TRAIN_CSV: &str = "\
Brand,RAM_GB,Screen_Size,Processor,Price_INR
HP,8,14.0,i5,50000
Dell,16,15.6,i7,80000
HP,8,15.6,i5,55000
Asus,4,13.3,i3,35000
Dell,16,14.0,i7,78000
HP,32,15.6,i9,150000
";

pub const FEATURE_LIST: &str =
    r#"{"num_cols": ["RAM_GB", "Screen_Size"], "cat_cols": ["Brand", "Processor"]}"#;

pub struct Fixture {
    pub dir: TempDir,
    pub paths: ArtifactPaths,
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Training sample and feature list only
pub fn schema_only() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let paths = ArtifactPaths::under(dir.path());
    std::fs::create_dir_all(paths.train_csv.parent().unwrap()).unwrap();
    std::fs::write(&paths.train_csv, TRAIN_CSV).unwrap();
    std::fs::write(&paths.feature_list, FEATURE_LIST).unwrap();
    Fixture { dir, paths }
}

/// Every artifact: sample, feature list, fitted preprocessor and a linear model
pub fn complete() -> Fixture {
    let fixture = schema_only();
    let paths = &fixture.paths;

    let sample = DataLoader::new().load_csv(&paths.train_csv).unwrap();
    let mut preprocessor = DataPreprocessor::new();
    preprocessor
        .fit(
            &sample,
            &names(&["RAM_GB", "Screen_Size"]),
            &names(&["Brand", "Processor"]),
        )
        .unwrap();
    preprocessor.save(&paths.preprocessor).unwrap();

    let width = preprocessor.n_output_features().unwrap();
    let coefficients = (0..width).map(|i| 1000.0 * (i + 1) as f64).collect();
    let model = RegressionModel::Linear(LinearRegression::new(coefficients, 60000.0));
    std::fs::create_dir_all(paths.model.parent().unwrap()).unwrap();
    model.save(&paths.model).unwrap();

    fixture
}
