use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use price_predictor::inference::InferenceEngine;
use price_predictor::models::{
    DecisionTree, GradientBoostingRegressor, LinearRegression, RegressionModel, TreeNode,
};
use price_predictor::preprocessing::DataPreprocessor;
use price_predictor::schema::FeatureSchema;
use polars::prelude::*;
use rand::prelude::*;
use std::collections::HashMap;

const BRANDS: [&str; 5] = ["HP", "Dell", "Asus", "Lenovo", "Acer"];

fn create_laptop_data(n_rows: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(42);

    let ram: Vec<i64> = (0..n_rows).map(|_| [4, 8, 16, 32][rng.gen_range(0..4)]).collect();
    let screen: Vec<f64> = (0..n_rows).map(|_| rng.gen_range(11.6..17.3)).collect();
    let brand: Vec<&str> = (0..n_rows).map(|_| BRANDS[rng.gen_range(0..BRANDS.len())]).collect();

    df!(
        "RAM_GB" => ram,
        "Screen_Size" => screen,
        "Brand" => brand
    )
    .unwrap()
}

fn stump(feature_idx: usize, threshold: f64, left: f64, right: f64) -> DecisionTree {
    DecisionTree::new(TreeNode::Split {
        feature_idx,
        threshold,
        left: Box::new(TreeNode::Leaf { value: left }),
        right: Box::new(TreeNode::Leaf { value: right }),
    })
}

fn engines() -> Vec<(&'static str, InferenceEngine)> {
    let train = create_laptop_data(5000);
    let schema = FeatureSchema::infer(&train).unwrap().with_numeric_kinds_from(&train);

    let mut preprocessor = DataPreprocessor::new();
    preprocessor
        .fit(&train, schema.num_cols(), schema.cat_cols())
        .unwrap();
    let width = preprocessor.n_output_features().unwrap();

    let linear = RegressionModel::Linear(LinearRegression::new(vec![1500.0; width], 55000.0));
    let trees = (0..100)
        .map(|i| stump(i % width, 0.0, -200.0, 350.0))
        .collect();
    let boosted = RegressionModel::GradientBoosting(GradientBoostingRegressor::new(
        width, 60000.0, 0.1, trees,
    ));

    vec![
        ("linear", InferenceEngine::new(schema.clone()).with_preprocessor(preprocessor.clone()).with_model(linear)),
        ("gradient_boosting", InferenceEngine::new(schema).with_preprocessor(preprocessor).with_model(boosted)),
    ]
}

fn bench_batch_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_prediction");

    for (name, engine) in engines() {
        for n_rows in [100, 1000, 10000].iter() {
            let df = create_laptop_data(*n_rows);

            group.bench_with_input(
                BenchmarkId::new(name, n_rows),
                &df,
                |b, df| {
                    b.iter(|| engine.predict_frame(black_box(df.clone())).unwrap())
                },
            );
        }
    }

    group.finish();
}

fn bench_single_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_prediction");

    let form: HashMap<String, String> = [("RAM_GB", "16"), ("Screen_Size", "15.6"), ("Brand", "Dell")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    for (name, engine) in engines() {
        group.bench_function(name, |b| {
            b.iter(|| engine.predict_record(black_box(&form)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_batch_prediction, bench_single_prediction);
criterion_main!(benches);
