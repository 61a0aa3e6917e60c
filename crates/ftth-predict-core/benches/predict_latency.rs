//! Latency benchmarks for the predictor hot path
//!
//! Run with: cargo bench -p ftth-predict-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use ftth_predict_core::{
    Aggregation, FeatureSchema, FeatureVector, LinearRegressor, Node, Predictor, Scaler, Tree,
    TreeEnsemble, N_FEATURES,
};

fn standard_scaler() -> Scaler {
    Scaler::Standard {
        mean: Some(vec![0.5; N_FEATURES]),
        scale: Some(vec![2.0; N_FEATURES]),
    }
}

/// Full binary tree of the given depth, splitting on features round-robin
fn full_tree(depth: usize) -> Tree {
    let mut nodes = Vec::new();
    let internal = (1usize << depth) - 1;
    for i in 0..internal {
        nodes.push(Node::Split {
            feature: i % N_FEATURES,
            threshold: 0.0,
            left: 2 * i + 1,
            right: 2 * i + 2,
        });
    }
    for i in 0..(1usize << depth) {
        nodes.push(Node::Leaf { value: i as f64 });
    }
    Tree { nodes }
}

fn sample_features() -> FeatureVector {
    FeatureVector::from_values([
        -6.2, 106.8, 8.0, -21.5, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 5.0, 1.0,
    ])
}

fn benchmark_validate(c: &mut Criterion) {
    let schema = FeatureSchema::new();
    let body = json!({
        "Lat": -6.2, "Long": 106.8, "FAT Port to Customers": 8,
        "Signal OPM ONT (dBm)": -21.5, "Mitra_AFB": 0, "Mitra_IDM": 1,
        "Mitra_IFT": 0, "Mitra_INTENS": 0, "Service_10": 0, "Service_20": 1,
        "Service_35": 0, "Service_50": 0, "dispo_dayofweek": 5, "dispo_is_weekend": 1
    });

    c.bench_function("schema_validate", |b| {
        b.iter(|| schema.validate(black_box(&body)).unwrap())
    });
}

fn benchmark_linear(c: &mut Criterion) {
    let predictor = Predictor::new(
        standard_scaler(),
        Box::new(LinearRegressor::new(vec![0.1; N_FEATURES], 1.0)),
    )
    .unwrap();
    let features = sample_features();

    c.bench_function("predict_linear", |b| {
        b.iter(|| predictor.predict(black_box(&features)).unwrap())
    });
}

fn benchmark_tree_ensemble(c: &mut Criterion) {
    let features = sample_features();
    let mut group = c.benchmark_group("predict_tree_ensemble");

    for n_trees in [10usize, 100, 500] {
        let model = TreeEnsemble {
            n_features: N_FEATURES,
            trees: (0..n_trees).map(|_| full_tree(6)).collect(),
            aggregation: Aggregation::Sum,
            base_score: 0.0,
            learning_rate: 0.1,
        };
        let predictor = Predictor::new(standard_scaler(), Box::new(model)).unwrap();

        group.bench_with_input(BenchmarkId::new("trees", n_trees), &features, |b, f| {
            b.iter(|| predictor.predict(black_box(f)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_validate,
    benchmark_linear,
    benchmark_tree_ensemble
);
criterion_main!(benches);
