//! Loading artifacts from disk and predicting end to end

use ftth_predict_core::{Error, FeatureSchema, Predictor, N_FEATURES};
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn feature_names() -> Vec<&'static str> {
    FeatureSchema::new().names().collect()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn standard_scaler_json() -> String {
    json!({
        "kind": "standard",
        "feature_names": feature_names(),
        "mean": vec![0.0; N_FEATURES],
        "scale": vec![2.0; N_FEATURES],
    })
    .to_string()
}

fn payload() -> serde_json::Value {
    json!({
        "Lat": 2.0,
        "Long": 2.0,
        "FAT Port to Customers": 2.0,
        "Signal OPM ONT (dBm)": 2.0,
        "Mitra_AFB": 2.0,
        "Mitra_IDM": 2.0,
        "Mitra_IFT": 2.0,
        "Mitra_INTENS": 2.0,
        "Service_10": 2,
        "Service_20": 2,
        "Service_35": 2,
        "Service_50": 2,
        "dispo_dayofweek": 2,
        "dispo_is_weekend": 2
    })
}

#[test]
fn test_linear_model_from_json_files() {
    let dir = TempDir::new().unwrap();
    let scaler = write(dir.path(), "scaler.json", &standard_scaler_json());

    let mut coef = vec![0.0; N_FEATURES];
    coef[0] = 3.0;
    coef[13] = -1.0;
    let model = write(
        dir.path(),
        "model.json",
        &json!({"kind": "linear", "coef": coef, "intercept": 10.0}).to_string(),
    );

    let predictor = Predictor::from_paths(&scaler, &model).unwrap();
    let features = FeatureSchema::new().validate(&payload()).unwrap();
    let out = predictor.predict(&features).unwrap();

    // every feature scales to 1.0: 10 + 3 - 1
    assert_eq!(out.prediction, 12.0);
    assert_eq!(predictor.model_name(), "linear");
}

#[test]
fn test_forest_model_from_yaml_file() {
    let dir = TempDir::new().unwrap();
    let scaler = write(dir.path(), "scaler.json", &standard_scaler_json());
    let model = write(
        dir.path(),
        "model.yaml",
        r#"
kind: tree_ensemble
n_features: 14
aggregation: mean
trees:
  - nodes:
      - {feature: 3, threshold: 0.5, left: 1, right: 2}
      - {value: 100.0}
      - {value: 200.0}
  - nodes:
      - {feature: 12, threshold: 1.5, left: 1, right: 2}
      - {value: 50.0}
      - {value: 0.0}
"#,
    );

    let predictor = Predictor::from_paths(&scaler, &model).unwrap();
    let features = FeatureSchema::new().validate(&payload()).unwrap();

    // scaled row is all 1.0: first tree goes right (200), second left (50)
    assert_eq!(predictor.predict(&features).unwrap().prediction, 125.0);
    assert_eq!(predictor.model_name(), "forest");
}

#[test]
fn test_mismatched_feature_names_abort_loading() {
    let dir = TempDir::new().unwrap();
    let mut names = feature_names();
    names.swap(2, 3);

    let scaler = write(
        dir.path(),
        "scaler.json",
        &json!({
            "kind": "min_max",
            "feature_names": names,
            "min": vec![0.0; N_FEATURES],
            "scale": vec![1.0; N_FEATURES],
        })
        .to_string(),
    );
    let model = write(
        dir.path(),
        "model.json",
        &json!({"kind": "linear", "coef": vec![1.0; N_FEATURES]}).to_string(),
    );

    let err = Predictor::from_paths(&scaler, &model).unwrap_err();
    assert!(matches!(err, Error::Artifact { .. }));
    assert!(err.to_string().contains("feature names do not match"));
}

#[test]
fn test_wrong_width_model_aborts_loading() {
    let dir = TempDir::new().unwrap();
    let scaler = write(dir.path(), "scaler.json", &standard_scaler_json());
    let model = write(
        dir.path(),
        "model.json",
        &json!({"kind": "linear", "coef": [1.0, 2.0]}).to_string(),
    );

    let err = Predictor::from_paths(&scaler, &model).unwrap_err();
    assert!(err.to_string().contains("model is fitted on 2 features"));
}

#[test]
fn test_unknown_kind_aborts_loading() {
    let dir = TempDir::new().unwrap();
    let scaler = write(dir.path(), "scaler.json", r#"{"kind": "quantile"}"#);
    let model = write(
        dir.path(),
        "model.json",
        &json!({"kind": "linear", "coef": vec![1.0; N_FEATURES]}).to_string(),
    );

    let err = Predictor::from_paths(&scaler, &model).unwrap_err();
    assert!(matches!(err, Error::Artifact { .. }));
}
