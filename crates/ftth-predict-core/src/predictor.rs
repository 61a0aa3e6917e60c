//! Scaler + regressor chained behind one call

use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::artifact;
use crate::error::{Error, Result};
use crate::model::Regressor;
use crate::scaler::Scaler;
use crate::schema::{FeatureSchema, FeatureVector};

/// Output of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: f64,
}

/// Loaded artifacts ready to serve predictions
#[derive(Debug)]
pub struct Predictor {
    schema: FeatureSchema,
    scaler: Scaler,
    model: Box<dyn Regressor>,
}

impl Predictor {
    /// Build a predictor from already-loaded artifacts
    pub fn new(scaler: Scaler, model: Box<dyn Regressor>) -> Result<Self> {
        let schema = FeatureSchema::new();

        scaler.validate()?;
        model.validate()?;

        if scaler.n_features() != Some(schema.len()) {
            return Err(Error::scaler(format!(
                "scaler width {:?} does not match schema width {}",
                scaler.n_features(),
                schema.len()
            )));
        }
        if model.n_features() != schema.len() {
            return Err(Error::model(format!(
                "model width {} does not match schema width {}",
                model.n_features(),
                schema.len()
            )));
        }

        Ok(Self {
            schema,
            scaler,
            model,
        })
    }

    /// Load both artifacts from disk
    pub fn from_paths(scaler_path: impl AsRef<Path>, model_path: impl AsRef<Path>) -> Result<Self> {
        let schema = FeatureSchema::new();
        let scaler = artifact::load_scaler(scaler_path, &schema)?;
        let model = artifact::load_model(model_path, &schema)?;
        Self::new(scaler, model)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Scale the row, then run the regressor
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let start = Instant::now();

        let scaled = self.scaler.transform(features.as_slice())?;
        let prediction = self.model.predict(&scaled)?;

        debug!(
            "Predicted {} in {}us",
            prediction,
            start.elapsed().as_micros()
        );

        Ok(Prediction { prediction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aggregation, LinearRegressor, Node, Tree, TreeEnsemble};
    use crate::schema::N_FEATURES;

    fn identity_predictor(coef: Vec<f64>, intercept: f64) -> Predictor {
        Predictor::new(
            Scaler::Identity {
                n_features: N_FEATURES,
            },
            Box::new(LinearRegressor::new(coef, intercept)),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_chains_scaler_and_model() {
        let scaler = Scaler::Standard {
            mean: Some(vec![1.0; N_FEATURES]),
            scale: Some(vec![2.0; N_FEATURES]),
        };
        let model = LinearRegressor::new(vec![1.0; N_FEATURES], 0.0);
        let predictor = Predictor::new(scaler, Box::new(model)).unwrap();

        let features = FeatureVector::from_values([3.0; N_FEATURES]);
        let out = predictor.predict(&features).unwrap();

        // each feature scales to 1.0
        assert_eq!(out.prediction, N_FEATURES as f64);
    }

    #[test]
    fn test_width_mismatch_rejected_at_construction() {
        let err = Predictor::new(
            Scaler::Identity { n_features: 3 },
            Box::new(LinearRegressor::new(vec![1.0; N_FEATURES], 0.0)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Scaler(_)));

        let err = Predictor::new(
            Scaler::Identity {
                n_features: N_FEATURES,
            },
            Box::new(LinearRegressor::new(vec![1.0; 3], 0.0)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }

    #[test]
    fn test_model_failure_surfaces_as_model_error() {
        let predictor = identity_predictor(vec![f64::MAX; N_FEATURES], 0.0);
        let features = FeatureVector::from_values([10.0; N_FEATURES]);

        let err = predictor.predict(&features).unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }

    #[test]
    fn test_scaler_failure_surfaces_as_scaler_error() {
        let scaler = Scaler::MinMax {
            min: vec![0.0; N_FEATURES],
            scale: vec![f64::MAX; N_FEATURES],
        };
        let predictor = Predictor::new(
            scaler,
            Box::new(LinearRegressor::new(vec![1.0; N_FEATURES], 0.0)),
        )
        .unwrap();

        let features = FeatureVector::from_values([1e10; N_FEATURES]);
        let err = predictor.predict(&features).unwrap_err();
        assert!(matches!(err, Error::Scaler(_)));
    }

    #[test]
    fn test_ragged_scaler_rejected_at_construction() {
        let scaler = Scaler::Standard {
            mean: Some(vec![0.0; N_FEATURES]),
            scale: Some(vec![1.0; 3]),
        };
        let err = Predictor::new(
            scaler,
            Box::new(LinearRegressor::new(vec![1.0; N_FEATURES], 0.0)),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Scaler(_)));
        assert!(err.to_string().contains("'scale' has 3 entries"));
    }

    #[test]
    fn test_cyclic_tree_rejected_at_construction() {
        let tree = Tree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 0,
                    right: 0,
                },
                Node::Leaf { value: 1.0 },
            ],
        };
        let model = TreeEnsemble {
            n_features: N_FEATURES,
            trees: vec![tree],
            aggregation: Aggregation::Mean,
            base_score: 0.0,
            learning_rate: 1.0,
        };

        let err = Predictor::new(
            Scaler::Identity {
                n_features: N_FEATURES,
            },
            Box::new(model),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Model(_)));
        assert!(err.to_string().contains("invalid child index"));
    }

    #[test]
    fn test_out_of_range_split_rejected_at_construction() {
        let tree = Tree {
            nodes: vec![
                Node::Split {
                    feature: N_FEATURES,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: 1.0 },
                Node::Leaf { value: 2.0 },
            ],
        };
        let model = TreeEnsemble {
            n_features: N_FEATURES,
            trees: vec![tree],
            aggregation: Aggregation::Sum,
            base_score: 0.0,
            learning_rate: 1.0,
        };

        let err = Predictor::new(
            Scaler::Identity {
                n_features: N_FEATURES,
            },
            Box::new(model),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Model(_)));
    }
}
