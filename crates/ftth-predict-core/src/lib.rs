//! FTTH Predict Core
//!
//! Everything the prediction service needs below the HTTP layer.
//!
//! This crate provides:
//! - The fixed feature schema and request validation
//! - Fitted scalers (standard, min-max, robust, identity)
//! - Fitted regressors (linear, tree ensembles)
//! - Artifact loading from JSON/YAML files
//! - A `Predictor` that chains scaling and inference

pub mod artifact;
pub mod error;
pub mod model;
pub mod predictor;
pub mod scaler;
pub mod schema;

pub use artifact::{load_model, load_scaler, ArtifactFormat, ModelArtifact, ScalerArtifact};
pub use error::{Error, Result};
pub use model::{Aggregation, LinearRegressor, ModelSpec, Node, Regressor, Tree, TreeEnsemble};
pub use predictor::{Prediction, Predictor};
pub use scaler::Scaler;
pub use schema::{
    FeatureKind, FeatureSchema, FeatureSpec, FeatureVector, FieldError, ValidationErrors,
    FEATURES, N_FEATURES,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::predictor::{Prediction, Predictor};
    pub use crate::schema::{FeatureSchema, FeatureVector};
}
