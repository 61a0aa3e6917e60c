//! Error types for the prediction core

use std::path::PathBuf;

use crate::schema::ValidationErrors;

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for loading artifacts and running inference
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request payload does not match the feature schema
    #[error("validation error: {0}")]
    Validation(ValidationErrors),

    /// Artifact could not be read, decoded or cross-checked
    #[error("artifact error ({}): {message}", .path.display())]
    Artifact { path: PathBuf, message: String },

    /// Scaler rejected its parameters or its input
    #[error("scaler error: {0}")]
    Scaler(String),

    /// Regressor rejected its parameters or its input
    #[error("model error: {0}")]
    Model(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML decoding errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a new artifact error
    pub fn artifact(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a new scaler error
    pub fn scaler(msg: impl Into<String>) -> Self {
        Self::Scaler(msg.into())
    }

    /// Create a new model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
