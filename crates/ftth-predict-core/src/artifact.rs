//! Loading fitted artifacts from disk
//!
//! Artifacts are JSON or YAML documents. The file extension picks the
//! decoder; unknown extensions are read as JSON. Each artifact may record
//! the feature names it was fitted on, which are checked against the
//! schema before the artifact is accepted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{ModelSpec, Regressor};
use crate::scaler::Scaler;
use crate::schema::FeatureSchema;

/// On-disk artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
}

impl ArtifactFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }

    fn decode<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        match self {
            Self::Json => Ok(serde_json::from_str(content)?),
            Self::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }
}

/// Scaler artifact document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,

    #[serde(flatten)]
    pub scaler: Scaler,
}

/// Model artifact document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,

    #[serde(flatten)]
    pub model: ModelSpec,
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ArtifactFormat::from_path(path);
    debug!("Reading {:?} artifact from {}", format, path.display());

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::artifact(path, format!("failed to read: {}", e)))?;

    format
        .decode(&content)
        .map_err(|e| Error::artifact(path, e.to_string()))
}

fn check_feature_names(path: &Path, names: Option<&[String]>, schema: &FeatureSchema) -> Result<()> {
    if let Some(names) = names {
        schema
            .check_names(names)
            .map_err(|e| Error::artifact(path, format!("feature names do not match schema: {}", e)))?;
    }
    Ok(())
}

/// Load and validate a scaler artifact
pub fn load_scaler(path: impl AsRef<Path>, schema: &FeatureSchema) -> Result<Scaler> {
    let path = path.as_ref();
    let artifact: ScalerArtifact = read_document(path)?;

    check_feature_names(path, artifact.feature_names.as_deref(), schema)?;

    let scaler = artifact.scaler;
    scaler
        .validate()
        .map_err(|e| Error::artifact(path, e.to_string()))?;

    match scaler.n_features() {
        Some(n) if n == schema.len() => {}
        Some(n) => {
            return Err(Error::artifact(
                path,
                format!("scaler is fitted on {} features, schema has {}", n, schema.len()),
            ))
        }
        None => return Err(Error::artifact(path, "scaler does not declare its width")),
    }

    info!("Loaded {} scaler from {}", scaler.kind(), path.display());
    Ok(scaler)
}

/// Load and validate a model artifact
pub fn load_model(path: impl AsRef<Path>, schema: &FeatureSchema) -> Result<Box<dyn Regressor>> {
    let path = path.as_ref();
    let artifact: ModelArtifact = read_document(path)?;

    check_feature_names(path, artifact.feature_names.as_deref(), schema)?;

    let model = artifact
        .model
        .into_regressor()
        .map_err(|e| Error::artifact(path, e.to_string()))?;

    if model.n_features() != schema.len() {
        return Err(Error::artifact(
            path,
            format!(
                "model is fitted on {} features, schema has {}",
                model.n_features(),
                schema.len()
            ),
        ));
    }

    info!("Loaded {} model from {}", model.name(), path.display());
    Ok(model)
}
