//! Fitted feature scalers
//!
//! Scalers are per-feature affine transforms whose parameters were fitted
//! offline. They are deserialized from the scaler artifact and only ever
//! applied here.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A fitted scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard {
        #[serde(default)]
        mean: Option<Vec<f64>>,
        #[serde(default)]
        scale: Option<Vec<f64>>,
    },

    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },

    /// `(x - center) / scale`
    Robust {
        #[serde(default)]
        center: Option<Vec<f64>>,
        #[serde(default)]
        scale: Option<Vec<f64>>,
    },

    /// Pass-through, for models fitted on raw features
    Identity { n_features: usize },
}

impl Scaler {
    /// Short name for logs and health output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
            Self::Robust { .. } => "robust",
            Self::Identity { .. } => "identity",
        }
    }

    /// Number of features the scaler was fitted on, if its parameters say so
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Self::Standard { mean, scale } => mean.as_ref().or(scale.as_ref()).map(Vec::len),
            Self::MinMax { min, .. } => Some(min.len()),
            Self::Robust { center, scale } => center.as_ref().or(scale.as_ref()).map(Vec::len),
            Self::Identity { n_features } => Some(*n_features),
        }
    }

    /// Check parameter consistency after decoding
    pub fn validate(&self) -> Result<()> {
        let params: Vec<(&str, &[f64])> = match self {
            Self::Standard { mean, scale } => [("mean", mean), ("scale", scale)]
                .into_iter()
                .filter_map(|(n, p)| p.as_deref().map(|p| (n, p)))
                .collect(),
            Self::MinMax { min, scale } => vec![("min", min.as_slice()), ("scale", scale.as_slice())],
            Self::Robust { center, scale } => [("center", center), ("scale", scale)]
                .into_iter()
                .filter_map(|(n, p)| p.as_deref().map(|p| (n, p)))
                .collect(),
            Self::Identity { n_features } => {
                if *n_features == 0 {
                    return Err(Error::scaler("identity scaler needs n_features > 0"));
                }
                return Ok(());
            }
        };

        let Some(width) = params.first().map(|(_, p)| p.len()) else {
            return Err(Error::scaler(format!(
                "{} scaler has no fitted parameters",
                self.kind()
            )));
        };

        for (name, values) in &params {
            if values.len() != width {
                return Err(Error::scaler(format!(
                    "parameter '{}' has {} entries, expected {}",
                    name,
                    values.len(),
                    width
                )));
            }
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(Error::scaler(format!(
                    "parameter '{}' is not finite at index {}",
                    name, i
                )));
            }
        }

        Ok(())
    }

    /// Apply the fitted transform to one row
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if let Some(expected) = self.n_features() {
            if row.len() != expected {
                return Err(Error::scaler(format!(
                    "X has {} features, but {} is expecting {} features as input",
                    row.len(),
                    self.kind(),
                    expected
                )));
            }
        }

        let out: Vec<f64> = match self {
            Self::Standard { mean, scale } | Self::Robust {
                center: mean,
                scale,
            } => row
                .iter()
                .enumerate()
                .map(|(i, x)| {
                    let shifted = mean.as_ref().map_or(*x, |m| x - m[i]);
                    scale.as_ref().map_or(shifted, |s| shifted / nonzero(s[i]))
                })
                .collect(),
            Self::MinMax { min, scale } => row
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
            Self::Identity { .. } => row.to_vec(),
        };

        if let Some(i) = out.iter().position(|v| !v.is_finite()) {
            return Err(Error::scaler(format!(
                "transformed value at index {} is not finite",
                i
            )));
        }

        Ok(out)
    }
}

// Constant features are fitted with a zero scale; dividing by one leaves them centered.
fn nonzero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}
