//! Fitted regressors
//!
//! Two families cover the models exported for this service:
//! - [`LinearRegressor`]: coefficients and an intercept
//! - [`TreeEnsemble`]: flat-array regression trees, averaged (random forest)
//!   or summed with a learning rate (gradient boosting)
//!
//! Both sit behind the [`Regressor`] trait so the predictor does not care
//! which one was loaded.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Trait for all fitted regressors
pub trait Regressor: Send + Sync + std::fmt::Debug {
    /// Predict a single scalar for one scaled row
    fn predict(&self, row: &[f64]) -> Result<f64>;

    /// Get the regressor name
    fn name(&self) -> &str;

    /// Number of input features
    fn n_features(&self) -> usize;

    /// Check fitted parameters before the model serves predictions
    fn validate(&self) -> Result<()>;
}

/// Serialized form of the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearRegressor),
    TreeEnsemble(TreeEnsemble),
}

impl ModelSpec {
    /// Check parameters and hand back a boxed regressor
    pub fn into_regressor(self) -> Result<Box<dyn Regressor>> {
        match self {
            Self::Linear(m) => {
                m.validate()?;
                Ok(Box::new(m))
            }
            Self::TreeEnsemble(m) => {
                m.validate()?;
                Ok(Box::new(m))
            }
        }
    }
}

fn check_width(row: &[f64], expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(Error::model(format!(
            "X has {} features, but the model is expecting {} features as input",
            row.len(),
            expected
        )));
    }
    Ok(())
}

fn check_output(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::model(format!("prediction is not finite: {}", value)))
    }
}

// ============================================================================
// Linear
// ============================================================================

/// Ordinary linear model: `intercept + coef · x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearRegressor {
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self { coef, intercept }
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, row: &[f64]) -> Result<f64> {
        check_width(row, self.coef.len())?;

        let dot: f64 = self.coef.iter().zip(row).map(|(c, x)| c * x).sum();
        check_output(self.intercept + dot)
    }

    fn name(&self) -> &str {
        "linear"
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn validate(&self) -> Result<()> {
        if self.coef.is_empty() {
            return Err(Error::model("linear model has no coefficients"));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(Error::model("linear model has non-finite parameters"));
        }
        Ok(())
    }
}

// ============================================================================
// Tree ensemble
// ============================================================================

/// How per-tree outputs are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Average of all trees (bagging / random forest)
    #[default]
    Mean,
    /// Sum of all trees (boosting)
    Sum,
}

/// A node in a flat tree array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A binary regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf. Goes left when `x <= threshold`.
    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(format!("leaf {} has a non-finite value", i));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} of {}",
                            i, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", i));
                    }
                    // Children strictly after their parent means every walk terminates.
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child index {}", i, child));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub n_features: usize,
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub aggregation: Aggregation,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_learning_rate() -> f64 {
    1.0
}

impl Regressor for TreeEnsemble {
    fn predict(&self, row: &[f64]) -> Result<f64> {
        check_width(row, self.n_features)?;

        let total: f64 = self.trees.iter().map(|t| t.evaluate(row)).sum();
        let combined = match self.aggregation {
            Aggregation::Mean => total / self.trees.len() as f64,
            Aggregation::Sum => total,
        };

        check_output(self.base_score + self.learning_rate * combined)
    }

    fn name(&self) -> &str {
        match self.aggregation {
            Aggregation::Mean => "forest",
            Aggregation::Sum => "boosted_trees",
        }
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(Error::model("tree ensemble needs n_features > 0"));
        }
        if self.trees.is_empty() {
            return Err(Error::model("tree ensemble has no trees"));
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(Error::model("tree ensemble has non-finite parameters"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| Error::model(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}
