//! Pre-trained regressors evaluated on a single feature row.
//!
//! [`Regressor`] is the seam between the pipeline and the model. The pipeline only
//! knows that a regressor consumes a row of `n_features` values in schema order and
//! returns one scalar. Two exported estimator families implement it:
//!
//! - [`LinearRegressor`]: `intercept + Σ coefficient[i] * x[i]`
//! - [`TreeEnsembleRegressor`]: `base_score + learning_rate * aggregate(tree(x))`, where
//!   `aggregate` is the sum over trees (gradient boosting) or their mean (random forest)
//!
//! # Tree Layout
//!
//! A [`RegressionTree`] is a flat node array with the root at index 0. A split node
//! sends a row to `left` when `x[feature] <= threshold` and to `right` otherwise. Child
//! indices of a valid tree point forward in the array, so evaluation reaches a leaf within
//! `nodes.len()` steps. Evaluation enforces that bound itself.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ModelError {
    #[display("model expects {expected} features, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
    #[display("model produced a non-finite prediction ({value})")]
    NonFinite { value: f64 },
    #[display("invalid model: {reason}")]
    Invalid { reason: String },
}

impl ModelError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }
}

/// A stateless model mapping one feature row to one scalar.
pub trait Regressor: fmt::Debug + Send + Sync {
    /// Number of values expected in a row
    fn n_features(&self) -> usize;

    /// Evaluates the model on `row`, which must hold exactly [`Self::n_features`] values.
    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError>;
}

fn check_width(expected: usize, row: &[f64]) -> Result<(), ModelError> {
    if row.len() == expected {
        Ok(())
    } else {
        Err(ModelError::WidthMismatch {
            expected,
            actual: row.len(),
        })
    }
}

/// Ordinary least squares style linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegressor {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.coefficients.is_empty() {
            return Err(ModelError::invalid("linear model has no coefficients"));
        }
        if !self.intercept.is_finite() || !self.coefficients.iter().all(|c| c.is_finite()) {
            return Err(ModelError::invalid("linear model parameters must be finite"));
        }
        Ok(())
    }
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        check_width(self.n_features(), row)?;
        let dot = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(c, x)| c * x)
            .sum::<f64>();
        Ok(self.intercept + dot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn validate(&self, n_features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::invalid("tree has no nodes"));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(ModelError::invalid(format!(
                            "node {index} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ModelError::invalid(format!(
                            "node {index} has a NaN threshold"
                        )));
                    }
                    for child in [left, right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(ModelError::invalid(format!(
                                "node {index} has out-of-order child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(ModelError::invalid(format!(
                            "leaf {index} has a non-finite value"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `row`.
    ///
    /// Indices are bounds checked and the walk is capped at `nodes.len()` steps, so a
    /// tree that skipped [`TreeEnsembleRegressor::validate`] fails instead of panicking
    /// or cycling.
    fn evaluate(&self, row: &[f64]) -> Result<f64, ModelError> {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| ModelError::invalid(format!("child {index} is out of range")))?;
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(feature).ok_or_else(|| {
                        ModelError::invalid(format!(
                            "node {index} splits on feature {feature}, row has {}",
                            row.len()
                        ))
                    })?;
                    index = if *value <= threshold { left } else { right };
                }
                TreeNode::Leaf { value } => return Ok(value),
            }
        }
        Err(ModelError::invalid("tree walk did not reach a leaf"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Gradient boosting: trees are summed
    #[default]
    Sum,
    /// Random forest: trees are averaged
    Mean,
}

fn default_learning_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleRegressor {
    pub n_features: usize,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub aggregation: Aggregation,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsembleRegressor {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::invalid("tree ensemble has no features"));
        }
        if self.trees.is_empty() {
            return Err(ModelError::invalid("tree ensemble has no trees"));
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(ModelError::invalid(
                "base_score and learning_rate must be finite",
            ));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|err| match err {
                ModelError::Invalid { reason } => {
                    ModelError::invalid(format!("tree {index}: {reason}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }
}

impl Regressor for TreeEnsembleRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        check_width(self.n_features, row)?;
        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.evaluate(row)?;
        }
        #[expect(clippy::cast_precision_loss)]
        let aggregate = match self.aggregation {
            Aggregation::Sum => total,
            Aggregation::Mean => total / self.trees.len() as f64,
        };
        Ok(self.base_score + self.learning_rate * aggregate)
    }
}
