//! The exported model artifact.
//!
//! The artifact is a JSON document holding a fitted estimator plus optional metadata:
//!
//! ```json
//! {
//!   "name": "carbon-emission-linear",
//!   "trained_at": "2024-05-01T00:00:00Z",
//!   "feature_names": ["Monthly Grocery Bill", "..."],
//!   "kind": "linear",
//!   "intercept": 2000.0,
//!   "coefficients": [0.1, "..."]
//! }
//! ```
//!
//! `feature_names`, when present, is the column order the estimator was fitted with.

use std::{fs::File, io, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::regressor::{LinearRegressor, ModelError, Regressor, TreeEnsembleRegressor};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ArtifactError {
    #[display("failed to open model artifact {path}")]
    Io { path: String, source: io::Error },
    #[display("failed to parse model artifact {path}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[display("invalid model artifact {path}")]
    Invalid { path: String, source: ModelError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorSpec {
    Linear(LinearRegressor),
    TreeEnsemble(TreeEnsembleRegressor),
}

impl RegressorSpec {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            Self::Linear(model) => model.validate(),
            Self::TreeEnsemble(model) => model.validate(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Linear(_) => "linear",
            Self::TreeEnsemble(_) => "tree_ensemble",
        }
    }

    #[must_use]
    pub fn into_boxed(self) -> Box<dyn Regressor> {
        match self {
            Self::Linear(model) => Box::new(model),
            Self::TreeEnsemble(model) => Box::new(model),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub regressor: RegressorSpec,
}

impl ModelArtifact {
    pub fn open<P>(path: P) -> Result<Self, ArtifactError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: Self = serde_json::from_reader(io::BufReader::new(file)).map_err(
            |source| ArtifactError::Parse {
                path: path.display().to_string(),
                source,
            },
        )?;
        artifact
            .validate()
            .map_err(|source| ArtifactError::Invalid {
                path: path.display().to_string(),
                source,
            })?;
        tracing::debug!(
            path = %path.display(),
            kind = artifact.regressor.kind(),
            name = artifact.name.as_deref().unwrap_or("-"),
            "loaded model artifact"
        );
        Ok(artifact)
    }

    /// Checks the estimator parameters and that `feature_names` matches the model width.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.regressor.validate()?;
        if let Some(names) = &self.feature_names {
            let width = match &self.regressor {
                RegressorSpec::Linear(model) => model.n_features(),
                RegressorSpec::TreeEnsemble(model) => model.n_features(),
            };
            if names.len() != width {
                return Err(ModelError::Invalid {
                    reason: format!(
                        "feature_names lists {} columns but the model has {width} features",
                        names.len()
                    ),
                });
            }
        }
        Ok(())
    }
}
