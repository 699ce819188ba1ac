use crate::{
    artifact::ModelArtifact,
    regressor::{ModelError, Regressor},
};

/// Invokes a loaded regressor and turns its output into an annual emission estimate.
///
/// The predictor trusts the row layout; it only guards the width and the output. A
/// negative output is clamped to 0 kg, a non-finite one is an error.
#[derive(Debug)]
pub struct Predictor {
    regressor: Box<dyn Regressor>,
    feature_names: Option<Vec<String>>,
    name: Option<String>,
}

impl Predictor {
    #[must_use]
    pub fn new(regressor: Box<dyn Regressor>) -> Self {
        Self {
            regressor,
            feature_names: None,
            name: None,
        }
    }

    /// Validates `artifact` and takes ownership of its regressor.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self {
            regressor: artifact.regressor.into_boxed(),
            feature_names: artifact.feature_names,
            name: artifact.name,
        })
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.regressor.n_features()
    }

    /// Training column order recorded in the artifact, if any.
    #[must_use]
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Predicts annual emissions (kg CO₂) for one scaled row.
    pub fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        let raw = self.regressor.predict_row(row)?;
        if !raw.is_finite() {
            return Err(ModelError::NonFinite { value: raw });
        }
        if raw < 0.0 {
            tracing::warn!(prediction = raw, "model returned a negative value, clamping to 0");
            return Ok(0.0);
        }
        Ok(raw)
    }
}
